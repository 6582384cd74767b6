//! Persistence: the SQLite document table and the directory holding the raw
//! uploaded bytes. A document row owns its file; callers that remove one must
//! remove the other.

pub mod db;
pub mod files;
