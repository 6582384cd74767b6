//! Types shared between the backend API and the browser frontend.
//!
//! Everything in here is plain serde data: the backend serializes these
//! structures as JSON responses and the frontend deserializes the same
//! structures, so both sides agree on the wire format at compile time.

pub mod jobs;
pub mod model;
pub mod requests;
