pub mod documents;
pub mod query;
pub mod sheet;
pub mod upload;
