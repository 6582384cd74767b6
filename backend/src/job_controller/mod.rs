pub mod enrich;
pub mod state;
