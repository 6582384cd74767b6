use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_documents: u64,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
    pub ai_available: bool,
    pub provider: Option<String>,
}
