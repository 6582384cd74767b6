use serde::{Deserialize, Serialize};

/// How an answer was produced.
///
/// Only `Answered` carries text generated by the AI provider. The other
/// variants still come back with a 2xx status and a human readable `answer`,
/// so clients must look at this field to detect partial failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    /// No provider credential is configured.
    Unavailable,
    /// The provider call failed or timed out.
    Degraded,
    /// The requested document exists but has no extracted text.
    NoContent,
    /// Nothing has been uploaded yet.
    NoDocuments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub status: AnswerStatus,
    pub answer: String,
    pub success: bool,
    pub provider: Option<String>,
    pub model_used: Option<String>,
    pub documents_searched: usize,
    pub document_info: Vec<DocumentRef>,
    pub context_info: String,
    pub context_truncated: bool,
    pub document_id_queried: Option<i64>,
    /// Provider error message when `status` is `degraded`.
    pub error: Option<String>,
    /// Locally computed hint returned when the provider could not answer.
    pub fallback: Option<String>,
}

/// Result of the per-document summary and keyword endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    pub document_id: i64,
    pub filename: String,
    pub status: AnswerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub error: Option<String>,
}
