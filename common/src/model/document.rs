use serde::{Deserialize, Serialize};

/// Outcome of the text extraction step for an uploaded PDF.
///
/// Extraction never fails an upload. Instead the document is stored with an
/// empty `content` and the status records why, so API consumers can tell an
/// image-only PDF (`Empty`) from a file the parser could not read (`Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Ok,
    Empty,
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Ok => "ok",
            ExtractionStatus::Empty => "empty",
            ExtractionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ok" => Some(ExtractionStatus::Ok),
            "empty" => Some(ExtractionStatus::Empty),
            "failed" => Some(ExtractionStatus::Failed),
            _ => None,
        }
    }
}

/// A stored PDF together with its extracted text and metadata.
///
/// Field names on the wire follow the public API (`filename` is the generated
/// name on disk, `upload_date` the insertion timestamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(rename = "filename")]
    pub stored_name: String,
    pub original_filename: String,
    pub file_path: String,
    /// Extracted text. List endpoints only return a short preview.
    pub content: String,
    pub file_size: u64,
    pub page_count: u32,
    /// MD5 hex digest of the uploaded bytes.
    pub checksum: String,
    pub extraction_status: ExtractionStatus,
    /// RFC 3339 timestamp, set once at insertion.
    #[serde(rename = "upload_date")]
    pub created_at: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// One page of the document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub document: Document,
    /// Set when a background summary/keyword job was scheduled for the upload.
    pub enrichment_job_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadStatus {
    pub status: String,
    pub document: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub document_id: i64,
}

/// Splits a comma separated tag string, dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tags_trims_and_skips_blanks() {
        assert_eq!(
            split_tags(" finance, q3 ,,report "),
            vec!["finance", "q3", "report"]
        );
        assert!(split_tags("  ").is_empty());
    }

    #[test]
    fn document_uses_public_field_names() {
        let doc = Document {
            id: 7,
            stored_name: "abc_report.pdf".into(),
            original_filename: "report.pdf".into(),
            file_path: "uploads/abc_report.pdf".into(),
            content: String::new(),
            file_size: 12,
            page_count: 1,
            checksum: "00".into(),
            extraction_status: ExtractionStatus::Empty,
            created_at: "2024-01-01T00:00:00Z".into(),
            description: None,
            tags: vec![],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["filename"], "abc_report.pdf");
        assert_eq!(json["upload_date"], "2024-01-01T00:00:00Z");
        assert_eq!(json["extraction_status"], "empty");
    }
}
