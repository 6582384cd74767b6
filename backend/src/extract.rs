//! Text extraction from uploaded PDF bytes.
//!
//! Extraction never fails an upload: unreadable documents are stored with
//! empty text and [`ExtractionStatus::Failed`], documents with no text layer
//! (scans) with [`ExtractionStatus::Empty`].

use common::model::document::ExtractionStatus;
use log::warn;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub page_count: u32,
    pub status: ExtractionStatus,
}

impl Extraction {
    fn failed() -> Self {
        Self {
            text: String::new(),
            page_count: 0,
            status: ExtractionStatus::Failed,
        }
    }
}

/// Reads a stored upload and extracts its text.
pub fn extract_file(path: &Path) -> Extraction {
    match std::fs::read(path) {
        Ok(bytes) => extract_text(&bytes),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            Extraction::failed()
        }
    }
}

/// Extracts the text of every page in page order, one page per line block.
pub fn extract_text(bytes: &[u8]) -> Extraction {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Could not parse PDF: {}", e);
            return Extraction::failed();
        }
    };

    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    let mut parts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => parts.push(text.trim().to_string()),
            Err(e) => warn!("Could not extract text from page {}: {}", page_num, e),
        }
    }

    let text = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let status = if text.is_empty() {
        ExtractionStatus::Empty
    } else {
        ExtractionStatus::Ok
    };

    Extraction {
        text,
        page_count,
        status,
    }
}
