//! Async wrappers over the backend JSON API.
//!
//! Every call resolves to `Result<T, String>` where the error is already a
//! message fit for a toast: the backend's `{"error": ...}` text when there is
//! one, otherwise a generic description of the failure.

use common::jobs::JobStatus;
use common::model::document::{DeleteResponse, DocumentPage, DocumentResponse, UploadResponse};
use common::model::query::{InsightResponse, QueryResponse};
use common::model::stats::{Health, Stats};
use common::requests::{MetadataUpdate, QueryRequest};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use web_sys::FormData;

use crate::helpers::error_message;

const API_KEY_HEADER: &str = "X-API-Key";

/// Which AI insight to request for a document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InsightKind {
    Summary,
    Keywords,
}

impl InsightKind {
    fn path(&self) -> &'static str {
        match self {
            InsightKind::Summary => "summary",
            InsightKind::Keywords => "keywords",
        }
    }
}

fn with_key(builder: RequestBuilder, api_key: &str) -> RequestBuilder {
    if api_key.is_empty() {
        builder
    } else {
        builder.header(API_KEY_HEADER, api_key)
    }
}

async fn read<T: DeserializeOwned>(response: Result<Response, gloo_net::Error>) -> Result<T, String> {
    let response = response.map_err(|e| format!("Network error: {}", e))?;
    if response.ok() {
        response
            .json::<T>()
            .await
            .map_err(|e| format!("Unexpected response: {}", e))
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_message(status, &body))
    }
}

pub async fn list_documents(page: u32, per_page: u32) -> Result<DocumentPage, String> {
    let url = format!("/api/documents?page={}&per_page={}", page, per_page);
    read(Request::get(&url).send().await).await
}

pub async fn get_document(id: i64) -> Result<DocumentResponse, String> {
    read(Request::get(&format!("/api/documents/{}", id)).send().await).await
}

pub async fn delete_document(id: i64, api_key: &str) -> Result<DeleteResponse, String> {
    let url = format!("/api/documents/{}", id);
    read(with_key(Request::delete(&url), api_key).send().await).await
}

pub async fn update_metadata(
    id: i64,
    update: &MetadataUpdate,
    api_key: &str,
) -> Result<DocumentResponse, String> {
    let url = format!("/api/documents/{}", id);
    let request = with_key(Request::patch(&url), api_key)
        .json(update)
        .map_err(|e| e.to_string())?;
    read(request.send().await).await
}

pub async fn upload(form: FormData, api_key: &str) -> Result<UploadResponse, String> {
    let request = with_key(Request::post("/api/upload"), api_key)
        .body(form)
        .map_err(|e| e.to_string())?;
    read(request.send().await).await
}

pub async fn insight(id: i64, kind: InsightKind, api_key: &str) -> Result<InsightResponse, String> {
    let url = format!("/api/documents/{}/{}", id, kind.path());
    read(with_key(Request::post(&url), api_key).send().await).await
}

pub async fn ask(request: &QueryRequest) -> Result<QueryResponse, String> {
    let request = Request::post("/api/query")
        .json(request)
        .map_err(|e| e.to_string())?;
    read(request.send().await).await
}

pub async fn job(job_id: &str) -> Result<JobStatus, String> {
    read(Request::get(&format!("/api/jobs/{}", job_id)).send().await).await
}

pub async fn stats() -> Result<Stats, String> {
    read(Request::get("/api/stats").send().await).await
}

pub async fn health() -> Result<Health, String> {
    read(Request::get("/api/health").send().await).await
}
