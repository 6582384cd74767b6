//! Document endpoints.
//!
//! Routes under `/api/upload`:
//! - `POST /api/upload`: multipart upload (`file`, optional `description`
//!   and `tags`). Stores the bytes, extracts the text, inserts the record and,
//!   when enabled, schedules a background enrichment job.
//! - `GET /api/upload/status/{id}`: processing status of an uploaded document.
//!
//! Routes under `/api/documents`:
//! - `GET /api/documents?page=&per_page=`: newest first, content as preview.
//! - `GET /api/documents/stats`: totals over all documents.
//! - `GET|PATCH|DELETE /api/documents/{id}`: read, edit metadata, remove
//!   record and file.
//! - `GET /api/documents/{id}/file`: the stored PDF.
//! - `POST /api/documents/{id}/summary` and `/keywords`: AI insights.
//!
//! Every handler that changes state checks the API key first.

mod delete;
mod file;
mod get;
mod insights;
mod list;
mod status;
mod update;
mod upload;

use actix_web::web::{delete, get, patch, post, scope, to};
use actix_web::Scope;

use crate::services::{system, unknown_endpoint};

const API_PATH: &str = "/api/documents";
const UPLOAD_PATH: &str = "/api/upload";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        // Before `/{id}` so "stats" is not parsed as an id.
        .route("/stats", get().to(system::stats::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", patch().to(update::process))
        .route("/{id}", delete().to(delete::process))
        .route("/{id}/file", get().to(file::process))
        .route("/{id}/summary", post().to(insights::summary))
        .route("/{id}/keywords", post().to(insights::keywords))
        .default_service(to(unknown_endpoint))
}

pub fn configure_upload_routes() -> Scope {
    scope(UPLOAD_PATH)
        .route("", post().to(upload::process))
        .route("/status/{id}", get().to(status::process))
        .default_service(to(unknown_endpoint))
}
