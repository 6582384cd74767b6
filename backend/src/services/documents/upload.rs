//! # Upload Service
//!
//! `POST /api/upload` accepts a multipart form with a `file` part and the
//! optional text parts `description` and `tags` (comma separated).
//!
//! ## Workflow
//!
//! 1. **Validation of the file part** before anything touches the disk: the
//!    claimed filename (length, sanitized form, extension) and the claimed
//!    content type.
//! 2. **Streaming to disk** under a fresh `{uuid}_{name}` in the upload
//!    directory. While streaming, the size limit is enforced, the MD5 checksum
//!    is computed and the first bytes are kept for the `%PDF-` signature check.
//!    Any failure from here on removes the partial file.
//! 3. **Extraction** of the text on the blocking pool. A PDF the parser cannot
//!    read is still stored, with `extraction_status = failed`.
//! 4. **Insert** of the record. If it fails the file is removed again, so no
//!    file is ever left without its row.
//! 5. **Enrichment**: with a provider configured and enough text, a
//!    background job is scheduled and its id returned to the client.

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse};
use common::model::document::UploadResponse;
use futures_util::StreamExt;
use log::{info, warn};
use md5::Context;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::ApiError;
use crate::extract::extract_file;
use crate::job_controller::enrich::{schedule_enrichment, should_enrich};
use crate::services::guard::require_api_key;
use crate::state::AppState;
use crate::storage::db::NewDocument;
use crate::storage::files::{
    extension_of, has_pdf_signature, sanitize_filename, stored_name_for, MAX_FILENAME_CHARS,
    SIGNATURE_WINDOW,
};
use crate::validation::{sanitize_description, sanitize_tags};

const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/x-pdf",
    "application/x-bzpdf",
    "application/x-gzpdf",
    "application/octet-stream",
];

/// Upper bound for the text parts of the form.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// A file written to the upload directory, not yet recorded.
struct StoredFile {
    original_name: String,
    stored_name: String,
    path: PathBuf,
    size: u64,
    checksum: String,
}

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    require_api_key(&req, &state.config)?;
    upload_document(state, payload).await
}

async fn upload_document(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut stored: Option<StoredFile> = None;
    let mut description: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();

    while let Some(item) = payload.next().await {
        let field = match item {
            Ok(field) => field,
            Err(e) => {
                discard(&state, stored.as_ref());
                return Err(e.into());
            }
        };
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        let result = match name.as_deref() {
            Some("file") if stored.is_none() => receive_file(&state, field)
                .await
                .map(|file| stored = Some(file)),
            Some("description") => read_text(field)
                .await
                .map(|text| description = sanitize_description(&text)),
            Some("tags") => read_text(field)
                .await
                .map(|text| tags = sanitize_tags(text.split(','))),
            _ => skip(field).await,
        };

        if let Err(e) = result {
            discard(&state, stored.as_ref());
            return Err(e);
        }
    }

    let file = stored.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let path = file.path.clone();
    let extraction = web::block(move || extract_file(&path)).await;
    let extraction = match extraction {
        Ok(extraction) => extraction,
        Err(e) => {
            discard(&state, Some(&file));
            return Err(e.into());
        }
    };

    let new_document = NewDocument {
        stored_name: file.stored_name.clone(),
        original_name: file.original_name.clone(),
        file_path: file.path.to_string_lossy().into_owned(),
        content: extraction.text,
        file_size: file.size,
        page_count: extraction.page_count,
        checksum: file.checksum.clone(),
        extraction_status: extraction.status,
        description,
        tags,
    };

    let store = state.store.clone();
    let created = web::block(move || store.create(&new_document)).await;
    let document = match created {
        Ok(Ok(document)) => document,
        Ok(Err(e)) => {
            discard(&state, Some(&file));
            return Err(e.into());
        }
        Err(e) => {
            discard(&state, Some(&file));
            return Err(e.into());
        }
    };

    info!(
        "Stored document {} ({}, {} bytes, {} pages, extraction {})",
        document.id,
        document.original_filename,
        document.file_size,
        document.page_count,
        document.extraction_status.as_str()
    );

    let enrichment_job_id = if state.config.ai.auto_enrich
        && state.query.is_available()
        && should_enrich(&document.content)
    {
        Some(
            schedule_enrichment(
                &state.jobs,
                state.store.clone(),
                state.query.clone(),
                document.id,
                document.content.clone(),
            )
            .await,
        )
    } else {
        None
    };

    Ok(HttpResponse::Created().json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        document,
        enrichment_job_id,
    }))
}

/// Validates the file part and streams it into the upload directory.
async fn receive_file(state: &AppState, mut field: Field) -> Result<StoredFile, ApiError> {
    let original_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
        .unwrap_or_default();

    if original_name.trim().is_empty() {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    }
    if original_name.chars().count() > MAX_FILENAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Filename too long (maximum {} characters)",
            MAX_FILENAME_CHARS
        )));
    }

    let sanitized = sanitize_filename(&original_name);
    if sanitized.is_empty() {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let allowed = extension_of(&sanitized)
        .map(|ext| state.config.allowed_extensions.contains(&ext))
        .unwrap_or(false);
    if !allowed {
        return Err(ApiError::BadRequest(format!(
            "File type not allowed. Allowed types: {}",
            state.config.allowed_extensions.join(", ")
        )));
    }

    if let Some(mime) = field.content_type() {
        let essence = mime.essence_str();
        if !ALLOWED_MIME_TYPES.contains(&essence) {
            return Err(ApiError::BadRequest(format!("Invalid file type: {}", essence)));
        }
    }

    let stored_name = stored_name_for(&sanitized);
    let path = state.uploads.path_for(&stored_name)?;
    let file = state.uploads.create(&path)?;

    let streamed = stream_to_disk(state, &mut field, BufWriter::new(file), &path).await;
    let (size, checksum) = match streamed {
        Ok(done) => done,
        Err(e) => {
            remove_quietly(state, &path);
            return Err(e);
        }
    };

    Ok(StoredFile {
        original_name,
        stored_name,
        path,
        size,
        checksum,
    })
}

/// Writes the field to `writer`, enforcing the size limit and the PDF
/// signature. Returns the size and the hex MD5 of the bytes.
async fn stream_to_disk(
    state: &AppState,
    field: &mut Field,
    mut writer: BufWriter<std::fs::File>,
    path: &Path,
) -> Result<(u64, String), ApiError> {
    let max = state.config.max_upload_bytes;
    let mut md5_hasher = Context::new();
    let mut head: Vec<u8> = Vec::with_capacity(SIGNATURE_WINDOW);
    let mut size: u64 = 0;

    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        size += chunk.len() as u64;
        if size > max {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large (maximum {} bytes)",
                max
            )));
        }

        if head.len() < SIGNATURE_WINDOW {
            let take = (SIGNATURE_WINDOW - head.len()).min(chunk.len());
            head.extend_from_slice(&chunk[..take]);
        }

        md5_hasher.consume(&chunk);
        state.uploads.write_all(&mut writer, path, &chunk)?;
    }
    state.uploads.flush(&mut writer, path)?;

    if size == 0 {
        return Err(ApiError::BadRequest("Empty file not allowed".to_string()));
    }
    if !has_pdf_signature(&head) {
        return Err(ApiError::BadRequest(
            "File content doesn't match PDF format".to_string(),
        ));
    }

    Ok((size, format!("{:x}", md5_hasher.finalize())))
}

async fn read_text(mut field: Field) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(ApiError::BadRequest("Form field too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| ApiError::BadRequest("Form field is not valid UTF-8".to_string()))
}

/// Drains a part the handler does not use.
async fn skip(mut field: Field) -> Result<(), ApiError> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

fn discard(state: &AppState, stored: Option<&StoredFile>) {
    if let Some(file) = stored {
        remove_quietly(state, &file.path);
    }
}

fn remove_quietly(state: &AppState, path: &Path) {
    if let Err(e) = state.uploads.remove(path) {
        warn!("Could not remove rejected upload {}: {}", path.display(), e);
    }
}
