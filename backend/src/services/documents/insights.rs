//! `POST /api/documents/{id}/summary` and `POST /api/documents/{id}/keywords`.
//!
//! Both ask the AI provider about a single document and return an
//! `InsightResponse`. The result is not stored; the background enrichment job
//! is what writes generated metadata.

use actix_web::{web, HttpRequest, HttpResponse};
use common::model::query::InsightResponse;

use crate::ai::query::Completion;
use crate::error::ApiError;
use crate::services::guard::require_api_key;
use crate::state::AppState;
use crate::storage::db::DocumentText;

pub async fn summary(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_api_key(&req, &state.config)?;
    let document = readable_document(&state, id.into_inner()).await?;

    let completion = state.query.summarize(&document.content).await;
    let mut response = insight(&document, &completion);
    if let Completion::Answered(text) = completion {
        response.summary = Some(text);
    }
    Ok(HttpResponse::Ok().json(response))
}

pub async fn keywords(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_api_key(&req, &state.config)?;
    let document = readable_document(&state, id.into_inner()).await?;

    let (completion, keywords) = state.query.keywords(&document.content).await;
    let mut response = insight(&document, &completion);
    response.keywords = Some(keywords);
    Ok(HttpResponse::Ok().json(response))
}

/// The document's text, or 400 when it has none.
async fn readable_document(state: &AppState, id: i64) -> Result<DocumentText, ApiError> {
    let store = state.store.clone();
    let mut texts = web::block(move || store.texts(Some(id))).await??;
    let document = texts.pop().ok_or(ApiError::NotFound(format!("Document {} not found", id)))?;

    if document.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Document has no readable content".to_string(),
        ));
    }
    Ok(document)
}

fn insight(document: &DocumentText, completion: &Completion) -> InsightResponse {
    InsightResponse {
        document_id: document.id,
        filename: document.original_name.clone(),
        status: completion.status(),
        summary: None,
        keywords: None,
        error: match completion {
            Completion::Unavailable => Some("AI service is not available".to_string()),
            Completion::Degraded(e) => Some(e.clone()),
            Completion::Answered(_) => None,
        },
    }
}
