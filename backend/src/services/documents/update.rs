use actix_web::{web, HttpRequest, HttpResponse};
use common::model::document::DocumentResponse;
use common::requests::MetadataUpdate;
use log::info;

use crate::error::ApiError;
use crate::services::guard::require_api_key;
use crate::state::AppState;
use crate::validation::{sanitize_description, sanitize_tags};

/// `PATCH /api/documents/{id}`: replaces description and/or tags.
///
/// An empty description or tag list clears the field; an absent one leaves
/// it untouched. Extracted text and file data cannot be changed.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<MetadataUpdate>,
) -> Result<HttpResponse, ApiError> {
    require_api_key(&req, &state.config)?;

    let id = id.into_inner();
    let update = body.into_inner();
    let description = update
        .description
        .map(|d| sanitize_description(&d).unwrap_or_default());
    let tags = update.tags.map(sanitize_tags);

    let store = state.store.clone();
    let document = web::block(move || store.update_metadata(id, description, tags)).await??;

    info!("Updated metadata of document {}", id);
    Ok(HttpResponse::Ok().json(DocumentResponse { document }))
}
