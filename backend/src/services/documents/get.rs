use actix_web::{web, HttpResponse};
use common::model::document::DocumentResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/documents/{id}`: the full record, including all extracted text.
pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let store = state.store.clone();
    let document = web::block(move || store.get(id)).await??;
    Ok(HttpResponse::Ok().json(DocumentResponse { document }))
}
