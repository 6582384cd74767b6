use actix_web::{web, HttpResponse};
use common::model::document::UploadStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/upload/status/{id}`. Uploads are processed synchronously, so a
/// stored document is always `completed`.
pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let store = state.store.clone();
    let document = web::block(move || store.get(id)).await??;
    Ok(HttpResponse::Ok().json(UploadStatus {
        status: "completed".to_string(),
        document,
    }))
}
