//! `DELETE /api/documents/{id}`
//!
//! The stored file is removed before the row. A file that is already gone is
//! only logged, but any other failure to remove it keeps the row and answers
//! 500, so a record is never dropped while its bytes stay on disk.

use actix_web::{web, HttpRequest, HttpResponse};
use common::model::document::DeleteResponse;
use log::{info, warn};
use std::path::Path;

use crate::error::ApiError;
use crate::services::guard::require_api_key;
use crate::state::AppState;

pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    require_api_key(&req, &state.config)?;
    let id = id.into_inner();

    let store = state.store.clone();
    let document = web::block(move || store.get(id)).await??;

    match state.uploads.remove(Path::new(&document.file_path)) {
        Ok(true) => {}
        Ok(false) => warn!(
            "File {} of document {} was already missing",
            document.file_path, id
        ),
        Err(e) => {
            return Err(ApiError::Internal(format!(
                "Could not remove the file of document {}, record kept: {}",
                id, e
            )));
        }
    }

    let store = state.store.clone();
    web::block(move || store.delete(id)).await??;

    info!("Deleted document {} ({})", id, document.original_filename);
    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "Document deleted successfully".to_string(),
        document_id: id,
    }))
}
