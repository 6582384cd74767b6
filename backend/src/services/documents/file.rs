use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/documents/{id}/file`: the stored PDF, shown inline under its
/// original filename.
pub async fn process(
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> Result<NamedFile, ApiError> {
    let id = id.into_inner();
    let store = state.store.clone();
    let document = web::block(move || store.get(id)).await??;

    let file = NamedFile::open_async(&document.file_path)
        .await
        .map_err(|_| ApiError::NotFound(format!("File of document {} not found", id)))?;

    Ok(file
        .set_content_type(mime_guess::mime::APPLICATION_PDF)
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(document.original_filename)],
        }))
}
