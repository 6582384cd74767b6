use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Document count, total size and total pages. Served at both
/// `/api/stats` and `/api/documents/stats`.
pub async fn process(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let store = state.store.clone();
    let stats = web::block(move || store.stats()).await??;
    Ok(HttpResponse::Ok().json(stats))
}
