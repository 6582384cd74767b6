use actix_web::{web, HttpResponse};
use common::requests::Pagination;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/documents?page=&per_page=`
pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse, ApiError> {
    let Pagination { page, per_page } = query.into_inner();
    let store = state.store.clone();
    let page = web::block(move || store.list(page, per_page)).await??;
    Ok(HttpResponse::Ok().json(page))
}
