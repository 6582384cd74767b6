use actix_web::{web, HttpResponse};
use common::requests::QueryRequest;
use log::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_query;

/// Validates the question, loads the relevant text and lets the query
/// service answer. Every outcome after validation is a 200 whose `status`
/// tells whether the provider actually answered; only an unknown
/// `document_id` is a 404.
pub async fn process(
    state: web::Data<AppState>,
    body: web::Json<QueryRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let question = validate_query(&request.query)?;
    let document_id = request.document_id;

    let store = state.store.clone();
    let texts = web::block(move || store.texts(document_id)).await??;

    let response = state.query.answer(&question, document_id, &texts).await;
    info!(
        "Query over {} document(s) finished with status {:?}",
        response.documents_searched, response.status
    );
    Ok(HttpResponse::Ok().json(response))
}
