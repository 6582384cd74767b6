use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) async fn process(
    job_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let job_id = job_id.into_inner();
    match state.jobs.status(&job_id).await {
        Some(status) => Ok(HttpResponse::Ok().json(status)),
        None => Err(ApiError::NotFound(format!("Job {} not found", job_id))),
    }
}
