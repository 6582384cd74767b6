//! `GET /api/jobs/{job_id}`: status of a background enrichment job.

mod get_status;

use actix_web::web::{get, scope, to};
use actix_web::Scope;

use crate::services::unknown_endpoint;

const API_PATH: &str = "/api/jobs";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{job_id}", get().to(get_status::process))
        .default_service(to(unknown_endpoint))
}
