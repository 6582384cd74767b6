//! Liveness and summary endpoints: `GET /api/health` and `GET /api/stats`.

pub mod health;
pub mod stats;

use actix_web::web::{get, scope, to};
use actix_web::Scope;

use crate::services::unknown_endpoint;

const API_PATH: &str = "/api";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/health", get().to(health::process))
        .route("/stats", get().to(stats::process))
        .default_service(to(unknown_endpoint))
}
