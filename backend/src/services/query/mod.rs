//! `POST /api/query`: ask a question about one document or all of them.

mod ask;

use actix_web::web::{post, scope, to};
use actix_web::Scope;

use crate::services::unknown_endpoint;

const API_PATH: &str = "/api/query";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(ask::process))
        .default_service(to(unknown_endpoint))
}
