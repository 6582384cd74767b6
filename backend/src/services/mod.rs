//! HTTP API.
//!
//! Each sub-module owns one path prefix and exposes a `configure_routes()`
//! returning its Actix `Scope`. `configure` wires them all, plus the
//! extractor error handlers, into an application. Every error under `/api`,
//! including a bad path segment or an unknown endpoint, is a JSON body.

pub mod documents;
pub mod guard;
pub mod jobs;
pub mod query;
pub mod system;


use actix_web::middleware::DefaultHeaders;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::ApiError;

const JSON_LIMIT: usize = 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| {
                ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into()
            }),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .service(documents::configure_upload_routes())
    .service(documents::configure_routes())
    .service(query::configure_routes())
    .service(jobs::configure_routes())
    // `/api` catches every remaining API path, so it goes last.
    .service(system::configure_routes());
}

/// Default service of every API scope.
pub async fn unknown_endpoint(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(format!("No API endpoint at {}", req.path())))
}

/// Headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
}
