use actix_web::{web, HttpResponse, Responder};
use common::model::stats::Health;

use crate::state::AppState;

pub async fn process(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(Health {
        status: "healthy".to_string(),
        message: "PDF query API is running".to_string(),
        ai_available: state.query.is_available(),
        provider: state.query.provider_name(),
    })
}
