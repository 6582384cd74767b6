mod ai;
mod config;
mod error;
mod extract;
mod job_controller;
mod services;
mod state;
mod storage;
mod validation;

#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::state::AppState;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv = config::load_dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = Config::from_env();
    config.log_summary();

    let provider = match ai::create_provider(&config.ai) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Could not set up the AI provider, continuing without it: {}", e);
            None
        }
    };

    let host = config.host.clone();
    let port = config.port;
    let url = config.bind_url();

    if config.open_browser {
        let url_clone = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&url_clone);
        });
    }

    let state = AppState::new(config, provider).map_err(std::io::Error::other)?;

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .wrap(services::security_headers())
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
