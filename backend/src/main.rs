mod config;
mod services;

use crate::config::Config;
use crate::services::api_proxy::{self, ApiProxy};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{info, warn};
use mime_guess::from_path;
use std::io;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

/// Template uploads carry the PDF in the request body.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Serves the embedded single-page app. Unknown paths without a file
/// extension get `index.html` so the client can pick the page
/// (`/apply/{token}`, `/testing`); unknown assets are a plain 404.
async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    if let Some(file) = STATIC_DIR.get_file(file_path) {
        let mime = from_path(file_path).first_or_octet_stream();
        return HttpResponse::Ok()
            .content_type(mime.as_ref())
            .body(file.contents().to_vec());
    }
    let looks_like_asset = file_path
        .rsplit('/')
        .next()
        .is_some_and(|name| name.contains('.'));
    match STATIC_DIR.get_file("index.html") {
        Some(index) if !looks_like_asset => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(index.contents().to_vec()),
        _ => HttpResponse::NotFound().body("Not Found"),
    }
}

fn open_browser_later(url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        if let Err(err) = webbrowser::open(&url) {
            warn!("could not open a browser at {}: {}", url, err);
        }
    });
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("ignoring unreadable .env file: {err}");
        }
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let url = config.url();

    match &config.api_upstream {
        Some(upstream) => info!("Forwarding /api to {}", upstream),
        None => warn!("MERCHANT_API_UPSTREAM is not set; /api requests will answer 503"),
    }
    let proxy = web::Data::new(ApiProxy::new(config.api_upstream.clone()).map_err(io::Error::other)?);

    if config.open_browser {
        open_browser_later(url.clone());
    }
    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .app_data(proxy.clone())
            .service(api_proxy::configure_routes())
            .default_service(web::route().to(serve_embedded))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn client_routes_fall_back_to_index() {
        let app = test::init_service(App::new().default_service(web::route().to(serve_embedded))).await;
        for uri in ["/", "/apply/tok-123", "/testing"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
            assert!(content_type.starts_with("text/html"), "{uri}: {content_type}");
        }
    }

    #[actix_web::test]
    async fn missing_assets_are_404() {
        let app = test::init_service(App::new().default_service(web::route().to(serve_embedded))).await;
        let req = test::TestRequest::get().uri("/no-such-bundle.wasm").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
