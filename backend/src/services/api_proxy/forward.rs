use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, warn};
use serde_json::json;
use std::time::Duration;

/// Upstream requests give up after this long.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Headers that describe one hop and must not be relayed.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

pub struct ApiProxy {
    client: reqwest::Client,
    upstream: Option<String>,
}

impl ApiProxy {
    pub fn new(upstream: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> Option<&str> {
        self.upstream.as_deref()
    }
}

pub(crate) fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// `https://api.test` + `/api/acquirers?x=1` → `https://api.test/api/acquirers?x=1`
pub(crate) fn target_url(upstream: &str, path_and_query: &str) -> String {
    format!("{}{}", upstream.trim_end_matches('/'), path_and_query)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message.into() }))
}

pub(crate) async fn process(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<ApiProxy>,
) -> HttpResponse {
    let Some(upstream) = proxy.upstream() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "No API upstream is configured (set MERCHANT_API_UPSTREAM)",
        );
    };
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    let url = target_url(upstream, path_and_query);

    let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
        Ok(method) => method,
        Err(_) => return error_response(StatusCode::METHOD_NOT_ALLOWED, "Unsupported method"),
    };
    debug!("{} {} -> {}", method, path_and_query, url);

    let mut outgoing = proxy.client.request(method, &url);
    for (name, value) in req.headers() {
        if !is_hop_by_hop(name.as_str()) {
            outgoing = outgoing.header(name.as_str(), value.as_bytes());
        }
    }

    let response = match outgoing.body(body.to_vec()).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!("upstream request to {} failed: {}", url, err);
            return error_response(StatusCode::BAD_GATEWAY, format!("API upstream unavailable: {err}"));
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut relayed = HttpResponse::build(status);
    for (name, value) in response.headers() {
        if is_hop_by_hop(name.as_str()) || name.as_str().eq_ignore_ascii_case("content-length") {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            relayed.append_header((name, value));
        }
    }

    match response.bytes().await {
        Ok(bytes) => relayed.body(bytes.to_vec()),
        Err(err) => {
            warn!("reading upstream response from {} failed: {}", url, err);
            error_response(StatusCode::BAD_GATEWAY, format!("API upstream response was cut short: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api_proxy::configure_routes;
    use actix_web::{test, App};
    use serde_json::Value;

    #[::core::prelude::v1::test]
    fn joins_upstream_and_path() {
        assert_eq!(
            target_url("https://api.test/", "/api/acquirers?active=1"),
            "https://api.test/api/acquirers?active=1"
        );
    }

    #[::core::prelude::v1::test]
    fn filters_hop_by_hop_headers() {
        assert!(is_hop_by_hop("Connection"));
        assert!(is_hop_by_hop("host"));
        assert!(!is_hop_by_hop("content-type"));
        assert!(!is_hop_by_hop("authorization"));
    }

    #[actix_web::test]
    async fn without_upstream_answers_503_json() {
        let proxy = ApiProxy::new(None).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(proxy))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/acquirers").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("MERCHANT_API_UPSTREAM"));
    }

    #[actix_web::test]
    async fn unreachable_upstream_answers_502_json() {
        let proxy = ApiProxy::new(Some("http://127.0.0.1:1".to_string())).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(proxy))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/prospects/7/save-form-data")
            .set_payload(r#"{"formData":{},"currentStep":0}"#)
            .insert_header(("content-type", "application/json"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("API upstream unavailable"));
    }
}
