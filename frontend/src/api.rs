//! Thin `gloo-net` wrappers over the REST API.
//!
//! Every call resolves to `Result<T, ApiError>`: non-2xx responses carry the
//! message extracted from the JSON error body (or the caller's fallback),
//! and empty 2xx bodies decode as JSON `null`. Nothing is retried.

use common::error::ApiError;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn network(err: gloo_net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

async fn read<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ApiError> {
    let status = response.status();
    let ok = response.ok();
    let body = response.text().await.map_err(network)?;
    if !ok {
        gloo_console::error!(format!("{} {}: {}", status, response.url(), body));
        return Err(ApiError::from_response(status, &body, fallback));
    }
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn get<T: DeserializeOwned>(path: &str, fallback: &str) -> Result<T, ApiError> {
    let response = Request::get(path).send().await.map_err(network)?;
    read(response, fallback).await
}

pub async fn post<B: Serialize, T: DeserializeOwned>(
    path: &str,
    body: &B,
    fallback: &str,
) -> Result<T, ApiError> {
    let response = Request::post(path)
        .json(body)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    read(response, fallback).await
}

/// POST without a body (`start-application`, `clear-prospects`, ...).
pub async fn post_empty<T: DeserializeOwned>(path: &str, fallback: &str) -> Result<T, ApiError> {
    let response = Request::post(path).send().await.map_err(network)?;
    read(response, fallback).await
}

pub async fn put<B: Serialize, T: DeserializeOwned>(
    path: &str,
    body: &B,
    fallback: &str,
) -> Result<T, ApiError> {
    let response = Request::put(path)
        .json(body)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    read(response, fallback).await
}

pub async fn delete(path: &str, fallback: &str) -> Result<(), ApiError> {
    let response = Request::delete(path).send().await.map_err(network)?;
    read::<serde_json::Value>(response, fallback).await.map(|_| ())
}

/// Multipart POST; the browser sets the boundary header itself.
pub async fn post_form<T: DeserializeOwned>(
    path: &str,
    form: web_sys::FormData,
    fallback: &str,
) -> Result<T, ApiError> {
    let response = Request::post(path)
        .body(form)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    read(response, fallback).await
}

/// URI-encodes a single path segment (tokens, e-mails, export names).
pub fn segment(value: &str) -> String {
    String::from(js_sys::encode_uri_component(value))
}
