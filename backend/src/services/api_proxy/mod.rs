//! # API Forwarding
//!
//! The frontend talks to a single origin. Every request under `/api` is
//! relayed unchanged to the REST service named by `MERCHANT_API_UPSTREAM`
//! and its answer is relayed back with its status, headers and body.
//!
//! ## Failure mapping
//! - no upstream configured: `503` with `{"error": ...}`
//! - upstream unreachable or the exchange breaks: `502` with `{"error": ...}`
//!
//! Nothing is retried or cached here.

mod forward;

use actix_web::web::{route, scope};
use actix_web::Scope;

pub use forward::ApiProxy;

/// Path prefix relayed to the upstream.
const API_PATH: &str = "/api";

/// Registers the catch-all `/api/**` relay.
pub fn configure_routes() -> Scope {
    scope(API_PATH).default_service(route().to(forward::process))
}
