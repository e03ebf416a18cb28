//! Validation predicates run by the wizard before it lets the prospect move
//! on. All of them are advisory: they return errors as values and the caller
//! decides whether to block navigation.

pub mod fields;
pub mod owners;

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Basic `local@domain.tld` shape check; no attempt at full RFC 5322.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub use fields::{validate_field, FieldError};
pub use owners::{validate_owners, OwnershipError, SignaturePolicy};
