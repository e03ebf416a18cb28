//! Shared model and rules for the merchant onboarding workspace.
//!
//! Everything in this crate is plain data and pure functions so the same rules
//! run in the browser (`frontend`) and in native unit tests:
//!
//! - `model`: DTOs exchanged with the REST API (templates, prospects, owners,
//!   addresses, signatures, testing utilities).
//! - `validation`: owner/signature checks and per-field format checks.
//! - `conditional`: show/hide rules evaluated against the wizard's form data.
//! - `editor`: template editing operations (id normalization, reordering,
//!   derived `requiredFields`/`conditionalFields`).
//! - `wizard`: step navigation gated by validation of the visible section.
//! - `autosave`: request sequencing so stale save responses are discarded.
//! - `address`: the address entry state machine.
//! - `checklist`: manual QA checklist bookkeeping.
//! - `api`: endpoint paths and error-body parsing.

pub mod address;
pub mod api;
pub mod autosave;
pub mod checklist;
pub mod conditional;
pub mod editor;
pub mod error;
pub mod model;
pub mod validation;
pub mod wizard;
