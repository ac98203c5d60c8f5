//! Core domain types
//!
//! These types are shared between the HTTP client (which fills them from the
//! remote API) and the node layer (which builds requests and saves results).

pub mod artifact;
pub mod generation;
pub mod task;

use thiserror::Error;

/// A host-provided string did not match any of the allowed choices
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}', expected one of: {}", .allowed.join(", "))]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}
