//! Node error types

use jimeng_client::ClientError;
use thiserror::Error;

use crate::image::EncodeError;
use crate::materialize::MaterializeError;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors surfaced to the host when a node invocation fails
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("no node registered under '{0}'")]
    UnknownNode(String),

    #[error("{node}: missing required input '{input}'")]
    MissingInput { node: String, input: String },

    #[error("input '{input}' expects a {expected} value")]
    TypeMismatch {
        input: String,
        expected: &'static str,
    },

    #[error("invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// Task creation failed; the task is not retried
    #[error("create task failed: {0}")]
    Submission(#[source] ClientError),

    /// The task ended in a failed or cancelled state
    #[error(transparent)]
    Task(ClientError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

impl NodeError {
    pub fn invalid_input(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
