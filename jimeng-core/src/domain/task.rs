//! Generation task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote video generation task
///
/// Created by the submit call and mutated only by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub content: Option<TaskContent>,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Video reference of a succeeded task, if the service returned one
    pub fn video_url(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.video_url.as_str())
    }
}

/// Task execution status
///
/// The remote service reports waiting tasks as `queued`; they are mapped to
/// [`TaskStatus::Pending`]. Statuses this crate does not know are kept as
/// [`TaskStatus::Unknown`] and treated as non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "queued")]
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// No further status change is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Terminal without a usable result
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a succeeded task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskContent {
    pub video_url: String,
}

/// Error details reported by the service for a failed task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskError {
    pub code: String,
    pub message: String,
}
