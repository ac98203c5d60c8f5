//! Output artifact domain types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ParseChoiceError;

/// Container format requested for a saved video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    Auto,
    #[default]
    Mp4,
}

impl VideoContainer {
    /// Choices offered to the host, in display order
    pub const CHOICES: &'static [&'static str] = &["auto", "mp4"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Mp4 => "mp4",
        }
    }

    /// File extension used when saving in this container
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Auto | Self::Mp4 => "mp4",
        }
    }
}

impl FromStr for VideoContainer {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "mp4" => Ok(Self::Mp4),
            _ => Err(ParseChoiceError {
                kind: "format",
                value: s.to_string(),
                allowed: Self::CHOICES,
            }),
        }
    }
}

/// A versioned output file name: `<prefix>_<counter:05>_.<extension>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub prefix: String,
    pub counter: u64,
    pub extension: String,
}

impl OutputArtifact {
    pub fn new(prefix: impl Into<String>, counter: u64, container: VideoContainer) -> Self {
        Self {
            prefix: prefix.into(),
            counter,
            extension: container.extension().to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{:05}_.{}", self.prefix, self.counter, self.extension)
    }
}
