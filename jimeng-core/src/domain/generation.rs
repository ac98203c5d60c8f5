//! Generation request domain types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ParseChoiceError;

/// Lite image-to-video model, the default for both generation modes
pub const SEEDANCE_LITE_I2V: &str = "doubao-seedance-1-0-lite-i2v-250428";

/// Pro model, image-to-video only
pub const SEEDANCE_PRO: &str = "doubao-seedance-1-0-pro-250528";

/// Models accepted for single-image generation
pub const IMAGE_TO_VIDEO_MODELS: &[&str] = &[SEEDANCE_LITE_I2V, SEEDANCE_PRO];

/// Models accepted for first/last frame generation
pub const FIRST_LAST_FRAME_MODELS: &[&str] = &[SEEDANCE_LITE_I2V];

/// Output resolution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Resolution {
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    pub const ALL: &'static [&'static str] = &["480p", "720p", "1080p"];

    /// 1080p is not offered for first/last frame generation
    pub const FIRST_LAST_FRAME: &'static [&'static str] = &["480p", "720p"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl FromStr for Resolution {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "480p" => Ok(Self::P480),
            "720p" => Ok(Self::P720),
            "1080p" => Ok(Self::P1080),
            _ => Err(ParseChoiceError {
                kind: "resolution",
                value: s.to_string(),
                allowed: Self::ALL,
            }),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clip length in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClipDuration {
    #[default]
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "10")]
    Ten,
}

impl ClipDuration {
    pub const ALL: &'static [&'static str] = &["5", "10"];

    pub fn seconds(&self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
        }
    }
}

impl FromStr for ClipDuration {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5" => Ok(Self::Five),
            "10" => Ok(Self::Ten),
            _ => Err(ParseChoiceError {
                kind: "duration",
                value: s.to_string(),
                allowed: Self::ALL,
            }),
        }
    }
}

impl std::fmt::Display for ClipDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.seconds())
    }
}

/// Role of an image when a first/last frame pair is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRole {
    FirstFrame,
    LastFrame,
}

/// Images attached to a generation request, as data URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameImages {
    /// A single reference image
    Single(String),
    /// Explicit first and last frames
    FirstLast { first: String, last: String },
}

impl FrameImages {
    /// Image payloads in submission order, tagged with a role when paired
    pub fn parts(&self) -> Vec<(&str, Option<FrameRole>)> {
        match self {
            Self::Single(url) => vec![(url.as_str(), None)],
            Self::FirstLast { first, last } => vec![
                (first.as_str(), Some(FrameRole::FirstFrame)),
                (last.as_str(), Some(FrameRole::LastFrame)),
            ],
        }
    }
}

/// A video generation request
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    duration: ClipDuration,
    resolution: Resolution,
    camera_fixed: bool,
    images: FrameImages,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        duration: ClipDuration,
        resolution: Resolution,
        camera_fixed: bool,
        images: FrameImages,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            duration,
            resolution,
            camera_fixed,
            images,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn duration(&self) -> ClipDuration {
        self.duration
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn camera_fixed(&self) -> bool {
        self.camera_fixed
    }

    pub fn images(&self) -> &FrameImages {
        &self.images
    }

    /// Prompt with the generation parameters appended as inline directives
    pub fn instruction_text(&self) -> String {
        format!(
            "{} --resolution {} --dur {} --camerafixed {}",
            self.prompt, self.resolution, self.duration, self.camera_fixed
        )
    }
}
