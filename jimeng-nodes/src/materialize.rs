//! Local materialization of generated videos
//!
//! Copies or downloads a video reference into the output directory under the
//! next free `<prefix>_<counter:05>_.<ext>` name. The counter is recomputed
//! from the directory listing on every call; the scan and the write are not
//! atomic, so concurrent writers sharing a prefix can collide.

use std::path::{Path, PathBuf};

use jimeng_core::domain::artifact::{OutputArtifact, VideoContainer};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::folder_paths::{FolderPaths, SavePath};

/// Result type alias for materialization
pub type Result<T> = std::result::Result<T, MaterializeError>;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("local file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to download video from url: '{url}': {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to write video file to output path: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy video file to output path: {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list output folder {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filename prefix '{0}'")]
    InvalidPrefix(String),

    #[error("filename prefix '{0}' points outside the output directory")]
    OutsideOutputDir(String),
}

/// Outcome of a materialization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// Persistence was disabled or there was nothing to save
    Skipped { reference: String },
    Saved(SavedVideo),
}

/// A video written to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedVideo {
    pub artifact: OutputArtifact,
    /// Absolute or output-root-relative path of the written file
    pub path: PathBuf,
    /// Subfolder relative to the output root
    pub subfolder: String,
}

/// Writes video references into the output directory
#[derive(Debug, Clone)]
pub struct Materializer {
    paths: FolderPaths,
    http: reqwest::Client,
}

impl Materializer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_client(output_dir, reqwest::Client::new())
    }

    pub fn with_client(output_dir: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            paths: FolderPaths::new(output_dir),
            http,
        }
    }

    pub fn paths(&self) -> &FolderPaths {
        &self.paths
    }

    /// Saves `reference` (an http(s) URL or a local path) under `prefix`
    ///
    /// With `save_output` off or an empty reference nothing is touched on
    /// disk and the reference is handed back unchanged.
    pub async fn materialize(
        &self,
        reference: &str,
        prefix: &str,
        container: VideoContainer,
        save_output: bool,
    ) -> Result<Materialized> {
        if !save_output || reference.is_empty() {
            debug!("Skipping save of '{}'", reference);
            return Ok(Materialized::Skipped {
                reference: reference.to_string(),
            });
        }

        let remote = is_remote(reference);
        if !remote && !tokio::fs::metadata(reference).await.is_ok_and(|m| m.is_file()) {
            return Err(MaterializeError::NotFound(PathBuf::from(reference)));
        }

        let save = self.paths.save_path(prefix)?;
        tokio::fs::create_dir_all(&save.full_output_folder)
            .await
            .map_err(|source| MaterializeError::Write {
                path: save.full_output_folder.clone(),
                source,
            })?;

        let artifact = self.next_artifact(&save, container).await?;
        let path = save.full_output_folder.join(artifact.file_name());

        if remote {
            let data = self.download(reference).await?;
            tokio::fs::write(&path, &data)
                .await
                .map_err(|source| MaterializeError::Write {
                    path: path.clone(),
                    source,
                })?;
        } else {
            tokio::fs::copy(reference, &path)
                .await
                .map_err(|source| MaterializeError::Copy {
                    path: path.clone(),
                    source,
                })?;
        }

        info!("Saved video to {}", path.display());

        Ok(Materialized::Saved(SavedVideo {
            artifact,
            path,
            subfolder: save.subfolder,
        }))
    }

    /// Next unused artifact name for `save` in its output folder
    pub async fn next_artifact(
        &self,
        save: &SavePath,
        container: VideoContainer,
    ) -> Result<OutputArtifact> {
        let names = list_file_names(&save.full_output_folder).await?;
        let counter = next_counter(&save.filename, names.iter().map(String::as_str));
        Ok(OutputArtifact::new(&save.filename, counter, container))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let download_error = |source| MaterializeError::Download {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_error)?;
        let bytes = response.bytes().await.map_err(download_error)?;

        debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

async fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let list_error = |source| MaterializeError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_error)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// One past the highest counter among names matching `<filename>_<digits><non-digits>.<ext>`
fn next_counter<'a>(filename: &str, existing: impl Iterator<Item = &'a str>) -> u64 {
    let pattern = format!(r"(?i)^{}_(\d+)\D*\..+$", regex::escape(filename));
    let Ok(matcher) = Regex::new(&pattern) else {
        return 1;
    };

    existing
        .filter_map(|name| matcher.captures(name))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}
