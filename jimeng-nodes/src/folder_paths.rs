//! Output folder resolution

use std::path::{Component, Path, PathBuf};

use crate::materialize::{MaterializeError, Result};

/// Where a prefixed output file should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePath {
    /// Directory the file goes into (output root joined with the subfolder)
    pub full_output_folder: PathBuf,
    /// Base file name, without counter or extension
    pub filename: String,
    /// Subfolder relative to the output root, `/`-separated, possibly empty
    pub subfolder: String,
}

/// Root of all saved outputs
#[derive(Debug, Clone)]
pub struct FolderPaths {
    output_dir: PathBuf,
}

impl FolderPaths {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Splits a prefix such as `clips/preview` into subfolder and base name
    ///
    /// Prefixes that would leave the output root are rejected.
    pub fn save_path(&self, prefix: &str) -> Result<SavePath> {
        let normalized = prefix.replace('\\', "/");
        let (subfolder, filename) = match normalized.rsplit_once('/') {
            Some((dir, name)) => (dir.trim_matches('/'), name),
            None => ("", normalized.as_str()),
        };

        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(MaterializeError::InvalidPrefix(prefix.to_string()));
        }

        let escapes = normalized.starts_with('/')
            || Path::new(subfolder)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(MaterializeError::OutsideOutputDir(prefix.to_string()));
        }

        Ok(SavePath {
            full_output_folder: self.output_dir.join(subfolder),
            filename: filename.to_string(),
            subfolder: subfolder.to_string(),
        })
    }
}
