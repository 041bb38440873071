//! Persisting synthesized audio to temporary files.
//!
//! Every call creates a new uniquely named file inside the output directory.
//! Files are kept after the handle is dropped and are never removed here;
//! pruning the directory is left to the operator.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ArtifactError;
use super::request::OutputFormat;

const FILE_PREFIX: &str = "tts-";

/// How the suffix of an audio file is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuffixPolicy {
    /// Always `.mp3`, whatever codec was requested
    #[default]
    Fixed,
    /// Follow the requested codec (`.mp3` when none was given)
    Format,
}

impl std::fmt::Display for SuffixPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuffixPolicy::Fixed => write!(f, "fixed"),
            SuffixPolicy::Format => write!(f, "format"),
        }
    }
}

/// Writes audio payloads to fresh files in a directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    policy: SuffixPolicy,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>, policy: SuffixPolicy) -> Self {
        Self { dir: dir.into(), policy }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File suffix for a request in the given format.
    pub fn suffix_for(&self, format: Option<OutputFormat>) -> &'static str {
        match (self.policy, format) {
            (SuffixPolicy::Fixed, _) | (SuffixPolicy::Format, None | Some(OutputFormat::Mp3)) => ".mp3",
            (SuffixPolicy::Format, Some(OutputFormat::Opus)) => ".opus",
            (SuffixPolicy::Format, Some(OutputFormat::Aac)) => ".aac",
            (SuffixPolicy::Format, Some(OutputFormat::Flac)) => ".flac",
        }
    }

    /// Write `audio` to a new file and return its path.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created or written.
    pub async fn write(&self, audio: Bytes, format: Option<OutputFormat>) -> Result<PathBuf, ArtifactError> {
        let dir = self.dir.clone();
        let suffix = self.suffix_for(format);

        let path = tokio::task::spawn_blocking(move || -> Result<PathBuf, ArtifactError> {
            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::Builder::new().prefix(FILE_PREFIX).suffix(suffix).tempfile_in(&dir)?;
            file.write_all(&audio)?;
            file.flush()?;
            let (_file, path) = file.keep().map_err(|e| e.error)?;
            Ok(path)
        })
        .await??;

        debug!("Wrote audio file {}", path.display());
        Ok(path)
    }
}
