//! Waybar status payloads and the runtime-dir JSON sink.
//!
//! Every monitor publishes its state as a single JSON object
//! `{"text", "tooltip", "class"}` written to a file under
//! `$XDG_RUNTIME_DIR`, where a waybar custom module polls it. The sink is
//! deliberately dumb: serialize, write one line, done. A monitor that
//! cannot write its status file has no channel left to report anything,
//! so write failures surface as errors instead of being swallowed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Result type alias for status sink operations.
pub type StatusResult<T> = Result<T, StatusError>;

/// Errors that can occur while publishing a status.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("XDG_RUNTIME_DIR is not set")]
    RuntimeDirUnset,

    #[error("failed to serialize status: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write status file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single waybar custom-module payload.
///
/// `class` selects the CSS class waybar applies. The monitors use
/// `critical` and `warning` for connectivity trouble, `checking`, `none`,
/// `arch`/`aur`/`arch_aur` and `error` for update states, and the empty
/// string for the neutral state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub tooltip: String,
    pub class: String,
}

impl Status {
    /// Build a status from the three waybar fields.
    pub fn new(
        text: impl Into<String>,
        tooltip: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            tooltip: tooltip.into(),
            class: class.into(),
        }
    }

    /// The all-empty status: nothing shown, neutral styling.
    pub fn clear() -> Self {
        Self::new("", "", "")
    }
}

/// Writes statuses to a JSON file that waybar polls.
#[derive(Debug, Clone)]
pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    /// A status file named `filename` under `$XDG_RUNTIME_DIR`.
    pub fn in_runtime_dir(filename: &str) -> StatusResult<Self> {
        let dir = std::env::var_os("XDG_RUNTIME_DIR").ok_or(StatusError::RuntimeDirUnset)?;
        Ok(Self::at(Path::new(&dir).join(filename)))
    }

    /// A status file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `status` and replace the file contents with it, newline
    /// terminated.
    pub fn write(&self, status: &Status) -> StatusResult<()> {
        let mut line = serde_json::to_string(status)?;
        line.push('\n');
        fs::write(&self.path, line).map_err(|source| StatusError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), class = %status.class, "status written");
        Ok(())
    }
}
