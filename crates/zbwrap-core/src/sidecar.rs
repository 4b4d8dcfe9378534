use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Extension appended to an artifact filename to name its sidecar.
pub const SIDECAR_SUFFIX: &str = "meta";

/// Classification sentinel for artifacts that have not been inspected yet.
pub const MIME_UNKNOWN: &str = "unknown";

/// Status written by a successful ingestion.
pub const STATUS_SUCCESS: &str = "success";

/// Status written by reconciliation for artifacts found without metadata.
pub const STATUS_COMPLETE: &str = "complete";

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("cannot encode sidecar: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("cannot decode sidecar: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Metadata stored next to each artifact as `<artifact>.meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    pub mime_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Sidecar {
    /// Placeholder record for an artifact discovered without metadata.
    pub fn skeleton() -> Self {
        Self {
            mime_type: MIME_UNKNOWN.to_string(),
            description: String::new(),
            status: Some(STATUS_COMPLETE.to_string()),
        }
    }

    pub fn is_unclassified(&self) -> bool {
        self.mime_type == MIME_UNKNOWN
    }

    /// Pretty-printed JSON with a trailing newline, so sidecars diff cleanly.
    pub fn encode(&self) -> std::result::Result<String, SidecarError> {
        let mut out = serde_json::to_string_pretty(self).map_err(SidecarError::Encode)?;
        out.push('\n');
        Ok(out)
    }

    pub fn decode(text: &str) -> std::result::Result<Self, SidecarError> {
        serde_json::from_str(text).map_err(SidecarError::Decode)
    }
}

/// Path of the sidecar paired with `artifact`.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Load a sidecar. Missing, unreadable and malformed files all count as absent.
pub fn read_sidecar(path: &Path) -> Option<Sidecar> {
    let text = std::fs::read_to_string(path).ok()?;
    match Sidecar::decode(&text) {
        Ok(meta) => Some(meta),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed sidecar");
            None
        }
    }
}

fn encode_io(meta: &Sidecar) -> io::Result<String> {
    meta.encode()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_sidecar(path: &Path, meta: &Sidecar) -> io::Result<()> {
    std::fs::write(path, encode_io(meta)?)
}

/// Write a sidecar that must not exist yet.
///
/// Fails with `AlreadyExists` without touching an existing file. A file this
/// call created is removed again if the write fails.
pub fn create_sidecar(path: &Path, meta: &Sidecar) -> io::Result<()> {
    let text = encode_io(meta)?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = file.write_all(text.as_bytes()) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}
