use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZbError>;

#[derive(Debug, Error)]
pub enum ZbError {
    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input for MIME detection: {0}")]
    Sniff(#[source] std::io::Error),

    #[error("failed to write metadata for {artifact}: {source}")]
    SidecarWrite {
        artifact: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backup artifact already exists: {}", .0.display())]
    ArtifactExists(PathBuf),

    #[error("zbackup failed for {artifact}: {reason}")]
    Engine { artifact: String, reason: String },

    #[error("invalid backup suffix '{0}': must be non-empty and contain no path separators")]
    InvalidSuffix(String),

    #[error("failed to read backups directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to calculate disk usage of '{}': {source}", path.display())]
    DiskUsage {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("repository alias '{0}' not found")]
    AliasNotFound(String),

    #[error("alias '{0}' already exists")]
    AliasExists(String),
}
