use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::engine::Engine;
use crate::error::{Result, ZbError};
use crate::platform::process::describe_status;
use crate::sidecar::{create_sidecar, sidecar_path, Sidecar, STATUS_SUCCESS};
use crate::sniff::sniff;

/// Subdirectory of a repository holding artifacts and their sidecars.
pub const BACKUPS_DIR: &str = "backups";

/// Extension of artifacts written by zbackup.
pub const ARTIFACT_EXTENSION: &str = "zbk";

/// Timestamp layout embedded in artifact filenames (minute resolution).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M";

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub artifact_path: PathBuf,
    pub sidecar_path: PathBuf,
    pub mime_type: String,
}

/// `<YYYY-MM-DD_HHMM>-<suffix>.zbk`
pub fn artifact_filename(now: DateTime<Local>, suffix: &str) -> String {
    format!(
        "{}-{suffix}.{ARTIFACT_EXTENSION}",
        now.format(TIMESTAMP_FORMAT)
    )
}

fn validate_suffix(suffix: &str) -> Result<()> {
    let bad = suffix.is_empty()
        || suffix == "."
        || suffix == ".."
        || suffix.contains('/')
        || suffix.contains(std::path::MAIN_SEPARATOR);
    if bad {
        return Err(ZbError::InvalidSuffix(suffix.to_string()));
    }
    Ok(())
}

/// Streams input into zbackup and keeps the artifact's sidecar consistent
/// with the outcome.
#[derive(Debug, Clone)]
pub struct BackupRunner {
    engine: Engine,
    classifier: Classifier,
}

impl BackupRunner {
    pub fn new(engine: Engine, classifier: Classifier) -> Self {
        Self { engine, classifier }
    }

    /// Back up `reader` into `<repo_path>/backups` using the current time.
    pub fn backup<R: Read>(
        &self,
        repo_path: &Path,
        suffix: &str,
        description: &str,
        reader: R,
    ) -> Result<IngestReport> {
        self.backup_at(Local::now(), repo_path, suffix, description, reader)
    }

    /// Same as [`BackupRunner::backup`] with an explicit timestamp.
    ///
    /// An existing artifact of the same name is refused before anything is
    /// written. The sidecar is created before zbackup runs and removed again
    /// if zbackup cannot be started, exits non-zero, or does not accept the
    /// whole stream. The artifact itself is never touched here.
    pub fn backup_at<R: Read>(
        &self,
        now: DateTime<Local>,
        repo_path: &Path,
        suffix: &str,
        description: &str,
        reader: R,
    ) -> Result<IngestReport> {
        validate_suffix(suffix)?;

        let filename = artifact_filename(now, suffix);
        let backups_dir = repo_path.join(BACKUPS_DIR);
        std::fs::create_dir_all(&backups_dir).map_err(|source| ZbError::CreateDir {
            path: backups_dir.clone(),
            source,
        })?;
        let artifact_path = backups_dir.join(&filename);
        let meta_path = sidecar_path(&artifact_path);
        if artifact_path.symlink_metadata().is_ok() {
            return Err(ZbError::ArtifactExists(artifact_path));
        }

        let sniffed = sniff(reader).map_err(ZbError::Sniff)?;
        let mime_type = self.classifier.classify(sniffed.head());
        debug!(artifact = %filename, mime = %mime_type, "classified input");

        let meta = Sidecar {
            mime_type: mime_type.clone(),
            description: description.to_string(),
            status: Some(STATUS_SUCCESS.to_string()),
        };
        create_sidecar(&meta_path, &meta).map_err(|source| ZbError::SidecarWrite {
            artifact: filename.clone(),
            source,
        })?;

        info!(artifact = %artifact_path.display(), "running zbackup");
        if let Err(reason) = self.run_engine(&artifact_path, sniffed.into_stream()) {
            remove_sidecar(&meta_path);
            return Err(ZbError::Engine {
                artifact: filename,
                reason,
            });
        }

        info!(artifact = %filename, mime = %mime_type, "backup committed");
        Ok(IngestReport {
            artifact_path,
            sidecar_path: meta_path,
            mime_type,
        })
    }

    /// Run `zbackup backup`, feeding it `input` in full. zbackup's stderr goes
    /// straight to ours.
    fn run_engine<R: Read>(&self, artifact: &Path, mut input: R) -> std::result::Result<(), String> {
        let mut child = self
            .engine
            .backup_command(artifact)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                format!(
                    "cannot start '{}': {e}",
                    self.engine.program().display()
                )
            })?;

        let copied = match child.stdin.take() {
            Some(mut stdin) => io::copy(&mut input, &mut stdin),
            None => Err(io::Error::other("stdin not captured")),
        };

        let status = child
            .wait()
            .map_err(|e| format!("cannot wait for zbackup: {e}"))?;
        if !status.success() {
            return Err(describe_status(status));
        }
        match copied {
            Ok(bytes) => {
                debug!(bytes, "input stream delivered");
                Ok(())
            }
            Err(e) => Err(format!("input stream not fully delivered: {e}")),
        }
    }
}

fn remove_sidecar(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "cannot remove sidecar after failure: {e}"),
    }
}
