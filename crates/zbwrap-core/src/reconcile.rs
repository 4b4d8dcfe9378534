use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::engine::Engine;
use crate::error::{Result, ZbError};
use crate::ingest::{ARTIFACT_EXTENSION, BACKUPS_DIR, TIMESTAMP_FORMAT};
use crate::sidecar::{read_sidecar, sidecar_path, write_sidecar, Sidecar, MIME_UNKNOWN};

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}_\d{4})").expect("timestamp pattern is valid")
});

/// One artifact as seen by a directory scan.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRef {
    pub filename: String,
    pub date: DateTime<Local>,
    pub mime_type: String,
    pub description: String,
    pub has_metadata: bool,
}

/// Everything `info` reports about a repository.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    #[serde(rename = "repository_alias")]
    pub alias: String,
    pub physical_path: String,
    pub total_size_bytes: u64,
    /// Most recent first.
    pub backups: Vec<ArtifactRef>,
}

/// An artifact file found in the backups directory.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub filename: String,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl Candidate {
    pub fn sidecar_path(&self) -> PathBuf {
        sidecar_path(&self.path)
    }

    /// Timestamp from the filename, else the file's modification time.
    pub fn timestamp(&self) -> DateTime<Local> {
        timestamp_from_name(&self.filename)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .unwrap_or_else(|| DateTime::from(self.modified.unwrap_or(UNIX_EPOCH)))
    }
}

/// Extract the `YYYY-MM-DD_HHMM` fragment from an artifact name.
///
/// Returns `None` when the fragment is missing or does not form a valid date.
pub fn timestamp_from_name(name: &str) -> Option<NaiveDateTime> {
    let fragment = TIMESTAMP_RE.captures(name)?.get(1)?.as_str();
    NaiveDateTime::parse_from_str(fragment, TIMESTAMP_FORMAT).ok()
}

/// List `*.zbk` files in `backups_dir`, sorted by filename.
///
/// A missing directory yields an empty list.
pub fn enumerate_artifacts(backups_dir: &Path) -> Result<Vec<Candidate>> {
    let entries = match std::fs::read_dir(backups_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ZbError::ReadDir {
                path: backups_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ZbError::ReadDir {
            path: backups_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
            continue;
        }
        // Entries that vanish or cannot be stat'ed are skipped.
        let Ok(meta) = std::fs::metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            continue;
        }
        candidates.push(Candidate {
            filename: entry.file_name().to_string_lossy().into_owned(),
            path,
            modified: meta.modified().ok(),
        });
    }
    candidates.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(candidates)
}

/// Total size of all non-directory entries under `path`.
pub fn disk_usage(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|source| ZbError::DiskUsage {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        let meta = entry.metadata().map_err(|source| ZbError::DiskUsage {
            path: path.to_path_buf(),
            source,
        })?;
        total = total.saturating_add(meta.len());
    }
    Ok(total)
}

/// Build the inventory for a repository without modifying anything.
pub fn scan(alias: &str, repo_path: &Path) -> Result<Inventory> {
    let total_size_bytes = disk_usage(repo_path)?;
    let candidates = enumerate_artifacts(&repo_path.join(BACKUPS_DIR))?;

    let mut backups: Vec<ArtifactRef> = candidates
        .iter()
        .map(|c| {
            let meta = read_sidecar(&c.sidecar_path());
            ArtifactRef {
                filename: c.filename.clone(),
                date: c.timestamp(),
                has_metadata: meta.is_some(),
                mime_type: meta
                    .as_ref()
                    .map_or_else(|| MIME_UNKNOWN.to_string(), |m| m.mime_type.clone()),
                description: meta.map(|m| m.description).unwrap_or_default(),
            }
        })
        .collect();
    backups.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Inventory {
        alias: alias.to_string(),
        physical_path: repo_path.to_string_lossy().into_owned(),
        total_size_bytes,
        backups,
    })
}

/// Settings for [`sync`].
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions<'a> {
    /// Reclassify `unknown` sidecars from a partial restore.
    pub deep: bool,
    pub engine: &'a Engine,
    pub classifier: &'a Classifier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub scanned: usize,
    pub created: usize,
    pub upgraded: usize,
}

/// Create missing sidecars and, in deep mode, classify `unknown` ones.
///
/// Stops at the first sidecar that cannot be written.
pub fn sync(repo_path: &Path, opts: &SyncOptions<'_>) -> Result<SyncReport> {
    let candidates = enumerate_artifacts(&repo_path.join(BACKUPS_DIR))?;
    let mut report = SyncReport {
        scanned: candidates.len(),
        ..SyncReport::default()
    };

    for candidate in &candidates {
        let meta_path = candidate.sidecar_path();
        let mut meta = match read_sidecar(&meta_path) {
            Some(meta) => meta,
            None => {
                let meta = Sidecar::skeleton();
                save(candidate, &meta_path, &meta)?;
                debug!(artifact = %candidate.filename, "created skeleton sidecar");
                report.created += 1;
                meta
            }
        };

        if opts.deep && meta.is_unclassified() {
            let restore = opts.engine.restore_command(&candidate.path);
            let mime = opts.classifier.classify_partial_restore(restore);
            if mime != MIME_UNKNOWN {
                debug!(artifact = %candidate.filename, mime = %mime, "classified from restore");
                meta.mime_type = mime;
                save(candidate, &meta_path, &meta)?;
                report.upgraded += 1;
            }
        }
    }

    info!(
        scanned = report.scanned,
        created = report.created,
        upgraded = report.upgraded,
        "sync finished"
    );
    Ok(report)
}

fn save(candidate: &Candidate, meta_path: &Path, meta: &Sidecar) -> Result<()> {
    write_sidecar(meta_path, meta).map_err(|source| ZbError::SidecarWrite {
        artifact: candidate.filename.clone(),
        source,
    })
}
