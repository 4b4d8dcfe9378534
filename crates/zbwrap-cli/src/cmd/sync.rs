use std::path::Path;

use zbwrap_core::config::Registry;
use zbwrap_core::reconcile::{self, SyncOptions};

pub(crate) fn run_sync(
    registry: &Registry,
    alias: &str,
    deep: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo_path = registry.require(alias)?;
    let engine = registry.engine();
    let classifier = registry.classifier();

    let report = reconcile::sync(
        Path::new(repo_path),
        &SyncOptions {
            deep,
            engine: &engine,
            classifier: &classifier,
        },
    )?;

    println!(
        "Synchronization complete for repository '{alias}': {} backups, {} sidecars created, {} classified.",
        report.scanned, report.created, report.upgraded
    );
    Ok(())
}
