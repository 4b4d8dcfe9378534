use std::path::Path;

use zbwrap_core::config::Registry;
use zbwrap_core::ingest::BackupRunner;

pub(crate) fn run_backup(
    registry: &Registry,
    alias: &str,
    suffix: &str,
    description: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo_path = registry.require(alias)?;
    let runner = BackupRunner::new(registry.engine(), registry.classifier());

    eprintln!("Starting backup for alias: {alias} ({repo_path})");
    let stdin = std::io::stdin().lock();
    let report = runner.backup(Path::new(repo_path), suffix, description, stdin)?;

    println!("Backup created: {}", report.artifact_path.display());
    println!("MIME type: {}", report.mime_type);
    Ok(())
}
