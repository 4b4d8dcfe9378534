use std::path::Path;

use zbwrap_core::config::Registry;

pub(crate) fn run_add(
    registry: &mut Registry,
    registry_path: &Path,
    alias: &str,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    registry.add(alias, path)?;
    registry.save(registry_path)?;
    let stored = registry.get(alias).unwrap_or(path);
    println!("Repository '{alias}' added successfully pointing to {stored}");
    Ok(())
}
