use std::path::Path;

use comfy_table::Cell;

use zbwrap_core::config::Registry;
use zbwrap_core::reconcile::{self, Inventory};

use crate::format::format_bytes;
use crate::table::{add_kv_row, CliTableTheme};

pub(crate) fn run_info(
    registry: &Registry,
    alias: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo_path = registry.require(alias)?;
    let inventory = reconcile::scan(alias, Path::new(repo_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
    } else {
        print_inventory(&inventory);
    }
    Ok(())
}

fn print_inventory(inventory: &Inventory) {
    let theme = CliTableTheme::detect();

    let mut summary = theme.new_kv_table();
    add_kv_row(&mut summary, theme, "Repository", &inventory.alias);
    add_kv_row(&mut summary, theme, "Path", &inventory.physical_path);
    add_kv_row(
        &mut summary,
        theme,
        "Disk usage",
        format_bytes(inventory.total_size_bytes),
    );
    add_kv_row(&mut summary, theme, "Backups", inventory.backups.len());
    println!("{summary}");
    println!();

    if inventory.backups.is_empty() {
        println!("No backups found.");
        return;
    }

    let mut table = theme.new_data_table(&["Backup", "Date", "MIME type", "Description"]);
    for b in &inventory.backups {
        let description = if b.has_metadata {
            b.description.clone()
        } else {
            "(no metadata)".to_string()
        };
        table.add_row(vec![
            Cell::new(&b.filename),
            Cell::new(b.date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&b.mime_type),
            Cell::new(description),
        ]);
    }
    println!("{table}");
}
