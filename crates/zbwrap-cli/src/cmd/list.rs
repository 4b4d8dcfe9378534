use comfy_table::Cell;

use zbwrap_core::config::Registry;

use crate::table::CliTableTheme;

pub(crate) fn run_list(registry: &Registry, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let repos = registry.list();

    if json {
        println!("{}", serde_json::to_string_pretty(repos)?);
        return Ok(());
    }

    if repos.is_empty() {
        println!("No repositories registered.");
        return Ok(());
    }

    let theme = CliTableTheme::detect();
    let mut table = theme.new_data_table(&["Alias", "Path"]);
    for (alias, path) in repos {
        table.add_row(vec![Cell::new(alias), Cell::new(path)]);
    }
    println!("{table}");
    Ok(())
}
