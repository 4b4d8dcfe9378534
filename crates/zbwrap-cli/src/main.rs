mod cli;
mod cmd;
mod format;
mod table;

use clap::Parser;

use zbwrap_core::config::{self, Registry};

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = match config::resolve_registry_path(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Using registry: {source}");

    let mut registry = match Registry::load(source.path()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading registry: {e}");
            std::process::exit(1);
        }
    };

    tracing::debug!(command = cli.command.name(), "dispatching");
    let result = match &cli.command {
        Commands::Add { alias, path } => {
            cmd::add::run_add(&mut registry, source.path(), alias, path)
        }
        Commands::List { json } => cmd::list::run_list(&registry, *json),
        Commands::Backup {
            alias,
            suffix,
            description,
        } => cmd::backup::run_backup(&registry, alias, suffix, description),
        Commands::Info { alias, json } => cmd::info::run_info(&registry, alias, *json),
        Commands::Sync { alias, deep } => cmd::sync::run_sync(&registry, alias, *deep),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
