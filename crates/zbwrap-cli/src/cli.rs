use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "zbwrap",
    version,
    about = "Stateful management layer for zbackup repositories",
    long_about = "zbwrap manages zbackup repository locations, automates artifact naming \
and keeps human-centric metadata next to every backup.",
    after_help = "\
Registry lookup order:
  1. --config <path>                      (explicit flag)
  2. $ZBWRAP_CONFIG                       (environment variable)
  3. Platform user config dir + /zbwrap/registry.yaml (e.g. ~/.config)"
)]
pub(crate) struct Cli {
    /// Path to the registry file (overrides ZBWRAP_CONFIG and the default)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Register a zbackup repository under an alias
    Add {
        /// Short name for the repository
        alias: String,
        /// Filesystem path of the repository
        path: String,
    },

    /// List managed repositories
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Back up standard input into a repository
    Backup {
        /// Repository alias
        alias: String,

        /// Suffix for the backup filename
        #[arg(short, long, default_value = "manual")]
        suffix: String,

        /// Optional description stored with the backup
        #[arg(short = 'm', long, default_value = "")]
        description: String,
    },

    /// Show repository details and backup history
    Info {
        /// Repository alias
        alias: String,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Create missing metadata sidecars
    Sync {
        /// Repository alias
        alias: String,

        /// Detect MIME types of unclassified backups by partially restoring them
        #[arg(long)]
        deep: bool,
    },
}

impl Commands {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::List { .. } => "list",
            Commands::Backup { .. } => "backup",
            Commands::Info { .. } => "info",
            Commands::Sync { .. } => "sync",
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn backup_defaults_suffix_and_description() {
        let cli = Cli::parse_from(["zbwrap", "backup", "home"]);
        let Commands::Backup {
            alias,
            suffix,
            description,
        } = cli.command
        else {
            panic!("expected backup");
        };
        assert_eq!(alias, "home");
        assert_eq!(suffix, "manual");
        assert_eq!(description, "");
    }

    #[test]
    fn global_flags_and_sync_deep() {
        let cli = Cli::parse_from(["zbwrap", "-vv", "-c", "/tmp/r.yaml", "sync", "home", "--deep"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("/tmp/r.yaml"));
        assert!(matches!(cli.command, Commands::Sync { deep: true, .. }));
        assert_eq!(cli.command.name(), "sync");
    }
}
