//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, datasets::DatasetsCommands,
    errors::ErrorsArgs, init::InitArgs, permission::PermissionArgs, validate::ValidateArgs,
};
use crate::core::{Config, StoreKind};

#[derive(Parser)]
#[command(name = "arex")]
#[command(author, version, about = "ArangoDB example datasets toolkit")]
#[command(
    long_about = "Create and remove the ArangoDB example datasets, check database permissions and render JSON schema validation errors."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Server endpoint (default: http://localhost:8529)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Database to operate on (default: _system)
    #[arg(long, short = 'd', global = true)]
    pub database: Option<String>,

    /// User for authentication and permission checks (default: root)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Backend for dataset operations
    #[arg(long, global = true, value_enum)]
    pub store: Option<StoreKind>,

    /// SQLite file used by the sqlite backend
    #[arg(long, global = true)]
    pub store_path: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Command line values as a config layer
    pub fn overrides(&self) -> Config {
        Config {
            endpoint: self.endpoint.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            store: self.store,
            store_path: self.store_path.clone(),
            ..Config::default()
        }
    }

    /// Default tracing filter for these flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "arex=debug"
        } else if self.quiet {
            "arex=error"
        } else {
            "arex=warn"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize an arex project in a directory
    Init(InitArgs),

    /// Create, remove and inspect example datasets
    #[command(subcommand)]
    Datasets(DatasetsCommands),

    /// Validate JSON documents against a JSON schema
    Validate(ValidateArgs),

    /// Render a list of validation errors
    Errors(ErrorsArgs),

    /// Show the current user's permission on the database
    Permission(PermissionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "arex",
            "datasets",
            "list",
            "--store",
            "sqlite",
            "--store-path",
            "/tmp/x.db",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.global.store, Some(StoreKind::Sqlite));
        assert_eq!(cli.global.store_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.global.log_level(), "arex=debug");
    }

    #[test]
    fn test_overrides_only_set_given_values() {
        let opts = GlobalOpts {
            database: Some("shop".into()),
            ..GlobalOpts::default()
        };
        let overrides = opts.overrides();
        assert_eq!(overrides.database.as_deref(), Some("shop"));
        assert!(overrides.endpoint.is_none());
        assert!(overrides.store.is_none());
    }
}
