//! `arex config` command - Configuration management
//!
//! Shows effective values and where they come from.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::{Context, GlobalOpts};
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only project-level config
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only project config path
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("endpoint", "Server endpoint (AREX_ENDPOINT)"),
    ("database", "Database the datasets are written to (AREX_DATABASE)"),
    ("username", "User for authentication and permission checks (AREX_USERNAME)"),
    ("password", "Password for basic authentication (AREX_PASSWORD)"),
    ("token", "JWT sent instead of the password (AREX_TOKEN)"),
    (
        "authentication",
        "Whether the server enforces authentication (AREX_AUTHENTICATION)",
    ),
    ("store", "Backend for datasets: arango or sqlite (AREX_STORE)"),
    ("store_path", "SQLite file for the sqlite backend (AREX_STORE_PATH)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path(args) => run_path(args),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::new(global);
    let config = &ctx.config;

    if let Some(key) = &args.key {
        if !VALID_KEYS.iter().any(|(k, _)| *k == key.as_str()) {
            return Err(miette::miette!(
                help = "Run 'arex config keys' to list valid keys",
                "Unknown configuration key '{}'",
                key
            ));
        }
        match effective_value(config, key) {
            Some(v) => println!("{}", v),
            None => return Err(miette::miette!("Key '{}' is not set", key)),
        }
        return Ok(());
    }

    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        show_file("Project config:", get_project_config_path()?)?;
    } else if args.global_only {
        show_file("Global config:", get_global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in VALID_KEYS {
            print_config_value(key, effective_value(config, key).as_deref());
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Command line flags (--endpoint, --database, ...)");
        println!("  2. Environment variables (AREX_*)");
        println!("  3. Project config (.arex/config.yaml)");
        println!("  4. Global config (~/.config/arex/config.yaml)");
    }

    Ok(())
}

fn run_path(args: PathArgs) -> Result<()> {
    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        println!("{}", get_project_config_path()?.display());
    } else if args.global_only {
        println!("{}", get_global_config_path()?.display());
    } else {
        let global_path = get_global_config_path()?;

        println!("{}", style("Configuration file paths:").bold());
        println!();
        println!("  {} {}", style("Global:").cyan(), global_path.display());
        println!("          {}", existence(&global_path));

        println!();
        match get_project_config_path() {
            Ok(path) => {
                println!("  {} {}", style("Project:").cyan(), path.display());
                println!("          {}", existence(&path));
            }
            Err(_) => println!(
                "  {} {}",
                style("Project:").cyan(),
                style("(not in an arex project)").dim()
            ),
        }
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), style(description).dim());
    }

    Ok(())
}

// Helper functions

/// Value in use for a key, including built-in defaults
fn effective_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "endpoint" => Some(config.endpoint().to_string()),
        "database" => Some(config.database().to_string()),
        "username" => Some(config.username().to_string()),
        "authentication" => Some(config.authentication_enabled().to_string()),
        "store" => Some(config.store().to_string()),
        "store_path" => Some(config.store_path().display().to_string()),
        other => config.value(other),
    }
}

fn existence(path: &std::path::Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn get_project_config_path() -> Result<PathBuf> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    Ok(project.config_path())
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

fn show_file(title: &str, path: PathBuf) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(&path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_value_uses_defaults() {
        let config = Config::default();
        assert_eq!(
            effective_value(&config, "endpoint").as_deref(),
            Some("http://localhost:8529")
        );
        assert_eq!(effective_value(&config, "database").as_deref(), Some("_system"));
        assert_eq!(effective_value(&config, "store").as_deref(), Some("arango"));
        assert_eq!(effective_value(&config, "password"), None);
    }

    #[test]
    fn test_effective_value_masks_secrets() {
        let config = Config {
            token: Some("secret-jwt".into()),
            ..Config::default()
        };
        assert_eq!(effective_value(&config, "token").as_deref(), Some("********"));
    }

    #[test]
    fn test_every_key_is_known_to_config() {
        let config = Config {
            password: Some("p".into()),
            token: Some("t".into()),
            ..Config::default()
        };
        for (key, _) in VALID_KEYS {
            assert!(effective_value(&config, key).is_some(), "{key}");
        }
    }
}
