//! `arex validate` command - Validate JSON documents against a schema

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::helpers::plural;
use crate::cli::GlobalOpts;
use crate::schema::{render_errors, SchemaError, SchemaValidator};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// JSON schema file
    #[arg(long, short = 's')]
    pub schema: PathBuf,

    /// Files or directories to validate (directories are searched for *.json)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the error records as JSON instead of rendered lines
    #[arg(long)]
    pub json: bool,

    /// Show summary only, don't show individual errors
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let validator = SchemaValidator::from_file(&args.schema)?;
    let files = expand_paths(&args.paths);
    if files.is_empty() {
        return Err(miette::miette!("No JSON files found to validate"));
    }

    let mut stats = ValidationStats::default();
    let mut reports = Vec::new();

    for path in &files {
        stats.files_checked += 1;

        let errors = match validator.validate_file(path) {
            Ok(errors) => errors,
            Err(e @ (SchemaError::Parse { .. } | SchemaError::Read { .. })) => {
                stats.files_failed += 1;
                stats.total_errors += 1;
                if !args.summary && !args.json {
                    println!("{} {}", style("✗").red(), path.display());
                    println!("{:?}", miette::Report::new(e));
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if errors.is_empty() {
            stats.files_passed += 1;
            if !args.summary && !args.json && !global.quiet {
                println!("{} {}", style("✓").green(), path.display());
            }
        } else {
            stats.files_failed += 1;
            stats.total_errors += errors.len();
            if args.json {
                reports.push(serde_json::json!({
                    "file": path.display().to_string(),
                    "errors": errors,
                }));
            } else if !args.summary {
                println!(
                    "{} {} - {}",
                    style("✗").red(),
                    path.display(),
                    plural(errors.len(), "error")
                );
                if let Some(panel) = render_errors(Some(errors.as_slice())) {
                    for line in panel.lines() {
                        println!("    {}", style(line).red());
                    }
                }
            }
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&reports)
            .map_err(|e| miette::miette!("Cannot serialize report: {}", e))?;
        println!("{}", out);
    } else if !global.quiet {
        print_summary(&stats);
    }

    if stats.files_failed > 0 {
        Err(miette::miette!(
            "Validation failed: {} with errors",
            plural(stats.files_failed, "file")
        ))
    } else {
        if !args.json && !global.quiet {
            println!("{} All files passed validation!", style("✓").green().bold());
        }
        Ok(())
    }
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    println!();
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Expand paths - if a directory is given, find all .json files in it
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.') || e.depth() == 0)
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_json(e.path()))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            // Explicit files are kept so that a missing one is reported
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();
    files
}
