//! `arex datasets` command - Create, remove and inspect example datasets

use clap::Subcommand;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{plural, truncate_str};
use crate::cli::{Context, GlobalOpts};
use crate::datasets;

#[derive(Subcommand, Debug)]
pub enum DatasetsCommands {
    /// List the available datasets
    List(ListArgs),

    /// Create one or more datasets
    Create(CreateArgs),

    /// Remove one or more datasets
    Remove(RemoveArgs),

    /// Show collections and document counts in the store
    Status,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print only dataset names, one per line
    #[arg(long)]
    pub names: bool,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Dataset names (see `arex datasets list`)
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Dataset names (see `arex datasets list`)
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: DatasetsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DatasetsCommands::List(args) => run_list(args),
        DatasetsCommands::Create(args) => run_create(args, &Context::new(global)),
        DatasetsCommands::Remove(args) => run_remove(args, &Context::new(global)),
        DatasetsCommands::Status => run_status(&Context::new(global)),
    }
}

fn run_list(args: ListArgs) -> Result<()> {
    if args.names {
        for name in datasets::names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Name", "Kind", "Collections", "Description"]);
    for dataset in datasets::catalog() {
        builder.push_record([
            dataset.name.to_string(),
            dataset.kind.to_string(),
            truncate_str(&dataset.collections.join(", "), 48),
            dataset.description.to_string(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!(
        "\n{} available",
        plural(datasets::catalog().len(), "dataset")
    );
    Ok(())
}

fn run_create(args: CreateArgs, ctx: &Context) -> Result<()> {
    // Resolve every name before touching the store
    let selected = args
        .names
        .iter()
        .map(|name| datasets::find(name))
        .collect::<Result<Vec<_>, _>>()?;

    ctx.require_admin()?;
    let store = ctx.open_store()?;

    for dataset in selected {
        datasets::create(dataset.name, store.as_ref())?;
        if !ctx.quiet {
            println!(
                "{} Created {} ({})",
                style("✓").green(),
                style(dataset.name).cyan(),
                dataset.collections.join(", ")
            );
        }
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let selected = args
        .names
        .iter()
        .map(|name| datasets::find(name))
        .collect::<Result<Vec<_>, _>>()?;

    ctx.require_admin()?;

    if !args.yes && Term::stderr().is_term() {
        let collections: Vec<&str> = selected
            .iter()
            .flat_map(|d| d.collections.iter().copied())
            .collect();
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Drop {} ({}) from {}?",
                plural(collections.len(), "collection"),
                collections.join(", "),
                ctx.config.database()
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let store = ctx.open_store()?;
    for dataset in selected {
        dataset.remove(store.as_ref());
        if !ctx.quiet {
            println!(
                "{} Removed {}",
                style("✓").green(),
                style(dataset.name).cyan()
            );
        }
    }
    Ok(())
}

fn run_status(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let mut collections = store
        .collections()
        .map_err(|e| miette::miette!("Cannot list collections: {}", e))?;
    collections.sort_by(|a, b| a.name.cmp(&b.name));

    if collections.is_empty() {
        println!("{}", style("No collections").dim());
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Collection", "Type", "Documents"]);
    for info in &collections {
        builder.push_record([info.name.clone(), info.kind.to_string(), info.count.to_string()]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    if !ctx.quiet {
        let present: Vec<&str> = datasets::catalog()
            .iter()
            .filter(|d| {
                d.collections
                    .iter()
                    .all(|c| collections.iter().any(|info| info.name == *c))
            })
            .map(|d| d.name)
            .collect();
        if !present.is_empty() {
            println!("\nDatasets present: {}", style(present.join(", ")).cyan());
        }
    }
    Ok(())
}
