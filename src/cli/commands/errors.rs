//! `arex errors` command - Render a validation error list

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::read_input;
use crate::schema::{parse_errors, render_errors};

#[derive(clap::Args, Debug)]
pub struct ErrorsArgs {
    /// JSON file holding the error list, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Color the output
    #[arg(long)]
    pub color: bool,
}

pub fn run(args: ErrorsArgs) -> Result<()> {
    let content = read_input(&args.input)?;
    let errors = parse_errors(&content)
        .map_err(|e| miette::miette!("Invalid error list: {}", e))?;

    // An empty list renders nothing at all
    if let Some(panel) = render_errors(Some(errors.as_slice())) {
        if args.color {
            println!("{}", panel.styled());
        } else {
            println!("{}", panel);
        }
    }
    Ok(())
}
