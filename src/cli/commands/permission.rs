//! `arex permission` command - Show the user's access level

use console::style;
use miette::Result;

use crate::cli::{Context, GlobalOpts};
use crate::core::user_is_admin;

#[derive(clap::Args, Debug)]
pub struct PermissionArgs {
    /// Print only the role ("rw", "ro" or "none")
    #[arg(long)]
    pub role_only: bool,
}

pub fn run(args: PermissionArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::new(global);
    let permission = ctx.permission()?;

    if args.role_only {
        println!("{}", permission);
        return Ok(());
    }

    let admin = user_is_admin(permission, ctx.config.authentication_enabled());
    println!(
        "{} {}",
        style("user:").dim(),
        style(ctx.config.username()).cyan()
    );
    println!(
        "{} {}",
        style("database:").dim(),
        style(ctx.config.database()).cyan()
    );
    println!("{} {}", style("permission:").dim(), style(permission).yellow());
    println!("{} {}", style("admin:").dim(), admin);
    if !ctx.config.authentication_enabled() && !ctx.quiet {
        println!(
            "{}",
            style("(authentication disabled: every user is an administrator)").dim()
        );
    }
    Ok(())
}
