use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arex::cli::{Cli, Commands, GlobalOpts};

/// Log to stderr; `AREX_LOG` takes precedence over the verbosity flags
fn init_tracing(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env("AREX_LOG")
        .unwrap_or_else(|_| EnvFilter::new(global.log_level()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => arex::cli::commands::init::run(args),
        Commands::Datasets(cmd) => arex::cli::commands::datasets::run(cmd, &global),
        Commands::Validate(args) => arex::cli::commands::validate::run(args, &global),
        Commands::Errors(args) => arex::cli::commands::errors::run(args),
        Commands::Permission(args) => arex::cli::commands::permission::run(args, &global),
        Commands::Config(cmd) => arex::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => arex::cli::commands::completions::run(args),
    }
}
