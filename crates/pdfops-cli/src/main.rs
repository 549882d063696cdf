mod cli;
mod ops_cmd;
mod page_range;
mod shared;
mod transparency_cmd;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version render through the error path too.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Ops { ref args } => ops_cmd::run(args),
        Commands::Transparency { ref args } => transparency_cmd::run(args),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("Warning: invalid --log-level '{directive}': {e}");
            EnvFilter::new("warn")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
