use colored::*;
use tracing_subscriber::EnvFilter;

mod config;
mod constants;
mod error;
mod http;
mod input;
mod output;
mod processor;
mod prompt;
mod types;
mod utils;

use types::Cli;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr, WARN by default, respecting RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = processor::run(cli).await {
        eprintln!("{} {:#}", "[Error]".red(), e);
        std::process::exit(1);
    }
}
