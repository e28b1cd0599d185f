//! oauth1 CLI - OAuth 1.0a tokens and request signing.
//!
//! Provides commands for:
//! - `generate-tokens`: Run the three-legged flow and print an access token
//! - `sign`: Print the signature base string and signed request

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GenerateTokensArgs, SignArgs};
use output::Output;

/// oauth1 - OAuth 1.0a consumer tool.
#[derive(Parser)]
#[command(name = "oauth1", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover oauth1.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at info level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain an access token through the user authorization flow.
    GenerateTokens(GenerateTokensArgs),
    /// Sign a request and print it without sending.
    Sign(SignArgs),
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::GenerateTokens(args) => args.execute(config),
        Commands::Sign(args) => args.execute(config),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
