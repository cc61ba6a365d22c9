//! rzk-docs CLI - diagrams and anchors for Literate Rzk documentation.
//!
//! Provides commands for:
//! - `check`: Check that the `rzk` executable can be launched
//! - `markdown`: Inject SVG diagrams into a `*.rzk.md` page
//! - `html`: Add definition anchors to a rendered page

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, HtmlArgs, MarkdownArgs};
use output::Output;

/// rzk-docs - Literate Rzk page processing for documentation builds.
#[derive(Parser)]
#[command(name = "rzk-docs", version, about)]
struct Cli {
    /// Enable verbose output (show per-page progress logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the rzk executable is available.
    Check(CheckArgs),
    /// Inject SVG diagrams into page Markdown.
    Markdown(MarkdownArgs),
    /// Add definition anchors to rendered page HTML.
    Html(HtmlArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => args.execute(),
        Commands::Markdown(args) => args.execute(),
        Commands::Html(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
