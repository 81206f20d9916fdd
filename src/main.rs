//! Entry point for folio, a project manager for typesetting book publications.
//!
//! This binary parses CLI arguments via [`cli`] and dispatches to the
//! appropriate subcommand handler.

mod cli;
mod constants;
mod error;
mod project;
mod registry;
mod report;
mod scope;
mod settings;

use anyhow::Result;

/// Runs the folio CLI.
///
/// Parses command-line arguments into a [`cli::Cli`] struct and dispatches
/// the chosen subcommand via [`cli::run`]. Configuration errors surface here
/// and terminate the process with a diagnostic.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::parse();
    cli::run(cli).await
}
