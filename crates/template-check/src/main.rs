//! template-check: parses Vue-style templates and reports warnings.

mod cli;
mod config;
mod orchestrator;
mod output;
mod sfc;

use clap::Parser;
use cli::Args;
use miette::{IntoDiagnostic, Result};

fn main() -> Result<()> {
    let args = Args::parse();

    let summary = orchestrator::run(args).into_diagnostic()?;
    if summary.failed() {
        std::process::exit(1);
    }
    Ok(())
}
