//! tasador CLI
//!
//! Argument-light training entry point: pulls the housing dataset from the
//! source configured in `DB_URI`, fits the estimator, and records the run.
//!
//! # Usage
//!
//! ```bash
//! DB_URI=./housing.db tasador
//! DB_URI=sqlite:///data/housing.db tasador --tracking-dir runs --cv 3
//! ```

use clap::Parser;
use std::process::ExitCode;
use tasador::cli::{run_command, Cli};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
