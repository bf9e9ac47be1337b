//! CLI module for Backdrop.
//!
//! Parses the command line, sets up logging and runs the selected command.

mod commands;
mod output;

use clap::Parser;
pub use commands::{Cli, Commands, FilterArgs, ListArgs, RunArgs, SignalsArgs};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::constants::APP_NAME;
use crate::error::BackdropError;

/// Log target prefix of this crate's modules.
const LOG_TARGET: &str = "backdrop_lib";

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), BackdropError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute()
}

/// Logs to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{APP_NAME}={level},{LOG_TARGET}={level}")));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(err) = result {
        eprintln!("{APP_NAME}: failed to initialize logging: {err}");
    }
}
