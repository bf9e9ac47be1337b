//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! submodules:
//!
//! - `list` - Playlist inspection
//! - `run` - The slideshow itself
//! - `signals` - Host signal inspection
//! - `types` - Shared types used across commands

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::BackdropError;
use crate::{config, schema};

pub mod list;
pub mod run;
pub mod signals;
pub mod types;

pub use list::ListArgs;
pub use run::RunArgs;
pub use signals::SignalsArgs;
pub use types::FilterArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backdrop - a wallpaper slideshow that pauses itself when the machine is busy.
#[derive(Parser, Debug)]
#[command(name = "backdrop")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Log debug output. `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the slideshow until interrupted.
    ///
    /// Rotates through the media directory, pausing while the system is
    /// locked, on battery, busy or showing a full-screen app, depending on
    /// the performance settings. Commands such as `next`, `pause` or
    /// `mode random` can be typed while it runs.
    Run(RunArgs),

    /// List the playlist the current settings produce.
    List(ListArgs),

    /// Sample the host signals once and show the resolved pause reason.
    Signals(SignalsArgs),

    /// Output Backdrop configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Backdrop configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(backdrop completions --shell zsh)"
    ///   backdrop completions --shell bash > ~/.local/share/bash-completion/completions/backdrop
    ///   backdrop completions --shell fish > ~/.config/fish/completions/backdrop.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), BackdropError> {
        let custom = self.config_path();
        if let Some(path) = &custom
            && !path.exists()
        {
            return Err(BackdropError::InvalidArguments(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        match &self.command {
            Commands::Run(args) => run::execute(args, &config::load(custom.as_deref())?),
            Commands::List(args) => list::execute(args, &config::load(custom.as_deref())?),
            Commands::Signals(args) => signals::execute(args, &config::load(custom.as_deref())?),

            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "backdrop", &mut io::stdout());
    }
}
