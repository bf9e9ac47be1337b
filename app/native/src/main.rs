#![allow(clippy::multiple_crate_versions)]

//! Backdrop - a wallpaper slideshow that pauses itself when the machine is busy.
//!
//! `backdrop run` plays the slideshow; the other subcommands inspect the
//! playlist, the host signals and the configuration schema.

fn main() {
    if let Err(err) = backdrop_lib::cli::run() {
        eprintln!("backdrop: {err}");
        std::process::exit(1);
    }
}
