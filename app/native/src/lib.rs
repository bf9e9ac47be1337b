//! Backdrop - an adaptive wallpaper slideshow.
//!
//! The library holds the playback engine ([`slideshow`]), the pause governor
//! ([`governor`]), the ports both consume ([`ports`]) and host implementations
//! of them ([`host`]). [`facade::Backdrop`] ties everything together for the
//! CLI and for embedders.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod facade;
pub mod governor;
pub mod host;
pub mod platform;
pub mod ports;
pub mod schema;
pub mod slideshow;

pub use facade::{Backdrop, Ports, Status};
