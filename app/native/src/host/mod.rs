//! Host implementations of the core ports.

pub mod catalog;
pub mod renderer;
pub mod signals;

pub use catalog::DirectoryCatalog;
pub use renderer::{LoggingRenderer, WallpaperRenderer};
pub use signals::HostSignals;
