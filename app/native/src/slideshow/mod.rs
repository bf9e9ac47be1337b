//! Adaptive slideshow playback engine.
//!
//! [`PlaylistStore`] filters the catalog, [`RandomSequencer`] orders Random
//! mode, and [`PlaybackController`] ties them to the interval timer.

pub mod controller;
mod history;
pub mod media;
pub mod playlist;
pub mod sequencer;
pub mod timer;

pub use controller::{
    Collaborators, PlaybackController, PlaybackMode, PlaybackSnapshot, PlaybackState,
    SlideshowOptions, interval_from_minutes,
};
pub use media::{Filter, MediaEntry, MediaType};
pub use playlist::{PlaylistStore, RefreshOutcome};
pub use sequencer::RandomSequencer;
pub use timer::{TimerCommand, TimerHandle, run_interval_timer};
