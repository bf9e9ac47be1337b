//! Notifications raised by the slideshow and the pause governor.
//!
//! Every notification is a [`BackdropEvent`] delivered over a
//! [`tokio::sync::broadcast`] channel. Subscribers obtain a receiver from the
//! facade; a slow subscriber lags and skips events rather than blocking
//! playback.
//!
//! ## Naming Convention
//!
//! Each event also has a stable name following the pattern
//! `backdrop://<module>/<event-name>`, used in logs and JSON output.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::governor::PauseReason;

/// Slideshow playback events.
pub mod slideshow {
    /// Emitted after a new entry has been handed to the renderer.
    ///
    /// Payload: `{ path: String }`
    pub const WALLPAPER_CHANGED: &str = "backdrop://slideshow/wallpaper-changed";

    /// Emitted when playback starts or stops.
    ///
    /// Payload: `{ is_playing: bool }`
    pub const PLAYBACK_STATE_CHANGED: &str = "backdrop://slideshow/playback-state-changed";
}

/// Pause governor events.
pub mod governor {
    /// Emitted when the resolved pause reason changes.
    ///
    /// Payload: `{ reason: PauseReason }`
    pub const PAUSE_STATE_CHANGED: &str = "backdrop://governor/pause-state-changed";
}

/// A notification raised by the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum BackdropEvent {
    /// A new wallpaper was displayed.
    WallpaperChanged { path: PathBuf },
    /// Playback transitioned between stopped and playing.
    PlaybackStateChanged { is_playing: bool },
    /// The governor resolved a different pause reason.
    PauseStateChanged { reason: PauseReason },
}

impl BackdropEvent {
    /// Returns the stable event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WallpaperChanged { .. } => slideshow::WALLPAPER_CHANGED,
            Self::PlaybackStateChanged { .. } => slideshow::PLAYBACK_STATE_CHANGED,
            Self::PauseStateChanged { .. } => governor::PAUSE_STATE_CHANGED,
        }
    }
}

/// Creates the notification channel shared by the controller and governor.
#[must_use]
pub fn channel() -> broadcast::Sender<BackdropEvent> {
    let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    sender
}

/// Sends an event, ignoring the case where nobody is subscribed.
pub fn emit(sender: &broadcast::Sender<BackdropEvent>, event: BackdropEvent) {
    tracing::trace!(event = event.name(), "emitting event");
    // An error only means there are no receivers right now.
    let _ = sender.send(event);
}
