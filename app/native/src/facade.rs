//! The thin facade external callers drive.
//!
//! [`Backdrop`] wires a [`PlaybackController`] and a [`PerformanceGovernor`]
//! to their ports, runs the interval timer and the monitoring loop as tokio
//! tasks, and persists user-facing settings after every change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::SlideshowError;
use crate::events::{self, BackdropEvent};
use crate::governor::{PauseReason, PauseTarget, PerformanceGovernor, PerformanceSettings};
use crate::ports::{
    CatalogPort, RendererPort, SettingsStorePort, StoredSettings, SystemSignalPort, ValidationPort,
};
use crate::slideshow::{
    Collaborators, Filter, MediaEntry, PlaybackController, PlaybackMode, PlaybackSnapshot,
    RefreshOutcome, SlideshowOptions, TimerHandle, run_interval_timer,
};

/// Everything the core needs from the outside world.
pub struct Ports {
    pub catalog: Arc<dyn CatalogPort>,
    pub validator: Arc<dyn ValidationPort>,
    pub renderer: Arc<dyn RendererPort>,
    pub signals: Arc<dyn SystemSignalPort>,
    pub settings_store: Option<Arc<dyn SettingsStorePort>>,
}

/// Combined playback and governor status.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub playback: PlaybackSnapshot,
    pub pause_reason: PauseReason,
    pub user_paused: bool,
}

pub struct Backdrop {
    controller: Arc<PlaybackController>,
    governor: Arc<PerformanceGovernor>,
    events: broadcast::Sender<BackdropEvent>,
    settings_store: Option<Arc<dyn SettingsStorePort>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Backdrop {
    /// Builds the engine and starts its background tasks. Playback itself
    /// stays stopped until [`start`](Self::start).
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(ports: Ports, options: SlideshowOptions, performance: PerformanceSettings) -> Self {
        let events = events::channel();
        let (timer, timer_commands) = TimerHandle::channel();

        let controller = Arc::new(PlaybackController::new(
            Collaborators {
                catalog: ports.catalog,
                validator: ports.validator,
                renderer: ports.renderer,
            },
            options,
            timer,
            events.clone(),
        ));

        let governor = Arc::new(PerformanceGovernor::new(
            ports.signals,
            Arc::clone(&controller) as Arc<dyn PauseTarget>,
            performance,
            events.clone(),
        ));

        // The timer only holds a weak reference, so dropping the controller
        // drops the last timer handle and ends the task.
        let weak = Arc::downgrade(&controller);
        let timer_task = tokio::spawn(run_interval_timer(timer_commands, move || {
            if let Some(controller) = weak.upgrade() {
                controller.on_timer_fire();
            }
        }));
        let governor_task = tokio::spawn(Arc::clone(&governor).run());

        Self {
            controller,
            governor,
            events,
            settings_store: ports.settings_store,
            tasks: vec![timer_task, governor_task],
        }
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when nothing can be shown.
    pub fn start(&self) -> Result<(), SlideshowError> { self.controller.start() }

    pub fn stop(&self) { self.controller.stop(); }

    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when nothing can be shown.
    pub fn next(&self) -> Result<(), SlideshowError> { self.controller.next() }

    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when nothing can be shown.
    pub fn previous(&self) -> Result<(), SlideshowError> { self.controller.previous() }

    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when nothing can be shown.
    pub fn jump_to_index(&self, index: usize) -> Result<(), SlideshowError> {
        self.controller.jump_to_index(index)
    }

    /// # Errors
    ///
    /// Returns [`SlideshowError::UnknownEntry`] when no entry has this id.
    pub fn jump_to_id(&self, id: &str) -> Result<(), SlideshowError> {
        self.controller.jump_to_id(id)
    }

    /// Re-reads the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::CatalogUnavailable`] when the catalog cannot
    /// be read.
    pub fn refresh(&self) -> Result<RefreshOutcome, SlideshowError> { self.controller.refresh() }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn set_mode(&self, mode: PlaybackMode) {
        self.controller.set_mode(mode);
        self.persist();
    }

    /// # Errors
    ///
    /// Returns the refresh error. The filter is stored and persisted anyway.
    pub fn set_filter(&self, filter: Filter) -> Result<RefreshOutcome, SlideshowError> {
        let result = self.controller.set_filter(filter);
        self.persist();
        result
    }

    /// Returns the interval actually applied.
    pub fn set_interval(&self, minutes: f64) -> Duration {
        let interval = self.controller.set_interval(minutes);
        self.persist();
        interval
    }

    pub fn set_user_pause(&self, paused: bool) -> PauseReason {
        self.governor.set_user_pause(paused)
    }

    pub fn update_settings(&self, settings: PerformanceSettings) -> PauseReason {
        let reason = self.governor.update_settings(settings);
        self.persist();
        reason
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            playback: self.controller.snapshot(),
            pause_reason: self.governor.current_reason(),
            user_paused: self.governor.is_user_paused(),
        }
    }

    #[must_use]
    pub fn playlist(&self) -> Vec<MediaEntry> { self.controller.playlist() }

    /// Subscribes to notifications raised from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BackdropEvent> { self.events.subscribe() }

    /// Current settings in their persisted shape.
    #[must_use]
    pub fn stored_settings(&self) -> StoredSettings {
        let playback = self.controller.snapshot();
        StoredSettings {
            interval_minutes: playback.interval.as_secs_f64() / 60.0,
            mode: playback.mode,
            filter: self.controller.filter(),
            performance: self.governor.settings(),
        }
    }

    /// Stops playback and waits for the monitoring loop to exit.
    pub async fn shutdown(mut self) {
        self.controller.stop();
        self.governor.shutdown();

        for task in self.tasks.drain(..) {
            task.abort();
            if let Err(err) = task.await
                && !err.is_cancelled()
            {
                tracing::error!(error = %err, "background task failed");
            }
        }
        tracing::debug!("backdrop shut down");
    }

    fn persist(&self) {
        let Some(store) = &self.settings_store else { return };

        if let Err(err) = store.save(&self.stored_settings()) {
            tracing::warn!(error = %err, "failed to persist settings");
        }
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
