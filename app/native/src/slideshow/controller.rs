//! Playback state machine.
//!
//! Every mutation of the playlist, random queue, history and current index
//! happens behind one [`parking_lot::Mutex`]. Timer commands are sent while
//! the lock is held so their order always matches the state they belong to.
//! Rendering and notifications are collected as [`Effects`] and applied after
//! the lock is released. The `effects` lock is taken before the state lock is
//! let go, so effects reach the renderer and listeners in state order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::history::PlayHistory;
use super::media::{Filter, MediaEntry};
use super::playlist::{PlaylistStore, RefreshOutcome};
use super::sequencer::RandomSequencer;
use super::timer::TimerHandle;
use crate::constants::{DEFAULT_INTERVAL, DEFAULT_INTERVAL_MINUTES};
use crate::error::SlideshowError;
use crate::events::{self, BackdropEvent};
use crate::governor::PauseTarget;
use crate::ports::{CatalogPort, RendererPort, ValidationPort};

// ============================================================================
// Modes and State
// ============================================================================

/// How the next entry is chosen on each tick.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Playlist order, wrapping at the end.
    #[default]
    Sequential,
    /// Shuffled order without repeating until every entry was shown.
    Random,
    /// Keep showing the current entry.
    SingleRepeat,
}

impl PlaybackMode {
    pub const ALL: [Self; 3] = [Self::Sequential, Self::Random, Self::SingleRepeat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
            Self::SingleRepeat => "single-repeat",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim())).ok_or_else(
            || format!("Invalid playback mode '{s}'. Use sequential, random or single-repeat"),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Converts a user-supplied interval in minutes, falling back to the default
/// for zero, negative, non-finite or overflowing values.
#[must_use]
pub fn interval_from_minutes(minutes: f64) -> Duration {
    if !minutes.is_finite() || minutes <= 0.0 {
        return DEFAULT_INTERVAL;
    }

    Duration::try_from_secs_f64(minutes * 60.0).unwrap_or(DEFAULT_INTERVAL)
}

// ============================================================================
// Construction
// ============================================================================

/// Ports the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogPort>,
    pub validator: Arc<dyn ValidationPort>,
    pub renderer: Arc<dyn RendererPort>,
}

/// Initial playback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowOptions {
    pub mode: PlaybackMode,
    pub interval_minutes: f64,
    pub filter: Filter,
}

impl Default for SlideshowOptions {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::default(),
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            filter: Filter::default(),
        }
    }
}

/// Read-only view of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub mode: PlaybackMode,
    pub paused: bool,
    pub interval: Duration,
    /// `None` when the playlist is empty.
    pub index: Option<usize>,
    pub current: Option<MediaEntry>,
    pub playlist_len: usize,
    pub history_len: usize,
    pub queue_len: usize,
}

#[derive(Debug)]
struct Core {
    playlist: PlaylistStore,
    sequencer: RandomSequencer,
    history: PlayHistory,
    index: usize,
    state: PlaybackState,
    mode: PlaybackMode,
    interval: Duration,
    paused: bool,
}

impl Core {
    fn is_running(&self) -> bool { self.state == PlaybackState::Playing && !self.paused }

    fn current_id(&self) -> Option<String> {
        self.playlist.get(self.index).map(|entry| entry.id.clone())
    }

    /// Removes one entry and keeps every stored index pointing at the same
    /// entries as before.
    fn prune(&mut self, position: usize) {
        self.playlist.remove(position);
        self.history.forget(position);
        self.sequencer.forget(position);

        if self.index > position {
            self.index -= 1;
        }
        if self.index >= self.playlist.len() {
            self.index = 0;
        }
    }
}

/// Side effects collected under the lock and applied after it is released.
#[derive(Debug, Default)]
struct Effects {
    shown: Option<MediaEntry>,
    playing: Option<bool>,
}

// ============================================================================
// Controller
// ============================================================================

pub struct PlaybackController {
    core: Mutex<Core>,
    effects: Mutex<()>,
    collaborators: Collaborators,
    timer: TimerHandle,
    events: broadcast::Sender<BackdropEvent>,
}

impl PlaybackController {
    /// Creates a stopped controller with an empty playlist.
    ///
    /// The playlist is filled by the first [`refresh`](Self::refresh) or
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        options: SlideshowOptions,
        timer: TimerHandle,
        events: broadcast::Sender<BackdropEvent>,
    ) -> Self {
        let interval = interval_from_minutes(options.interval_minutes);
        timer.set_period(interval);

        Self {
            core: Mutex::new(Core {
                playlist: PlaylistStore::new(options.filter),
                sequencer: RandomSequencer::new(),
                history: PlayHistory::default(),
                index: 0,
                state: PlaybackState::Stopped,
                mode: options.mode,
                interval,
                paused: false,
            }),
            effects: Mutex::new(()),
            collaborators,
            timer,
            events,
        }
    }

    /// Replaces the random sequencer, e.g. with a seeded one.
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: RandomSequencer) -> Self {
        self.core.get_mut().sequencer = sequencer;
        self
    }

    /// Starts playback at the current entry.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when nothing matches the
    /// filter, or the catalog error when the playlist had to be loaded first.
    pub fn start(&self) -> Result<(), SlideshowError> {
        if self.core.lock().playlist.is_empty() {
            self.refresh()?;
        }

        let mut effects = Effects::default();
        let mut core = self.core.lock();
        if core.playlist.is_empty() {
            tracing::warn!("cannot start slideshow: playlist is empty");
            return Err(SlideshowError::EmptyPlaylist);
        }

        if core.state == PlaybackState::Stopped {
            core.state = PlaybackState::Playing;
            effects.playing = Some(true);
        }

        let index = core.index;
        let result = self.show(&mut core, index, &mut effects);
        if result.is_ok() {
            if core.is_running() {
                self.timer.arm();
            }
            tracing::info!("slideshow started");
        }

        self.release(core, effects);
        result
    }

    /// Stops playback. The playlist, history and index are kept.
    pub fn stop(&self) {
        let mut effects = Effects::default();
        let mut core = self.core.lock();
        Self::halt(&mut core, &self.timer, &mut effects);
        self.release(core, effects);
    }

    /// Handles one expiry of the interval timer.
    ///
    /// Ticks arriving while stopped or paused are dropped. The timer is
    /// re-armed only if playback is still running afterwards.
    pub fn on_timer_fire(&self) {
        let mut effects = Effects::default();
        let mut core = self.core.lock();
        if !core.is_running() {
            tracing::trace!(state = ?core.state, paused = core.paused, "tick ignored");
            return;
        }

        if let Err(err) = self.step(&mut core, &mut effects) {
            tracing::warn!(error = %err, "slideshow tick failed");
        }

        if core.is_running() {
            self.timer.arm();
        }
        self.release(core, effects);
    }

    /// Advances as a tick would and restarts the interval.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when there is nothing to show.
    pub fn next(&self) -> Result<(), SlideshowError> {
        self.navigate(|controller, core, effects| controller.step(core, effects))
    }

    /// Goes back to the most recently shown entry.
    ///
    /// Without history, Random mode picks a fresh random entry and the other
    /// modes step backwards in playlist order.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when there is nothing to show.
    pub fn previous(&self) -> Result<(), SlideshowError> {
        self.navigate(|controller, core, effects| {
            let len = core.playlist.len();
            let current = core.index;

            let target = match core.history.pop() {
                Some(index) => index,
                None if core.mode == PlaybackMode::Random => {
                    core.sequencer.random_index(len, Some(current)).unwrap_or(0)
                }
                None => (current + len - 1) % len,
            };
            controller.show(core, target, effects)
        })
    }

    /// Shows the entry at `index`, clamped to the playlist.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::EmptyPlaylist`] when there is nothing to show.
    pub fn jump_to_index(&self, index: usize) -> Result<(), SlideshowError> {
        self.navigate(|controller, core, effects| {
            let target = index.min(core.playlist.len() - 1);
            core.history.push(core.index);
            controller.show(core, target, effects)
        })
    }

    /// Shows the entry with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::UnknownEntry`] without changing anything when
    /// the id is not in the playlist.
    pub fn jump_to_id(&self, id: &str) -> Result<(), SlideshowError> {
        self.navigate(|controller, core, effects| {
            let Some(target) = core.playlist.position_of(id) else {
                tracing::warn!(id, "cannot jump: entry is not in the playlist");
                return Err(SlideshowError::UnknownEntry(id.to_string()));
            };
            core.history.push(core.index);
            controller.show(core, target, effects)
        })
    }

    /// Rebuilds the playlist from the catalog.
    ///
    /// The current entry keeps its place when it survives the filter; history
    /// entries are remapped by id. An empty result stops playback.
    ///
    /// # Errors
    ///
    /// Returns [`SlideshowError::CatalogUnavailable`] when the catalog cannot
    /// be read. The old playlist is kept in that case.
    pub fn refresh(&self) -> Result<RefreshOutcome, SlideshowError> {
        let catalog = self.collaborators.catalog.all_entries().map_err(|err| {
            tracing::warn!(error = %err, "failed to read media catalog");
            SlideshowError::CatalogUnavailable(err.to_string())
        })?;

        let mut effects = Effects::default();
        let mut core = self.core.lock();
        let outcome = {
            let current_id = core.current_id();
            let history_ids: Vec<String> = core
                .history
                .iter()
                .filter_map(|index| core.playlist.get(index).map(|entry| entry.id.clone()))
                .collect();

            let outcome = core.playlist.refresh(catalog, current_id.as_deref());

            let history: Vec<usize> =
                history_ids.iter().filter_map(|id| core.playlist.position_of(id)).collect();
            core.history.replace(history);

            match outcome {
                RefreshOutcome::Empty => {
                    tracing::warn!("playlist is empty after refresh");
                    core.index = 0;
                    core.sequencer.clear();
                    Self::halt(&mut core, &self.timer, &mut effects);
                }
                RefreshOutcome::Remapped(index) => core.index = index,
                RefreshOutcome::Reset => {
                    core.index = 0;
                    if core.state == PlaybackState::Playing
                        && let Err(err) = self.show(&mut core, 0, &mut effects)
                    {
                        tracing::warn!(error = %err, "failed to show first entry after refresh");
                    }
                }
            }

            if core.mode == PlaybackMode::Random && !core.playlist.is_empty() {
                let (len, current) = (core.playlist.len(), core.index);
                core.sequencer.regenerate(len, Some(current));
            }

            tracing::debug!(?outcome, entries = core.playlist.len(), "playlist refreshed");
            outcome
        };

        self.release(core, effects);
        Ok(outcome)
    }

    /// Changes the tick period without forcing an immediate tick. Returns the
    /// interval actually applied.
    pub fn set_interval(&self, minutes: f64) -> Duration {
        let interval = interval_from_minutes(minutes);
        let mut core = self.core.lock();
        core.interval = interval;
        self.timer.set_period(interval);
        tracing::debug!(interval_secs = interval.as_secs_f64(), "slideshow interval changed");
        interval
    }

    /// Switches the playback mode. Setting the current mode again does nothing.
    pub fn set_mode(&self, mode: PlaybackMode) {
        let mut core = self.core.lock();
        if core.mode == mode {
            return;
        }

        if mode == PlaybackMode::Random {
            let (len, current) = (core.playlist.len(), core.index);
            core.sequencer.regenerate(len, Some(current));
        } else if core.mode == PlaybackMode::Random {
            core.sequencer.clear();
        }

        tracing::debug!(from = %core.mode, to = %mode, "playback mode changed");
        core.mode = mode;
    }

    /// Stores a new filter and rebuilds the playlist with it.
    ///
    /// # Errors
    ///
    /// Propagates [`refresh`](Self::refresh) errors. The filter is stored
    /// either way.
    pub fn set_filter(&self, filter: Filter) -> Result<RefreshOutcome, SlideshowError> {
        self.core.lock().playlist.set_filter(filter);
        self.refresh()
    }

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let core = self.core.lock();
        let current = core.playlist.get(core.index).cloned();

        PlaybackSnapshot {
            state: core.state,
            mode: core.mode,
            paused: core.paused,
            interval: core.interval,
            index: current.as_ref().map(|_| core.index),
            current,
            playlist_len: core.playlist.len(),
            history_len: core.history.len(),
            queue_len: core.sequencer.len(),
        }
    }

    /// Returns a copy of the current playlist.
    #[must_use]
    pub fn playlist(&self) -> Vec<MediaEntry> { self.core.lock().playlist.entries().to_vec() }

    #[must_use]
    pub fn filter(&self) -> Filter { self.core.lock().playlist.filter().clone() }

    // ------------------------------------------------------------------------
    // Transitions (called with the lock held)
    // ------------------------------------------------------------------------

    /// Runs a manual navigation and restarts the interval.
    fn navigate<F>(&self, transition: F) -> Result<(), SlideshowError>
    where F: FnOnce(&Self, &mut Core, &mut Effects) -> Result<(), SlideshowError> {
        let mut effects = Effects::default();
        let mut core = self.core.lock();
        if core.playlist.is_empty() {
            tracing::warn!("cannot navigate: playlist is empty");
            return Err(SlideshowError::EmptyPlaylist);
        }

        let result = transition(self, &mut *core, &mut effects);
        if core.is_running() {
            self.timer.reset();
        }
        self.release(core, effects);
        result
    }

    /// The tick transition shared by the timer and `next()`.
    fn step(&self, core: &mut Core, effects: &mut Effects) -> Result<(), SlideshowError> {
        let len = core.playlist.len();
        if len == 0 {
            Self::halt(core, &self.timer, effects);
            return Err(SlideshowError::EmptyPlaylist);
        }

        let current = core.index;
        let target = match core.mode {
            PlaybackMode::SingleRepeat => return self.show(core, current, effects),
            PlaybackMode::Sequential => (current + 1) % len,
            PlaybackMode::Random => match core.sequencer.dequeue_next() {
                Some(index) => index,
                None => {
                    core.sequencer.regenerate(len, Some(current));
                    core.sequencer.dequeue_next().unwrap_or(0)
                }
            },
        };

        core.history.push(current);
        self.show(core, target, effects)
    }

    /// Shows the first valid entry at or after `target`.
    ///
    /// Invalid entries are pruned and the same position is retried against
    /// the shorter playlist, at most once per entry. Stops playback when the
    /// playlist runs out.
    fn show(
        &self,
        core: &mut Core,
        target: usize,
        effects: &mut Effects,
    ) -> Result<(), SlideshowError> {
        let mut position = target;

        for _ in 0..core.playlist.len() {
            let len = core.playlist.len();
            if len == 0 {
                break;
            }
            position %= len;

            let Some(entry) = core.playlist.get(position) else { break };
            if self.collaborators.validator.exists(&entry.id) {
                tracing::debug!(index = position, id = %entry.id, "showing entry");
                effects.shown = Some(entry.clone());
                core.index = position;
                return Ok(());
            }

            tracing::warn!(id = %entry.id, path = %entry.path.display(), "pruning missing entry");
            core.prune(position);
        }

        tracing::warn!("no valid entries left in playlist");
        Self::halt(core, &self.timer, effects);
        Err(SlideshowError::EmptyPlaylist)
    }

    /// Moves to Stopped if playing.
    fn halt(core: &mut Core, timer: &TimerHandle, effects: &mut Effects) {
        if core.state != PlaybackState::Playing {
            return;
        }

        core.state = PlaybackState::Stopped;
        timer.disarm();
        // A start that never got to show anything is not announced at all.
        effects.playing = match effects.playing {
            Some(true) => None,
            _ => Some(false),
        };
        tracing::info!("slideshow stopped");
    }

    /// Hands the state lock over to the effects lock and applies `effects`.
    fn release(&self, core: MutexGuard<'_, Core>, effects: Effects) {
        let _effects = self.effects.lock();
        drop(core);

        if let Some(entry) = effects.shown {
            self.collaborators.renderer.display(&entry.path, entry.media_type);
            events::emit(&self.events, BackdropEvent::WallpaperChanged { path: entry.path });
        }

        if let Some(is_playing) = effects.playing {
            events::emit(&self.events, BackdropEvent::PlaybackStateChanged { is_playing });
        }
    }
}

impl PauseTarget for PlaybackController {
    fn pause(&self) {
        let mut core = self.core.lock();
        if core.paused {
            return;
        }

        core.paused = true;
        self.timer.disarm();
        tracing::debug!("slideshow paused");
    }

    fn resume(&self) {
        let mut core = self.core.lock();
        if !core.paused {
            return;
        }

        core.paused = false;
        if core.state == PlaybackState::Playing {
            self.timer.arm();
        }
        tracing::debug!("slideshow resumed");
    }
}
