//! The `run` command: plays the slideshow until interrupted.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use tokio::sync::{broadcast, mpsc};

use super::types::FilterArgs;
use crate::config::{JsonSettingsStore, LoadedConfig};
use crate::error::{BackdropError, SlideshowError};
use crate::events::BackdropEvent;
use crate::facade::{Backdrop, Ports};
use crate::governor::PerformanceSettings;
use crate::host::{DirectoryCatalog, HostSignals, LoggingRenderer, WallpaperRenderer};
use crate::platform::path::{display_relative, expand};
use crate::platform::thread::spawn_named_thread;
use crate::ports::{RendererPort, SettingsStorePort, StoredSettings};
use crate::slideshow::{PlaybackMode, SlideshowOptions};

/// Arguments of `backdrop run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Media directory. Overrides `slideshow.path` from the config file.
    #[arg(long, short, value_name = "DIR")]
    pub path: Option<String>,

    /// Minutes between wallpaper changes.
    #[arg(long, short, value_name = "MINUTES")]
    pub interval: Option<f64>,

    /// Playback mode (sequential, random, single-repeat).
    #[arg(long, short, value_name = "MODE")]
    pub mode: Option<PlaybackMode>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Log what would be shown instead of changing the wallpaper.
    /// Settings are not persisted either.
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore settings persisted by previous runs.
    #[arg(long)]
    pub fresh: bool,

    /// Do not read control commands from stdin.
    #[arg(long)]
    pub no_input: bool,
}

/// Execute `backdrop run`.
///
/// # Errors
///
/// Returns an error when no usable media directory is configured, the
/// runtime cannot be created, or the playlist is empty.
pub fn execute(args: &RunArgs, loaded: &LoadedConfig) -> Result<(), BackdropError> {
    let root = media_root(args, loaded)?;
    let catalog = Arc::new(DirectoryCatalog::open(&root, loaded.config.slideshow.recursive)?);

    let store = if args.dry_run { None } else { JsonSettingsStore::default_location() };
    let stored = if args.fresh { None } else { store.as_ref().and_then(load_stored) };
    let (options, performance) = resolve_settings(loaded, stored, args);

    let renderer: Arc<dyn RendererPort> = if args.dry_run {
        Arc::new(LoggingRenderer)
    } else {
        Arc::new(WallpaperRenderer::new())
    };

    let ports = Ports {
        catalog: Arc::clone(&catalog) as _,
        validator: catalog as _,
        renderer,
        signals: Arc::new(HostSignals::new()),
        settings_store: store.map(|store| Arc::new(store) as Arc<dyn SettingsStorePort>),
    };

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let result = runtime.block_on(play(ports, options, performance, &root, !args.no_input));
    runtime.shutdown_background();
    result
}

fn media_root(args: &RunArgs, loaded: &LoadedConfig) -> Result<PathBuf, BackdropError> {
    if let Some(path) = args.path.as_deref()
        && !path.trim().is_empty()
    {
        return Ok(expand(path));
    }

    let slideshow = &loaded.config.slideshow;
    if !slideshow.has_path() {
        return Err(BackdropError::InvalidArguments(
            "No media directory configured. Pass --path or set slideshow.path in the config file"
                .to_string(),
        ));
    }

    Ok(slideshow.media_path(loaded.directory()))
}

fn load_stored(store: &JsonSettingsStore) -> Option<StoredSettings> {
    match store.load() {
        Ok(stored) => stored,
        Err(err) => {
            tracing::warn!(path = %store.path().display(), error = %err, "ignoring stored settings");
            None
        }
    }
}

/// Layers the settings: config file first, then values persisted by an
/// earlier run, then command-line flags.
fn resolve_settings(
    loaded: &LoadedConfig,
    stored: Option<StoredSettings>,
    args: &RunArgs,
) -> (SlideshowOptions, PerformanceSettings) {
    let (mut options, performance) = match stored {
        Some(stored) => (
            SlideshowOptions {
                mode: stored.mode,
                interval_minutes: stored.interval_minutes,
                filter: stored.filter,
            },
            stored.performance,
        ),
        None => (loaded.config.slideshow.options(), loaded.config.performance.clone()),
    };

    if let Some(interval) = args.interval {
        options.interval_minutes = interval;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    options.filter = args.filter.merge_into(options.filter);

    (options, performance)
}

async fn play(
    ports: Ports,
    options: SlideshowOptions,
    performance: PerformanceSettings,
    root: &Path,
    interactive: bool,
) -> Result<(), BackdropError> {
    let backdrop = Backdrop::spawn(ports, options, performance);
    let mut events = backdrop.subscribe();

    if let Err(err) = backdrop.start() {
        backdrop.shutdown().await;
        return Err(err.into());
    }

    let status = backdrop.status();
    println!(
        "{} {} entries from {} ({}, every {})",
        "Playing".green().bold(),
        status.playback.playlist_len,
        root.display(),
        status.playback.mode,
        format_interval(status.playback.interval.as_secs_f64()),
    );
    if interactive {
        println!("{}", "Type 'help' for commands.".dimmed());
    }

    let mut input = interactive.then(spawn_input_reader);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event, root),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            line = next_line(&mut input) => match line {
                Some(line) => {
                    if handle_line(&backdrop, &line) == Flow::Quit {
                        break;
                    }
                }
                None => input = None,
            },
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "failed to listen for ctrl-c");
                }
                break;
            }
        }
    }

    println!("{}", "Stopping".yellow());
    backdrop.shutdown().await;
    Ok(())
}

// ============================================================================
// Interactive control
// ============================================================================

/// A command typed on stdin while the slideshow runs.
#[derive(Debug, Clone, PartialEq)]
enum ControlCommand {
    Next,
    Previous,
    Pause,
    Resume,
    Refresh,
    Status,
    Mode(PlaybackMode),
    Interval(f64),
    Jump(usize),
    Help,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let argument = words.next();

        match (command.as_str(), argument) {
            ("next" | "n", None) => Ok(Self::Next),
            ("prev" | "previous" | "p", None) => Ok(Self::Previous),
            ("pause", None) => Ok(Self::Pause),
            ("resume", None) => Ok(Self::Resume),
            ("refresh", None) => Ok(Self::Refresh),
            ("status", None) => Ok(Self::Status),
            ("help" | "?", None) => Ok(Self::Help),
            ("quit" | "exit" | "q", None) => Ok(Self::Quit),
            ("mode", Some(mode)) => mode.parse().map(Self::Mode),
            ("interval", Some(minutes)) => minutes
                .parse()
                .map(Self::Interval)
                .map_err(|_| format!("Invalid interval '{minutes}'. Expected minutes")),
            ("jump", Some(index)) => index
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .map(Self::Jump)
                .ok_or_else(|| format!("Invalid position '{index}'. Expected 1 or more")),
            _ => Err(format!("Unknown command '{}'. Type 'help' for commands", s.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Reads stdin lines on a dedicated thread. The channel closes at end of
/// input.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();

    spawn_named_thread("input", move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    receiver
}

async fn next_line(input: &mut Option<mpsc::UnboundedReceiver<String>>) -> Option<String> {
    match input {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

fn handle_line(backdrop: &Backdrop, line: &str) -> Flow {
    if line.trim().is_empty() {
        return Flow::Continue;
    }

    match line.parse::<ControlCommand>() {
        Ok(command) => apply_command(backdrop, command),
        Err(message) => {
            println!("{}", message.red());
            Flow::Continue
        }
    }
}

fn apply_command(backdrop: &Backdrop, command: ControlCommand) -> Flow {
    let result = match command {
        ControlCommand::Next => backdrop.next(),
        ControlCommand::Previous => backdrop.previous(),
        ControlCommand::Jump(index) => backdrop.jump_to_index(index),
        ControlCommand::Refresh => backdrop.refresh().map(|outcome| {
            println!("{} {outcome:?}", "Refreshed:".cyan());
        }),
        ControlCommand::Pause => {
            println!("{} {}", "Pause:".cyan(), backdrop.set_user_pause(true));
            Ok(())
        }
        ControlCommand::Resume => {
            println!("{} {}", "Pause:".cyan(), backdrop.set_user_pause(false));
            Ok(())
        }
        ControlCommand::Mode(mode) => {
            backdrop.set_mode(mode);
            println!("{} {mode}", "Mode:".cyan());
            Ok(())
        }
        ControlCommand::Interval(minutes) => {
            let interval = backdrop.set_interval(minutes);
            println!("{} {}", "Interval:".cyan(), format_interval(interval.as_secs_f64()));
            Ok(())
        }
        ControlCommand::Status => {
            print_status(backdrop);
            Ok(())
        }
        ControlCommand::Help => {
            print_help();
            Ok(())
        }
        ControlCommand::Quit => return Flow::Quit,
    };

    if let Err(err) = result {
        print_warning(&err);
    }
    Flow::Continue
}

fn print_warning(err: &SlideshowError) { println!("{} {err}", "Warning:".yellow()); }

fn print_status(backdrop: &Backdrop) {
    let status = backdrop.status();
    let playback = &status.playback;
    let current = playback.current.as_ref().map_or_else(|| "-".to_string(), |e| e.name.clone());
    let position = playback.index.map_or_else(|| "-".to_string(), |index| (index + 1).to_string());

    println!("{:<10} {:?}", "State:".bold(), playback.state);
    println!("{:<10} {}", "Mode:".bold(), playback.mode);
    println!("{:<10} {}", "Interval:".bold(), format_interval(playback.interval.as_secs_f64()));
    println!("{:<10} {current} ({position}/{})", "Current:".bold(), playback.playlist_len);
    println!("{:<10} {}", "Pause:".bold(), status.pause_reason);
}

fn print_help() {
    println!("  next, n            show the next entry");
    println!("  prev, p            go back to the previous entry");
    println!("  jump <position>    show the entry at a 1-based position");
    println!("  mode <mode>        sequential, random or single-repeat");
    println!("  interval <minutes> change the interval");
    println!("  pause, resume      toggle the user pause");
    println!("  refresh            re-scan the media directory");
    println!("  status             show the playback state");
    println!("  quit, q            stop and exit");
}

fn print_event(event: &BackdropEvent, root: &Path) {
    match event {
        BackdropEvent::WallpaperChanged { path } => {
            println!("{} {}", "Wallpaper:".cyan(), display_relative(path, root));
        }
        BackdropEvent::PlaybackStateChanged { is_playing } => {
            let state = if *is_playing { "playing".green() } else { "stopped".yellow() };
            println!("{} {state}", "Playback:".cyan());
        }
        BackdropEvent::PauseStateChanged { reason } => {
            let reason = if reason.is_paused() {
                reason.to_string().yellow()
            } else {
                reason.to_string().green()
            };
            println!("{} {reason}", "Pause:".cyan());
        }
    }
}

fn format_interval(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.0}s")
    } else {
        format!("{:.1} min", seconds / 60.0)
    }
}
