//! Renderers that put slideshow entries on screen.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::platform::thread::spawn_named_thread;
use crate::ports::RendererPort;
use crate::slideshow::MediaType;

/// Sets still images as the desktop background.
///
/// Requests are queued to one worker thread so they are applied in order
/// without blocking the caller. Entries that are not still images are
/// logged and skipped.
pub struct WallpaperRenderer {
    sender: mpsc::Sender<PathBuf>,
}

impl WallpaperRenderer {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel::<PathBuf>();

        spawn_named_thread("renderer", move || {
            for path in receiver {
                apply_wallpaper(&path);
            }
            tracing::debug!("renderer thread stopped");
        });

        Self { sender }
    }
}

impl Default for WallpaperRenderer {
    fn default() -> Self { Self::new() }
}

impl RendererPort for WallpaperRenderer {
    fn display(&self, path: &Path, media_type: MediaType) {
        if !media_type.is_still() {
            tracing::info!(
                path = %path.display(),
                media_type = %media_type,
                "media type cannot be used as a desktop background, skipping"
            );
            return;
        }

        if self.sender.send(path.to_path_buf()).is_err() {
            tracing::warn!(path = %path.display(), "renderer thread is gone, wallpaper not set");
        }
    }
}

fn apply_wallpaper(path: &Path) {
    let Some(path_str) = path.to_str() else {
        tracing::warn!(path = %path.display(), "wallpaper path is not valid UTF-8");
        return;
    };

    match wallpaper::set_from_path(path_str) {
        Ok(()) => tracing::debug!(path = path_str, "wallpaper set"),
        Err(err) => tracing::warn!(path = path_str, error = %err, "failed to set wallpaper"),
    }
}

/// Logs what would be shown. Used for `--dry-run`.
#[derive(Debug, Default)]
pub struct LoggingRenderer;

impl RendererPort for LoggingRenderer {
    fn display(&self, path: &Path, media_type: MediaType) {
        tracing::info!(path = %path.display(), media_type = %media_type, "would display");
    }
}
