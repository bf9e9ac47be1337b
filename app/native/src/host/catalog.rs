//! Media catalog backed by a directory on disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use natord::compare;

use crate::error::CatalogError;
use crate::ports::{CatalogPort, ValidationPort};
use crate::slideshow::{MediaEntry, MediaType};

/// Lists supported media files under a root directory.
///
/// Each file becomes one entry: the full path is the id, the file stem is the
/// name, and the lowercased names of the directories between the root and the
/// file are its tags. Hidden files and directories are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
    recursive: bool,
}

impl DirectoryCatalog {
    /// Opens a catalog rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPath`] if `root` does not exist or is not
    /// a directory.
    pub fn open(root: impl Into<PathBuf>, recursive: bool) -> Result<Self, CatalogError> {
        let root = root.into();

        if !root.exists() {
            return Err(CatalogError::InvalidPath(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(CatalogError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self { root, recursive })
    }

    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// Collects candidate files. Unreadable subdirectories are skipped; an
    /// unreadable root is an error.
    fn scan(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) if dir == self.root => {
                    return Err(CatalogError::Io {
                        path: dir.display().to_string(),
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if is_hidden(&path) {
                    continue;
                }

                if path.is_dir() {
                    if self.recursive {
                        pending.push(path);
                    }
                } else if path.is_file() && media_type_of(&path).is_some() {
                    files.push(path);
                }
            }
        }

        // Natural sort keeps "wall2" before "wall10" in sequential mode.
        files.sort_by(|a, b| compare(a.to_string_lossy().as_ref(), b.to_string_lossy().as_ref()));
        Ok(files)
    }

    fn entry_for(&self, path: &Path) -> Option<MediaEntry> {
        let media_type = media_type_of(path)?;
        let name = path.file_stem()?.to_string_lossy().into_owned();
        let tags: BTreeSet<String> = path
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.root).ok())
            .into_iter()
            .flat_map(Path::components)
            .map(|component| component.as_os_str().to_string_lossy().to_lowercase())
            .collect();

        Some(
            MediaEntry::new(path.to_string_lossy(), path, media_type, name).with_tags(tags),
        )
    }
}

impl CatalogPort for DirectoryCatalog {
    fn all_entries(&self) -> Result<Vec<MediaEntry>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::InvalidPath(self.root.display().to_string()));
        }

        let entries: Vec<MediaEntry> =
            self.scan()?.iter().filter_map(|path| self.entry_for(path)).collect();
        tracing::debug!(root = %self.root.display(), count = entries.len(), "catalog scanned");
        Ok(entries)
    }
}

impl ValidationPort for DirectoryCatalog {
    /// Ids are file paths, so an entry is valid while its file exists.
    fn exists(&self, entry_id: &str) -> bool { Path::new(entry_id).is_file() }
}

fn media_type_of(path: &Path) -> Option<MediaType> {
    path.extension().and_then(|ext| ext.to_str()).and_then(MediaType::from_extension)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with('.'))
}
