//! Filtered, ordered view of the media catalog.

use std::collections::HashSet;

use super::media::{Filter, MediaEntry};

/// Result of rebuilding the playlist from a catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nothing in the catalog matches the filter.
    Empty,
    /// The previously current entry survived and now sits at this index.
    Remapped(usize),
    /// The previously current entry is gone; playback restarts at index 0.
    Reset,
}

/// Owns the playlist: catalog entries that pass the filter, in catalog order.
///
/// Ids are unique within the playlist; when the catalog repeats an id only
/// the first occurrence is kept.
#[derive(Debug, Default)]
pub struct PlaylistStore {
    entries: Vec<MediaEntry>,
    filter: Filter,
}

impl PlaylistStore {
    /// Creates an empty playlist with the given filter.
    #[must_use]
    pub fn new(filter: Filter) -> Self {
        Self {
            entries: Vec::new(),
            filter,
        }
    }

    /// Returns the active filter.
    #[must_use]
    pub const fn filter(&self) -> &Filter { &self.filter }

    /// Replaces the filter. Takes effect on the next [`refresh`](Self::refresh).
    pub fn set_filter(&mut self, filter: Filter) { self.filter = filter; }

    /// Rebuilds the playlist from `catalog`.
    ///
    /// `current_id` is the id of the entry on screen, used to remap the
    /// current index onto the new playlist.
    pub fn refresh(&mut self, catalog: Vec<MediaEntry>, current_id: Option<&str>) -> RefreshOutcome {
        let mut seen = HashSet::new();
        let entries: Vec<MediaEntry> = catalog
            .into_iter()
            .filter(|entry| self.filter.matches(entry))
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();
        self.entries = entries;

        if self.entries.is_empty() {
            return RefreshOutcome::Empty;
        }

        current_id
            .and_then(|id| self.position_of(id))
            .map_or(RefreshOutcome::Reset, RefreshOutcome::Remapped)
    }

    /// Removes and returns the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Option<MediaEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Returns the index of the entry with the given id.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaEntry> { self.entries.get(index) }

    #[must_use]
    pub fn entries(&self) -> &[MediaEntry] { &self.entries }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slideshow::media::MediaType;

    fn entry(id: &str, media_type: MediaType) -> MediaEntry {
        MediaEntry::new(id, format!("/walls/{id}"), media_type, id)
    }

    fn catalog() -> Vec<MediaEntry> {
        vec![
            entry("a", MediaType::Image),
            entry("b", MediaType::Video),
            entry("c", MediaType::Image),
        ]
    }

    #[test]
    fn test_refresh_preserves_catalog_order() {
        let mut store = PlaylistStore::default();
        store.refresh(catalog(), None);
        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_refresh_drops_duplicate_ids() {
        let mut store = PlaylistStore::default();
        let mut items = catalog();
        items.push(MediaEntry::new("a", "/elsewhere/a", MediaType::Gif, "copy"));
        store.refresh(items, None);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).unwrap().path.to_str(), Some("/walls/a"));
    }

    #[test]
    fn test_refresh_applies_filter() {
        let mut store = PlaylistStore::new(Filter {
            media_type: Some(MediaType::Image),
            ..Default::default()
        });
        store.refresh(catalog(), None);
        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_refresh_reports_empty() {
        let mut store = PlaylistStore::new(Filter {
            media_type: Some(MediaType::Html),
            ..Default::default()
        });
        assert_eq!(store.refresh(catalog(), Some("a")), RefreshOutcome::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn test_refresh_remaps_current_entry() {
        let mut store = PlaylistStore::default();
        store.refresh(catalog(), None);

        store.set_filter(Filter {
            media_type: Some(MediaType::Image),
            ..Default::default()
        });
        assert_eq!(store.refresh(catalog(), Some("c")), RefreshOutcome::Remapped(1));
    }

    #[test]
    fn test_refresh_resets_when_current_is_filtered_out() {
        let mut store = PlaylistStore::new(Filter {
            media_type: Some(MediaType::Image),
            ..Default::default()
        });
        assert_eq!(store.refresh(catalog(), Some("b")), RefreshOutcome::Reset);
        assert_eq!(store.refresh(catalog(), None), RefreshOutcome::Reset);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut store = PlaylistStore::default();
        store.refresh(catalog(), None);
        assert!(store.remove(7).is_none());
        assert_eq!(store.remove(1).map(|e| e.id), Some("b".to_string()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.position_of("c"), Some(1));
    }
}
