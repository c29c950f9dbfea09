//! In-memory playlist with a cursor

use serde::{Deserialize, Serialize};

/// One playlist row
///
/// Entries have no identity beyond their position. Duplicates are allowed and
/// no field is validated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackEntry {
    pub artist: String,
    pub title: String,
    pub link: String,
}

impl TrackEntry {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Ordered track entries plus a cursor
///
/// The cursor is `Some(i)` with `i < len` whenever the list is non-empty and
/// `None` exactly when it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<TrackEntry>,
    cursor: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from stored entries, cursor on the first row
    pub fn from_entries(entries: Vec<TrackEntry>) -> Self {
        let cursor = if entries.is_empty() { None } else { Some(0) };
        Self { entries, cursor }
    }

    pub fn entries(&self) -> &[TrackEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&TrackEntry> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Append an entry and move the cursor onto it
    pub fn add(&mut self, entry: TrackEntry) {
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Replace the entry at `index`; out of range is a no-op
    pub fn edit_at(&mut self, index: usize, entry: TrackEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Delete the entry under the cursor and return it
    pub fn remove_at_cursor(&mut self) -> Option<TrackEntry> {
        let index = self.cursor?;
        let removed = self.entries.remove(index);
        self.cursor = if self.entries.is_empty() {
            None
        } else {
            Some(index.min(self.entries.len() - 1))
        };
        Some(removed)
    }

    /// Move the cursor by `delta` rows, clamped to the list bounds (no wrap)
    pub fn move_cursor(&mut self, delta: isize) {
        let Some(current) = self.cursor else {
            return;
        };
        let last = self.entries.len() as isize - 1;
        let target = (current as isize).saturating_add(delta).clamp(0, last);
        self.cursor = Some(target as usize);
    }

    pub fn move_to_first(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = Some(0);
        }
    }

    pub fn move_to_last(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = Some(self.entries.len() - 1);
        }
    }

    /// Immutable copy of the entries, used as a download batch
    pub fn snapshot(&self) -> Vec<TrackEntry> {
        self.entries.clone()
    }
}
