//! Playlist file persistence
//!
//! Playlists are stored as pretty-printed JSON of the form
//! `{"items": [{"artist": ..., "title": ..., "link": ...}, ...]}`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::{Playlist, TrackEntry};

/// Failure to persist a playlist
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize playlist: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlaylistFile {
    items: Vec<TrackEntry>,
}

/// Loads and saves playlists
pub struct PlaylistStore;

impl PlaylistStore {
    /// Load a playlist from `path`
    ///
    /// Never fails: a missing, unreadable or unparsable file yields an empty
    /// playlist. The distinction is only logged.
    pub fn load(path: &Path) -> Playlist {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No playlist at {}, starting empty", path.display());
                return Playlist::new();
            }
            Err(e) => {
                warn!("Failed to read playlist {}: {}", path.display(), e);
                return Playlist::new();
            }
        };

        match serde_json::from_str::<PlaylistFile>(&content) {
            Ok(file) => {
                debug!("Loaded {} entries from {}", file.items.len(), path.display());
                Playlist::from_entries(file.items)
            }
            Err(e) => {
                warn!("Ignoring unparsable playlist {}: {}", path.display(), e);
                Playlist::new()
            }
        }
    }

    /// Write the playlist entries to `path` in playlist order
    pub fn save(path: &Path, playlist: &Playlist) -> Result<(), StoreError> {
        let file = PlaylistFile {
            items: playlist.snapshot(),
        };
        let mut content = serde_json::to_string_pretty(&file)?;
        content.push('\n');

        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Saved {} entries to {}", playlist.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Playlist {
        Playlist::from_entries(vec![
            TrackEntry::new("Zed", "Last", "https://example.com/z"),
            TrackEntry::new("", "", ""),
            TrackEntry::new("Alpha", "First", "https://example.com/a"),
            TrackEntry::new("Alpha", "First", "https://example.com/a"),
        ])
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ycp.json");
        let playlist = sample();

        PlaylistStore::save(&path, &playlist).unwrap();
        let loaded = PlaylistStore::load(&path);

        assert_eq!(loaded.entries(), playlist.entries());
    }

    #[test]
    fn test_round_trip_empty_playlist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");

        PlaylistStore::save(&path, &Playlist::new()).unwrap();
        let loaded = PlaylistStore::load(&path);

        assert!(loaded.is_empty());
        assert!(loaded.cursor().is_none());
    }

    #[test]
    fn test_load_missing_file_twice_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");

        assert!(PlaylistStore::load(&path).is_empty());
        assert!(PlaylistStore::load(&path).is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(PlaylistStore::load(&path).is_empty());

        // Valid JSON without an items list is treated the same way
        fs::write(&path, r#"{"tracks": []}"#).unwrap();
        assert!(PlaylistStore::load(&path).is_empty());
    }

    #[test]
    fn test_load_reads_existing_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ycp.json");
        fs::write(
            &path,
            r#"{"items": [{"artist": "A", "title": "T1", "link": "u1"}]}"#,
        )
        .unwrap();

        let loaded = PlaylistStore::load(&path);
        assert_eq!(loaded.entries(), &[TrackEntry::new("A", "T1", "u1")]);
        assert_eq!(loaded.cursor(), Some(0));
    }

    #[test]
    fn test_save_failure_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("ycp.json");
        let playlist = sample();

        let err = PlaylistStore::save(&path, &playlist).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("missing-dir"));
        assert_eq!(playlist.len(), 4);
    }
}
