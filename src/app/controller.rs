//! Application controller
//!
//! Owns the playlist and the active mode. Every command is fully applied
//! (state mutated, status line recomputed) before the next one is taken.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::mode::{Command, DownloadState, EntryEditor, Mode};
use super::status::StatusPresenter;
use crate::download::DownloadEvent;
use crate::playlist::{Playlist, PlaylistStore, TrackEntry};

/// What the run loop has to do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Start the pipeline on this snapshot
    StartDownload(Arc<[TrackEntry]>),
}

pub struct App {
    playlist: Playlist,
    mode: Mode,
    /// Last path the playlist was loaded from or saved to
    playlist_path: PathBuf,
    status: StatusPresenter,
    hold: Duration,
}

impl App {
    pub fn new(playlist: Playlist, playlist_path: PathBuf, hold: Duration) -> Self {
        let mut app = Self {
            playlist,
            mode: Mode::Browsing,
            playlist_path,
            status: StatusPresenter::new(),
            hold,
        };
        app.status.refresh(&app.mode);
        app
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn playlist_path(&self) -> &Path {
        &self.playlist_path
    }

    pub fn status_line(&self) -> &str {
        self.status.line()
    }

    /// Re-evaluate time-based status (held messages)
    pub fn tick(&mut self) {
        self.status.refresh(&self.mode);
    }

    pub fn handle(&mut self, command: Command) -> Outcome {
        let mode = std::mem::take(&mut self.mode);
        let previous = mode.name();
        let (next, outcome) = match mode {
            Mode::Browsing => self.browsing(command),
            Mode::AddingEntry(editor) => self.adding(editor, command),
            Mode::EditingEntry { index, editor } => self.editing(index, editor, command),
            Mode::Saving { file_name } => self.saving(file_name, command),
            // Batches are not cancellable; input waits for AllFinished
            downloading @ Mode::Downloading(_) => (downloading, Outcome::Continue),
        };

        if next.name() != previous {
            debug!("Mode: {} -> {}", previous, next.name());
        }
        self.mode = next;
        self.status.refresh(&self.mode);
        outcome
    }

    fn browsing(&mut self, command: Command) -> (Mode, Outcome) {
        let mode = match command {
            Command::Add => Mode::AddingEntry(EntryEditor::default()),
            Command::Edit => match (self.playlist.cursor(), self.playlist.current()) {
                (Some(index), Some(entry)) => Mode::EditingEntry {
                    index,
                    editor: EntryEditor::from_entry(entry),
                },
                _ => {
                    self.status.hold("Nothing to edit", self.hold);
                    Mode::Browsing
                }
            },
            Command::Remove => {
                if let Some(entry) = self.playlist.remove_at_cursor() {
                    info!("Removed {} - {}", entry.artist, entry.title);
                }
                Mode::Browsing
            }
            Command::Save => Mode::Saving {
                file_name: self.playlist_path.display().to_string(),
            },
            Command::Download => {
                let items: Arc<[TrackEntry]> = self.playlist.snapshot().into();
                info!("Starting download of {} item(s)", items.len());
                return (
                    Mode::Downloading(DownloadState::new(items.clone())),
                    Outcome::StartDownload(items),
                );
            }
            Command::Quit => return (Mode::Browsing, Outcome::Quit),
            Command::MoveCursor(delta) => {
                self.playlist.move_cursor(delta);
                Mode::Browsing
            }
            Command::First => {
                self.playlist.move_to_first();
                Mode::Browsing
            }
            Command::Last => {
                self.playlist.move_to_last();
                Mode::Browsing
            }
            _ => Mode::Browsing,
        };
        (mode, Outcome::Continue)
    }

    fn adding(&mut self, mut editor: EntryEditor, command: Command) -> (Mode, Outcome) {
        let mode = match command {
            Command::Cancel => Mode::Browsing,
            Command::Commit => {
                self.playlist.add(editor.to_entry());
                Mode::Browsing
            }
            other => {
                editor.apply(other);
                Mode::AddingEntry(editor)
            }
        };
        (mode, Outcome::Continue)
    }

    fn editing(
        &mut self,
        index: usize,
        mut editor: EntryEditor,
        command: Command,
    ) -> (Mode, Outcome) {
        let mode = match command {
            Command::Cancel => Mode::Browsing,
            Command::Commit => {
                self.playlist.edit_at(index, editor.to_entry());
                Mode::Browsing
            }
            other => {
                editor.apply(other);
                Mode::EditingEntry { index, editor }
            }
        };
        (mode, Outcome::Continue)
    }

    fn saving(&mut self, mut file_name: String, command: Command) -> (Mode, Outcome) {
        let mode = match command {
            Command::Cancel => Mode::Browsing,
            Command::Commit => {
                self.save_to(PathBuf::from(file_name));
                Mode::Browsing
            }
            Command::Insert(c) => {
                file_name.push(c);
                Mode::Saving { file_name }
            }
            Command::Backspace => {
                file_name.pop();
                Mode::Saving { file_name }
            }
            _ => Mode::Saving { file_name },
        };
        (mode, Outcome::Continue)
    }

    fn save_to(&mut self, path: PathBuf) {
        match PlaylistStore::save(&path, &self.playlist) {
            Ok(()) => {
                info!("Saved playlist to {}", path.display());
                self.status.hold(
                    format!("Saved {} entries to {}", self.playlist.len(), path.display()),
                    self.hold,
                );
                self.playlist_path = path;
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                self.status.hold(format!("Save failed: {}", e), self.hold);
            }
        }
    }

    /// Apply a pipeline event; ignored unless a batch is in flight
    pub fn apply_download_event(&mut self, event: DownloadEvent) {
        let Mode::Downloading(state) = &mut self.mode else {
            debug!("Dropping download event outside a batch: {}", event);
            return;
        };

        if let DownloadEvent::AllFinished { .. } = event {
            self.status.hold(event.to_string(), self.hold);
            self.mode = Mode::Browsing;
        } else {
            if let Some(item) = event.item() {
                state.current_index = item.index;
            }
            state.last_event = Some(event);
        }
        self.status.refresh(&self.mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::event::ItemInfo;
    use tempfile::TempDir;

    fn app_with(entries: Vec<TrackEntry>) -> App {
        App::new(
            Playlist::from_entries(entries),
            PathBuf::from("ycp.json"),
            Duration::from_secs(60),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(Command::Insert(c));
        }
    }

    fn item(index: usize, total: usize) -> ItemInfo {
        ItemInfo {
            index,
            total,
            artist: "A".to_string(),
            title: "T".to_string(),
        }
    }

    #[test]
    fn test_add_commit_appends_and_moves_cursor() {
        let mut app = app_with(vec![TrackEntry::new("A", "T1", "u1")]);

        app.handle(Command::Add);
        assert!(matches!(app.mode(), Mode::AddingEntry(_)));
        assert_eq!(app.status_line(), "Adding music");
        type_text(&mut app, "B");
        app.handle(Command::NextField);
        type_text(&mut app, "T2");
        app.handle(Command::NextField);
        type_text(&mut app, "u2");
        app.handle(Command::Commit);

        assert_eq!(app.mode(), &Mode::Browsing);
        assert_eq!(
            app.playlist().entries(),
            &[TrackEntry::new("A", "T1", "u1"), TrackEntry::new("B", "T2", "u2")]
        );
        assert_eq!(app.playlist().cursor(), Some(1));

        // Continue with a removal at the cursor
        app.handle(Command::Remove);
        assert_eq!(app.playlist().entries(), &[TrackEntry::new("A", "T1", "u1")]);
        assert_eq!(app.playlist().cursor(), Some(0));
        assert_eq!(app.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_add_starts_with_cleared_fields() {
        let mut app = app_with(vec![TrackEntry::new("A", "T1", "u1")]);
        app.handle(Command::Add);
        type_text(&mut app, "junk");
        app.handle(Command::Cancel);

        app.handle(Command::Add);
        assert_eq!(app.mode().editor(), Some(&EntryEditor::default()));
    }

    #[test]
    fn test_cancel_discards_edits() {
        let mut app = app_with(vec![TrackEntry::new("A", "T1", "u1")]);

        app.handle(Command::Edit);
        type_text(&mut app, "xyz");
        app.handle(Command::Cancel);

        assert_eq!(app.mode(), &Mode::Browsing);
        assert_eq!(app.playlist().entries(), &[TrackEntry::new("A", "T1", "u1")]);
    }

    #[test]
    fn test_edit_prefills_and_replaces_in_place() {
        let mut app = app_with(vec![
            TrackEntry::new("A", "T1", "u1"),
            TrackEntry::new("B", "T2", "u2"),
        ]);
        app.handle(Command::MoveCursor(1));
        app.handle(Command::Edit);

        match app.mode() {
            Mode::EditingEntry { index, editor } => {
                assert_eq!(*index, 1);
                assert_eq!(editor.to_entry(), TrackEntry::new("B", "T2", "u2"));
            }
            other => panic!("unexpected mode {:?}", other),
        }

        type_text(&mut app, "!");
        app.handle(Command::Commit);
        assert_eq!(app.playlist().entries()[1], TrackEntry::new("B!", "T2", "u2"));
        assert_eq!(app.playlist().len(), 2);
    }

    #[test]
    fn test_edit_on_empty_playlist_stays_browsing() {
        let mut app = app_with(Vec::new());
        app.handle(Command::Edit);
        assert_eq!(app.mode(), &Mode::Browsing);
        assert_eq!(app.status_line(), "Nothing to edit");

        app.handle(Command::Remove);
        assert!(app.playlist().is_empty());
    }

    #[test]
    fn test_save_prefills_last_path_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        let mut app = App::new(
            Playlist::from_entries(vec![TrackEntry::new("A", "T1", "u1")]),
            path.clone(),
            Duration::from_secs(60),
        );

        app.handle(Command::Save);
        assert_eq!(
            app.mode(),
            &Mode::Saving {
                file_name: path.display().to_string()
            }
        );
        assert_eq!(app.status_line(), format!("Save as: {}", path.display()));

        app.handle(Command::Commit);
        assert_eq!(app.mode(), &Mode::Browsing);
        assert!(app.status_line().starts_with("Saved 1 entries"));
        assert_eq!(PlaylistStore::load(&path).entries(), app.playlist().entries());
    }

    #[test]
    fn test_save_as_new_name_updates_last_path() {
        let dir = TempDir::new().unwrap();
        let original = dir.path().join("a.json");
        let mut app = App::new(Playlist::new(), original.clone(), Duration::from_secs(60));

        app.handle(Command::Save);
        for _ in 0.."a.json".len() {
            app.handle(Command::Backspace);
        }
        type_text(&mut app, "b.json");
        app.handle(Command::Commit);

        assert_eq!(app.playlist_path(), dir.path().join("b.json"));
        assert!(dir.path().join("b.json").exists());
        assert!(!original.exists());
    }

    #[test]
    fn test_save_failure_keeps_playlist() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("no-such-dir").join("x.json");
        let entries = vec![TrackEntry::new("A", "T1", "u1")];
        let mut app = App::new(
            Playlist::from_entries(entries.clone()),
            bad.clone(),
            Duration::from_secs(60),
        );

        app.handle(Command::Save);
        app.handle(Command::Commit);

        assert_eq!(app.mode(), &Mode::Browsing);
        assert!(app.status_line().starts_with("Save failed"));
        assert_eq!(app.playlist().entries(), entries.as_slice());
        assert_eq!(app.playlist_path(), bad);
    }

    #[test]
    fn test_save_cancel_returns_to_browsing() {
        let mut app = app_with(Vec::new());
        app.handle(Command::Save);
        type_text(&mut app, ".bak");
        app.handle(Command::Cancel);

        assert_eq!(app.mode(), &Mode::Browsing);
        assert_eq!(app.playlist_path(), Path::new("ycp.json"));
    }

    #[test]
    fn test_quit_only_from_browsing() {
        let mut app = app_with(Vec::new());
        app.handle(Command::Add);
        assert_eq!(app.handle(Command::Quit), Outcome::Continue);
        assert!(matches!(app.mode(), Mode::AddingEntry(_)));

        app.handle(Command::Cancel);
        assert_eq!(app.handle(Command::Quit), Outcome::Quit);
    }

    #[test]
    fn test_download_snapshots_playlist() {
        let mut app = app_with(vec![
            TrackEntry::new("A", "T1", "u1"),
            TrackEntry::new("B", "T2", "u2"),
        ]);

        let Outcome::StartDownload(batch) = app.handle(Command::Download) else {
            panic!("download did not start");
        };
        assert_eq!(batch.as_ref(), app.playlist().entries());
        assert_eq!(app.status_line(), "Preparing 2 task(s)");

        // Editing commands are not serviced while the batch runs
        assert_eq!(app.handle(Command::Remove), Outcome::Continue);
        assert_eq!(app.handle(Command::Add), Outcome::Continue);
        assert_eq!(app.handle(Command::Download), Outcome::Continue);
        assert_eq!(app.playlist().len(), 2);
        assert!(matches!(app.mode(), Mode::Downloading(_)));
    }

    #[test]
    fn test_batch_events_drive_status_and_return_to_browsing() {
        let entries = vec![
            TrackEntry::new("A", "T1", "u1"),
            TrackEntry::new("B", "T2", "u2"),
        ];
        let mut app = app_with(entries.clone());
        app.handle(Command::Download);

        let events = [
            DownloadEvent::Started(item(0, 2)),
            DownloadEvent::Progress {
                item: item(0, 2),
                percent: 50.0,
                speed: None,
            },
            DownloadEvent::ItemFinished {
                item: item(0, 2),
                output_path: PathBuf::from("A - T1.mp3"),
            },
            DownloadEvent::Started(item(1, 2)),
            DownloadEvent::ItemError {
                item: item(1, 2),
                message: "boom".to_string(),
            },
        ];
        for event in events {
            let expected = event.to_string();
            app.apply_download_event(event);
            assert_eq!(app.status_line(), expected);
        }
        match app.mode() {
            Mode::Downloading(state) => assert_eq!(state.current_index, 1),
            other => panic!("unexpected mode {:?}", other),
        }

        app.apply_download_event(DownloadEvent::AllFinished { total: 2, failed: 1 });
        assert_eq!(app.mode(), &Mode::Browsing);
        assert_eq!(app.status_line(), "2 task(s) finished, 1 failed");
        assert_eq!(app.playlist().entries(), entries.as_slice());
    }

    #[test]
    fn test_progress_cannot_overwrite_save_prompt() {
        let mut app = app_with(Vec::new());
        app.handle(Command::Save);
        let prompt = app.status_line().to_string();

        app.apply_download_event(DownloadEvent::Progress {
            item: item(0, 1),
            percent: 10.0,
            speed: None,
        });

        assert!(matches!(app.mode(), Mode::Saving { .. }));
        assert_eq!(app.status_line(), prompt);
    }

    #[test]
    fn test_every_editor_path_returns_to_browsing() {
        let starts = [Command::Add, Command::Edit, Command::Save];
        let exits = [Command::Cancel, Command::Commit];
        let dir = TempDir::new().unwrap();

        for start in starts {
            for exit in exits {
                let mut app = App::new(
                    Playlist::from_entries(vec![TrackEntry::new("A", "T1", "u1")]),
                    dir.path().join("ycp.json"),
                    Duration::from_secs(60),
                );
                app.handle(start);
                assert_ne!(app.mode(), &Mode::Browsing);
                type_text(&mut app, "x");
                app.handle(exit);
                assert_eq!(app.mode(), &Mode::Browsing, "{:?} then {:?}", start, exit);
            }
        }
    }
}
