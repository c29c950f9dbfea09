//! Interaction modes and the named commands that drive them

use std::sync::Arc;

use crate::download::DownloadEvent;
use crate::playlist::TrackEntry;

/// Named commands, already decoupled from raw keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Edit,
    Remove,
    Save,
    Download,
    Quit,
    Cancel,
    Commit,
    MoveCursor(isize),
    First,
    Last,
    Insert(char),
    Backspace,
    NextField,
    PrevField,
}

/// Field of the entry editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Artist,
    Title,
    Link,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Artist, Field::Title, Field::Link];

    pub fn label(self) -> &'static str {
        match self {
            Self::Artist => "Artist: ",
            Self::Title => "Title: ",
            Self::Link => "Link: ",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Artist => Self::Title,
            Self::Title => Self::Link,
            Self::Link => Self::Artist,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Artist => Self::Link,
            Self::Title => Self::Artist,
            Self::Link => Self::Title,
        }
    }
}

/// Editable copy of an entry's fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEditor {
    pub artist: String,
    pub title: String,
    pub link: String,
    pub focus: Field,
}

impl EntryEditor {
    pub fn from_entry(entry: &TrackEntry) -> Self {
        Self {
            artist: entry.artist.clone(),
            title: entry.title.clone(),
            link: entry.link.clone(),
            focus: Field::Artist,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Artist => &self.artist,
            Field::Title => &self.title,
            Field::Link => &self.link,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Artist => &mut self.artist,
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
        }
    }

    /// Apply a text-editing command; returns false for anything else
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Insert(c) => self.focused_mut().push(c),
            Command::Backspace => {
                self.focused_mut().pop();
            }
            Command::NextField => self.focus = self.focus.next(),
            Command::PrevField => self.focus = self.focus.prev(),
            _ => return false,
        }
        true
    }

    pub fn to_entry(&self) -> TrackEntry {
        TrackEntry::new(self.artist.clone(), self.title.clone(), self.link.clone())
    }
}

/// State of an in-flight batch
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadState {
    /// Snapshot taken when the batch started; never changes
    pub items: Arc<[TrackEntry]>,
    pub current_index: usize,
    pub last_event: Option<DownloadEvent>,
}

impl DownloadState {
    pub fn new(items: Arc<[TrackEntry]>) -> Self {
        Self {
            items,
            current_index: 0,
            last_event: None,
        }
    }
}

/// The single active interaction state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Browsing,
    AddingEntry(EntryEditor),
    EditingEntry { index: usize, editor: EntryEditor },
    Saving { file_name: String },
    Downloading(DownloadState),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Browsing => "Browsing",
            Self::AddingEntry(_) => "AddingEntry",
            Self::EditingEntry { .. } => "EditingEntry",
            Self::Saving { .. } => "Saving",
            Self::Downloading(_) => "Downloading",
        }
    }

    /// Editor shown above the list, if any
    pub fn editor(&self) -> Option<&EntryEditor> {
        match self {
            Self::AddingEntry(editor) | Self::EditingEntry { editor, .. } => Some(editor),
            _ => None,
        }
    }
}
