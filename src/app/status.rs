//! Single-line status surface
//!
//! Mode prompts and download events share one line. Which of them owns the
//! line is decided only by the active mode; a held message (save result,
//! batch summary) is shown while browsing until it expires.

use std::time::{Duration, Instant};

use super::mode::Mode;

#[derive(Debug, Default)]
pub struct StatusPresenter {
    line: String,
    held: Option<(String, Instant)>,
}

impl StatusPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `text` on the line for `duration` while browsing
    pub fn hold(&mut self, text: impl Into<String>, duration: Duration) {
        self.held = Some((text.into(), Instant::now() + duration));
    }

    pub fn refresh(&mut self, mode: &Mode) {
        self.refresh_at(mode, Instant::now());
    }

    /// Recompute the line for `mode` as of `now`
    pub fn refresh_at(&mut self, mode: &Mode, now: Instant) {
        if !matches!(mode, Mode::Browsing) {
            self.held = None;
        }
        if let Some((_, until)) = &self.held
            && now >= *until
        {
            self.held = None;
        }

        self.line = match mode {
            Mode::Browsing => self
                .held
                .as_ref()
                .map(|(text, _)| text.clone())
                .unwrap_or_default(),
            Mode::AddingEntry(_) => "Adding music".to_string(),
            Mode::EditingEntry { index, .. } => format!("Editing music #{}", index + 1),
            Mode::Saving { file_name } => format!("Save as: {}", file_name),
            Mode::Downloading(state) => match &state.last_event {
                Some(event) => event.to_string(),
                None => format!("Preparing {} task(s)", state.items.len()),
            },
        };
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::mode::{DownloadState, EntryEditor};
    use crate::download::DownloadEvent;
    use crate::download::event::ItemInfo;
    use crate::playlist::TrackEntry;
    use std::sync::Arc;

    #[test]
    fn test_prompts_per_mode() {
        let mut status = StatusPresenter::new();

        status.refresh(&Mode::Browsing);
        assert_eq!(status.line(), "");

        status.refresh(&Mode::AddingEntry(EntryEditor::default()));
        assert_eq!(status.line(), "Adding music");

        status.refresh(&Mode::Saving {
            file_name: "ycp.json".to_string(),
        });
        assert_eq!(status.line(), "Save as: ycp.json");
    }

    #[test]
    fn test_downloading_shows_last_event() {
        let items: Arc<[TrackEntry]> = vec![TrackEntry::new("A", "T", "u")].into();
        let mut state = DownloadState::new(items);
        let mut status = StatusPresenter::new();

        status.refresh(&Mode::Downloading(state.clone()));
        assert_eq!(status.line(), "Preparing 1 task(s)");

        state.last_event = Some(DownloadEvent::Started(ItemInfo {
            index: 0,
            total: 1,
            artist: "A".to_string(),
            title: "T".to_string(),
        }));
        status.refresh(&Mode::Downloading(state));
        assert_eq!(status.line(), "task 1/1: starting download A - T");
    }

    #[test]
    fn test_held_message_expires() {
        let mut status = StatusPresenter::new();
        status.hold("Saved", Duration::from_secs(3));

        status.refresh(&Mode::Browsing);
        assert_eq!(status.line(), "Saved");

        status.refresh_at(&Mode::Browsing, Instant::now() + Duration::from_secs(4));
        assert_eq!(status.line(), "");
    }

    #[test]
    fn test_leaving_browsing_drops_held_message() {
        let mut status = StatusPresenter::new();
        status.hold("Saved", Duration::from_secs(60));

        status.refresh(&Mode::AddingEntry(EntryEditor::default()));
        assert_eq!(status.line(), "Adding music");

        status.refresh(&Mode::Browsing);
        assert_eq!(status.line(), "");
    }
}
