//! Terminal front end
//!
//! The view is recomputed from `App` on every frame. Batches run on a
//! separate task and their events are drained into the controller between
//! frames, so progress keeps rendering while input is parked.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

use super::controller::{App, Outcome};
use super::mode::{Command, Field, Mode};
use crate::download::{DownloadEvent, DownloadPipeline};
use crate::utils::ScreenGuard;

const PAGE: isize = 10;

/// Run the interactive curator until the user quits
pub async fn run(app: App, pipeline: DownloadPipeline) -> Result<()> {
    let _screen = ScreenGuard::acquire();

    enable_raw_mode().context("Failed to initialize terminal")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to initialize terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("Failed to initialize terminal");
        }
    };

    let result = run_loop(&mut terminal, app, pipeline).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    pipeline: DownloadPipeline,
) -> Result<()> {
    let mut events_rx: Option<mpsc::Receiver<DownloadEvent>> = None;

    loop {
        // Drain batch events before drawing
        if let Some(rx) = &mut events_rx {
            loop {
                match rx.try_recv() {
                    Ok(event) => app.apply_download_event(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        events_rx = None;
                        break;
                    }
                }
            }
        }

        app.tick();
        terminal.draw(|f| draw_ui(f, &app))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(command) = map_key(app.mode(), key) else {
                continue;
            };

            match app.handle(command) {
                Outcome::Continue => {}
                Outcome::Quit => return Ok(()),
                Outcome::StartDownload(batch) => {
                    let (tx, rx) = mpsc::channel(64);
                    let pipeline = pipeline.clone();
                    tokio::spawn(async move {
                        let summary = pipeline.run(batch, tx).await;
                        debug!("Batch task done: {:?}", summary);
                    });
                    events_rx = Some(rx);
                }
            }
        }
    }
}

/// Translate a key press into a named command for the active mode
pub fn map_key(mode: &Mode, key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match (mode, key.code) {
            (Mode::Browsing, KeyCode::Char('c')) => Some(Command::Quit),
            (Mode::Downloading(_), _) => None,
            (_, KeyCode::Char('c')) => Some(Command::Cancel),
            _ => None,
        };
    }

    match mode {
        Mode::Browsing => match key.code {
            KeyCode::Char('a') => Some(Command::Add),
            KeyCode::Char('e') | KeyCode::Enter => Some(Command::Edit),
            KeyCode::Char('d') | KeyCode::Delete => Some(Command::Remove),
            KeyCode::Char('s') => Some(Command::Save),
            KeyCode::Char('g') => Some(Command::Download),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Command::MoveCursor(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::MoveCursor(1)),
            KeyCode::PageUp => Some(Command::MoveCursor(-PAGE)),
            KeyCode::PageDown => Some(Command::MoveCursor(PAGE)),
            KeyCode::Home => Some(Command::First),
            KeyCode::End => Some(Command::Last),
            _ => None,
        },
        Mode::AddingEntry(_) | Mode::EditingEntry { .. } => match key.code {
            KeyCode::Esc => Some(Command::Cancel),
            KeyCode::Enter => Some(Command::Commit),
            KeyCode::Tab | KeyCode::Down => Some(Command::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Command::PrevField),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Char(c) => Some(Command::Insert(c)),
            _ => None,
        },
        Mode::Saving { .. } => match key.code {
            KeyCode::Esc => Some(Command::Cancel),
            KeyCode::Enter => Some(Command::Commit),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Char(c) => Some(Command::Insert(c)),
            _ => None,
        },
        Mode::Downloading(_) => None,
    }
}

fn draw_ui(f: &mut Frame, app: &App) {
    let pane_height = match app.mode() {
        Mode::AddingEntry(_) | Mode::EditingEntry { .. } => 5,
        Mode::Saving { .. } | Mode::Downloading(_) => 3,
        Mode::Browsing => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),           // Header
            Constraint::Length(pane_height), // Editor / filename / gauge
            Constraint::Min(5),              // List
            Constraint::Length(1),           // Status line
            Constraint::Length(2),           // Footer/help
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.mode() {
        Mode::AddingEntry(_) | Mode::EditingEntry { .. } => draw_editor(f, app, chunks[1]),
        Mode::Saving { file_name } => draw_filename(f, file_name, chunks[1]),
        Mode::Downloading(state) => {
            let ratio = state
                .last_event
                .as_ref()
                .map(DownloadEvent::batch_ratio)
                .unwrap_or(0.0);
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(" Downloading "))
                .gauge_style(Style::default().fg(Color::Green))
                .ratio(ratio)
                .label(format!(
                    "{}/{}",
                    (state.current_index + 1).min(state.items.len()),
                    state.items.len()
                ));
            f.render_widget(gauge, chunks[1]);
        }
        Mode::Browsing => {}
    }

    draw_list(f, app, chunks[2]);

    let status_style = match app.mode() {
        Mode::Downloading(_) => Style::default().fg(Color::Yellow),
        Mode::Browsing => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::Cyan),
    };
    f.render_widget(
        Paragraph::new(app.status_line().to_string()).style(status_style),
        chunks[3],
    );

    let help = match app.mode() {
        Mode::Browsing => {
            "a: add  e/Enter: edit  d: remove  s: save  g: download  j/k: move  q: quit"
        }
        Mode::AddingEntry(_) | Mode::EditingEntry { .. } => {
            "Tab: next field  Shift-Tab: previous  Enter: ok  Esc: cancel"
        }
        Mode::Saving { .. } => "Enter: save  Esc: cancel",
        Mode::Downloading(_) => "Downloading... input resumes when the batch finishes",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, chunks[4]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "{} ({} tracks)",
        app.playlist_path().display(),
        app.playlist().len()
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.mode().editor() else {
        return;
    };
    let title = match app.mode() {
        Mode::EditingEntry { .. } => " Edit music ",
        _ => " Add music ",
    };

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|&field| {
            let focused = editor.focus == field;
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<8}", field.label()), label_style),
                Span::raw(editor.value(field).to_string()),
                Span::styled(cursor, Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();

    let pane = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(pane, area);
}

fn draw_filename(f: &mut Frame, file_name: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled("Save as: ", Style::default().fg(Color::Yellow)),
        Span::raw(file_name.to_string()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    let pane = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(pane, area);
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let playlist = app.playlist();

    if playlist.is_empty() {
        let empty = Paragraph::new("Playlist is empty - press 'a' to add music")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["artist", "title", "link"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = playlist
        .entries()
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.artist.clone()),
                Cell::from(entry.title.clone()),
                Cell::from(entry.link.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(32),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(playlist.cursor());
    f.render_stateful_widget(table, area, &mut state);
}
