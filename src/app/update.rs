//! Event loop and state update functions.
//!
//! Key events are turned into [`KeyAction`]s (normal mode) or filter edits
//! (edit mode) and applied to [`AppState`]. Anything that needs the async
//! runtime is reported back as an [`Outcome`] so the update functions stay
//! synchronous and testable.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};
use crate::error::FetchError;
use crate::export::{self, ExportFormat};
use crate::model::UserRecord;
use crate::remote::{FetchHandle, FetchStatus, UsersClient};
use crate::search::apply_filters_and_search;
use crate::ui;

/// What the loop must do after a key was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// Start a fresh fetch, replacing any in flight.
    Reload,
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    runtime: &Handle,
    app: &mut AppState,
) -> Result<()> {
    start_fetch(app, runtime);

    loop {
        poll_fetch(app);

        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(app, key) {
                    Outcome::Continue => {}
                    Outcome::Quit => break,
                    Outcome::Reload => start_fetch(app, runtime),
                }
            }
        }
    }

    // leaving the view: abandon any fetch still in flight
    if let Some(pending) = app.pending_fetch.take() {
        pending.cancel();
    }
    info!(uptime_ms = app.started_at.elapsed().as_millis() as u64, "leaving event loop");
    Ok(())
}

/// Kick off a fetch for the configured endpoint. A fetch already in
/// flight is cancelled by dropping its handle.
pub fn start_fetch(app: &mut AppState, runtime: &Handle) {
    match UsersClient::new(app.settings.endpoint.clone(), app.settings.timeout()) {
        Ok(client) => {
            info!(url = %client.url(), "starting user fetch");
            app.fetch_status = FetchStatus::Loading;
            app.pending_fetch = Some(FetchHandle::spawn(client, runtime));
        }
        Err(e) => {
            app.pending_fetch = None;
            apply_fetch_result(app, Err(e));
        }
    }
}

/// Collect a finished fetch, if any.
pub fn poll_fetch(app: &mut AppState) {
    let Some(pending) = app.pending_fetch.as_mut() else {
        return;
    };
    if let Some(result) = pending.try_take() {
        app.pending_fetch = None;
        apply_fetch_result(app, result);
    }
}

/// Move the status machine to `Succeeded` or `Failed` and, on success,
/// replace the record list wholesale.
pub fn apply_fetch_result(app: &mut AppState, result: std::result::Result<Vec<UserRecord>, FetchError>) {
    match result {
        Ok(users) => {
            debug!(count = users.len(), "applying fetched users");
            app.users_all = users;
            app.selected_user_index = 0;
            app.fetch_status = FetchStatus::Succeeded;
            apply_filters_and_search(app);
        }
        Err(e) => {
            warn!(error = %e, "user fetch failed");
            app.fetch_status = FetchStatus::Failed {
                message: Some(e.to_string()),
            };
            if app.input_mode == InputMode::EditFilter {
                app.input_mode = InputMode::Normal;
            }
        }
    }
}

/// Route one key press according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Outcome {
    match app.input_mode {
        InputMode::Modal => {
            handle_modal_key(app, key.code);
            Outcome::Continue
        }
        InputMode::EditFilter => {
            handle_filter_key(app, key);
            Outcome::Continue
        }
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, action),
            None => Outcome::Continue,
        },
    }
}

/// Apply a normal-mode action.
pub fn handle_action(app: &mut AppState, action: KeyAction) -> Outcome {
    match action {
        KeyAction::Quit => return Outcome::Quit,
        KeyAction::Reload => return Outcome::Reload,
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::Ignore => {}
        // everything below works on the table, which only exists after a successful fetch
        _ if !app.shows_table() => {}
        KeyAction::EditFilters => app.input_mode = InputMode::EditFilter,
        KeyAction::NextFilter => app.filter_focus = app.filter_focus.next(),
        KeyAction::PrevFilter => app.filter_focus = app.filter_focus.prev(),
        KeyAction::ClearFilters => {
            app.filters.clear();
            apply_filters_and_search(app);
        }
        KeyAction::SortBy(field) => {
            app.sort.toggle(field);
            debug!(field = %field, direction = %app.sort.direction, "sort changed");
            apply_filters_and_search(app);
        }
        KeyAction::ClearSort => {
            app.sort.clear();
            apply_filters_and_search(app);
        }
        KeyAction::ExportCsv => export_visible(app, ExportFormat::Csv),
        KeyAction::ExportPdf => export_visible(app, ExportFormat::Pdf),
        KeyAction::MoveUp => {
            app.selected_user_index = app.selected_user_index.saturating_sub(1);
        }
        KeyAction::MoveDown => {
            if app.selected_user_index + 1 < app.users.len() {
                app.selected_user_index += 1;
            }
        }
        KeyAction::PageUp => {
            let rpp = app.rows_per_page.max(1);
            app.selected_user_index = app.selected_user_index.saturating_sub(rpp);
        }
        KeyAction::PageDown => {
            let rpp = app.rows_per_page.max(1);
            let new_idx = app.selected_user_index.saturating_add(rpp);
            app.selected_user_index = new_idx.min(app.users.len().saturating_sub(1));
        }
    }
    Outcome::Continue
}

fn handle_filter_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => app.filter_focus = app.filter_focus.next(),
        KeyCode::BackTab => app.filter_focus = app.filter_focus.prev(),
        KeyCode::Backspace => {
            app.filters.get_mut(app.filter_focus).pop();
            apply_filters_and_search(app);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.filters.get_mut(app.filter_focus).clear();
            apply_filters_and_search(app);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.filters.get_mut(app.filter_focus).push(c);
            apply_filters_and_search(app);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => close_modal(app),
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                close_modal(app);
            }
        }
        None => app.input_mode = InputMode::Normal,
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

/// Export what the table shows right now and report the result in a dialog.
fn export_visible(app: &mut AppState, format: ExportFormat) {
    let rows = app.users.len();
    let modal = match export::export_visible(format, &app.users, &app.settings.export_dir) {
        Ok(path) => ModalState::Info {
            title: "Export".into(),
            message: format!("Saved {rows} row(s) to {}", path.display()),
        },
        Err(e) => {
            warn!(format = format.extension(), error = %e, "export failed");
            ModalState::Info {
                title: "Export failed".into(),
                message: e.to_string(),
            }
        }
    };
    open_modal(app, modal);
}
