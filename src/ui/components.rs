//! Shared UI components (status bar, loading and error views, modals).
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::Keymap;
use crate::app::{AppState, InputMode, ModalState};

/// Render the bottom status bar with mode, fetch status, counts and sort.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::EditFilter => "FILTER",
        InputMode::Modal => "MODAL",
    };
    let sort = match app.sort.field {
        Some(field) => format!("  sort:{} {}", field, app.sort.direction),
        None => String::new(),
    };
    let filtered = if app.filters.is_empty() { "" } else { "  filtered" };
    let msg = format!(
        "mode: {mode}  fetch: {}  users:{}/{}{sort}{filtered}  export: {}",
        app.fetch_status.label(),
        app.users.len(),
        app.users_all.len(),
        app.settings.export_dir.display(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Shown in place of table and inputs while the fetch is running.
pub fn render_loading(f: &mut Frame, area: Rect, app: &AppState) {
    let p = Paragraph::new(format!("Loading users from {} ...", app.settings.endpoint))
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.muted))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// Shown in place of table and inputs after a failed fetch.
pub fn render_error_alert(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "Something seriously bad happened!",
            Style::default()
                .fg(app.theme.error_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(app.theme.error_fg))),
        Line::from(""),
        Line::from(Span::styled("Press r to retry.", Style::default().fg(app.theme.muted))),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Error")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error_fg)),
        );
    f.render_widget(p, area);
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { title, message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let width = 60u16.min(max_w);
        let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
        let height = (approx_lines + 4).min(area.height.saturating_sub(4).max(5)).max(5);
        let rect = centered_rect(width, height, area);
        let p = Paragraph::new(message.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title.clone())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal listing every bound action and its keys.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 24u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    let label_w = help_entries(&app.keymap)
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0);
    for (label, keys) in help_entries(&app.keymap) {
        let keys = keys.into_iter().collect::<Vec<_>>().join(", ");
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<label_w$}"), Style::default().fg(app.theme.text)),
            Span::styled(" │ ", Style::default().fg(app.theme.muted)),
            Span::styled(keys, Style::default().fg(app.theme.highlight_fg)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "While editing a filter: type to filter, Backspace deletes, Ctrl+u clears, Tab/Shift+Tab switch field, Enter/Esc finish.",
        Style::default().fg(app.theme.muted),
    )));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Action description -> sorted set of key specs, skipping ignored keys.
pub fn help_entries(keymap: &Keymap) -> BTreeMap<String, BTreeSet<String>> {
    let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in keymap.all_bindings() {
        if action == crate::app::keymap::KeyAction::Ignore {
            continue;
        }
        let key = match code {
            crossterm::event::KeyCode::BackTab => "Shift+Tab".to_string(),
            _ => Keymap::format_key(mods, code),
        };
        entries.entry(action.describe()).or_default().insert(key);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 20, 10);
        let r = centered_rect(30, 4, area);
        assert_eq!(r.width, 20);
        assert_eq!(r.y, 3);
    }

    #[test]
    fn help_groups_keys_by_action() {
        let entries = help_entries(&Keymap::default());
        let down = entries.get("Move down").unwrap();
        assert!(down.contains("j") && down.contains("Down"));
        assert!(entries.get("Previous filter").unwrap().contains("Shift+Tab"));
        assert!(!entries.contains_key("Ignore"));
    }
}
