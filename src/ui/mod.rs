pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState};
use crate::remote::FetchStatus;

/// Heading shown above the table and used as the PDF title.
pub const TITLE: &str = crate::export::PDF_TITLE;

pub fn render(f: &mut Frame, app: &mut AppState) {
    if app.shows_table() {
        let root = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(f.area());
        render_header(f, root[0], app);
        users::render_filter_inputs(f, root[1], app);
        users::render_users_table(f, root[2], app);
        components::render_status_bar(f, root[3], app);
    } else {
        let root = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
            .split(f.area());
        render_header(f, root[0], app);
        match &app.fetch_status {
            FetchStatus::Failed { .. } => {
                let message = app.fetch_status.error_message().unwrap_or("Unknown error");
                components::render_error_alert(f, root[1], app, message);
            }
            FetchStatus::Idle | FetchStatus::Loading | FetchStatus::Succeeded => {
                components::render_loading(f, root[1], app);
            }
        }
        components::render_status_bar(f, root[2], app);
    }

    if let Some(modal) = app.modal.clone() {
        let area = f.area();
        match modal {
            ModalState::Info { .. } => components::render_info_modal(f, area, app, &modal),
            ModalState::Help { scroll } => components::render_help_modal(f, area, app, scroll),
        }
    }
}

fn render_header(f: &mut Frame, area: ratatui::layout::Rect, app: &AppState) {
    let hint = if app.shows_table() {
        "  /: filter  1-4: sort  x: clear  c: csv  p: pdf  r: reload  ?: help  q: quit"
    } else {
        "  r: reload  ?: help  q: quit"
    };
    let p = Paragraph::new(format!("{TITLE}{hint}"))
        .block(
            Block::default()
                .title("usertable")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(
            Style::default()
                .fg(app.theme.header_fg)
                .bg(app.theme.header_bg)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(p, area);
}
