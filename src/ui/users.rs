use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::{AppState, InputMode};
use crate::model::UserField;

/// One bordered input per column, in column order. The focused one is
/// highlighted, and shows a cursor while being edited.
pub fn render_filter_inputs(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (field, rect) in UserField::ALL.into_iter().zip(cols.iter()) {
        let focused = field == app.filter_focus;
        let editing = focused && app.input_mode == InputMode::EditFilter;
        let mut value = app.filters.get(field).to_string();
        if editing {
            value.push('▏');
        }
        let border = if focused { app.theme.input_active } else { app.theme.border };
        let p = Paragraph::new(value)
            .style(Style::default().fg(app.theme.text))
            .block(
                Block::default()
                    .title(format!("Filter by {}", field.label()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
        f.render_widget(p, *rect);
    }
}

/// Paged table of the visible set with the sort arrow on the sorted column.
pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.users.len());
    let slice = &app.users[start.min(end)..end];

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let absolute_index = start + i;
        let style = if absolute_index == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else if absolute_index % 2 == 1 {
            Style::default().fg(app.theme.text).bg(app.theme.stripe_bg)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(u.columns().map(|v| Cell::from(v.to_string()))).style(style)
    });

    let header = Row::new(UserField::ALL.map(|field| {
        let label = match app.sort.field {
            Some(sorted) if sorted == field => {
                format!("{} {}", field.label(), app.sort.direction.arrow())
            }
            _ => field.label().to_string(),
        };
        Cell::from(label)
    }))
    .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Percentage(25),
        Constraint::Percentage(18),
        Constraint::Percentage(32),
        Constraint::Percentage(25),
    ];

    let title = if app.users.len() == app.users_all.len() {
        format!("Users ({})", app.users.len())
    } else {
        format!("Users ({} of {})", app.users.len(), app.users_all.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}
