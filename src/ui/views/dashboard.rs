use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_amount, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats cards
            Constraint::Min(5),    // Group list
        ])
        .split(area);

    render_stats(frame, app, chunks[0]);
    render_groups(frame, app, chunks[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    render_stat_card(
        frame,
        cards[0],
        " Groups ",
        &app.stats.total_groups.to_string(),
        styles::highlight_style(),
    );
    render_stat_card(
        frame,
        cards[1],
        " Total Expenses ",
        &format_amount(app.stats.total_expenses),
        styles::highlight_style(),
    );
    let owed_style = if app.stats.total_owed > 0.0 {
        styles::debt_style()
    } else {
        styles::success_style()
    };
    render_stat_card(
        frame,
        cards[2],
        " You Owe ",
        &format_amount(app.stats.total_owed),
        owed_style,
    );
}

fn render_stat_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    value_style: ratatui::style::Style,
) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", value), value_style)),
    ];

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_groups(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if app.groups.is_empty() {
        let message = if app.refreshing {
            "Loading groups..."
        } else {
            "No groups yet. Press [n] to create one."
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", message),
            styles::muted_style(),
        )));
    }

    for (i, group) in app.groups.iter().enumerate() {
        let selected = i == app.group_selection;
        let marker = if selected { "▶ " } else { "  " };

        let detail = match app.summaries.get(&group.id) {
            Some(summary) => format!(
                "{} members, {} total",
                summary.members.len(),
                format_amount(summary.total_expense)
            ),
            None => String::new(),
        };

        let name_style = if selected {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<24}", truncate_string(&group.name, 24)), name_style),
            Span::styled(format!("  {}", detail), styles::muted_style()),
        ]));
    }

    let title = match app.session.user() {
        Some(user) if !user.name.is_empty() => format!(" {}'s Groups ", user.name),
        _ => " Groups ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
