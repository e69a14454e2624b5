use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::GroupSummary;
use crate::ui::styles;
use crate::utils::{format_amount, format_signed_amount, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.selected_summary() else {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Loading group summary...",
                styles::muted_style(),
            )),
        ];
        let block = Block::default()
            .title(" Group ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header figures
            Constraint::Min(4),    // Members
            Constraint::Length(8), // Settlement plan
        ])
        .split(area);

    render_header(frame, summary, chunks[0]);
    render_members(frame, app, summary, chunks[1]);
    render_transactions(frame, summary, chunks[2]);
}

fn render_header(frame: &mut Frame, summary: &GroupSummary, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled("  Total spent: ", styles::muted_style()),
            Span::styled(
                format_amount(summary.total_expense),
                styles::highlight_style(),
            ),
            Span::styled("    Split per head: ", styles::muted_style()),
            Span::styled(
                format_amount(summary.split_per_head),
                styles::highlight_style(),
            ),
        ]),
        Line::from(Span::styled(
            format!("  {} members", summary.members.len()),
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", truncate_string(&summary.group, 40)))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_members(frame: &mut Frame, app: &App, summary: &GroupSummary, area: Rect) {
    let own_id = app.session.user().map(|u| u.id);

    let mut lines = vec![Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<20}", "Member"), styles::muted_style()),
        Span::styled(format!("{:>12}", "Paid"), styles::muted_style()),
        Span::styled(format!("{:>12}", "Owes"), styles::muted_style()),
        Span::styled(format!("{:>12}", "Balance"), styles::muted_style()),
    ])];

    for member in &summary.members {
        let balance_style = if member.owes_group() {
            styles::debt_style()
        } else {
            styles::credit_style()
        };
        let name = if Some(member.id) == own_id {
            format!("{} (you)", member.name)
        } else {
            member.name.clone()
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{:<20}", truncate_string(&name, 20)),
                styles::list_item_style(),
            ),
            Span::styled(
                format!("{:>12}", format_amount(member.paid)),
                styles::list_item_style(),
            ),
            Span::styled(
                format!("{:>12}", format_amount(member.owes)),
                styles::list_item_style(),
            ),
            Span::styled(
                format!("{:>12}", format_signed_amount(member.balance)),
                balance_style,
            ),
        ]));
    }

    let block = Block::default()
        .title(" Balances ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_transactions(frame: &mut Frame, summary: &GroupSummary, area: Rect) {
    let mut lines = vec![];
    if summary.transactions.is_empty() {
        lines.push(Line::from(Span::styled(
            "  All settled up.",
            styles::success_style(),
        )));
    }
    for tx in &summary.transactions {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(tx.from.clone(), styles::debt_style()),
            Span::styled(" pays ", styles::muted_style()),
            Span::styled(format_amount(tx.amount), styles::highlight_style()),
            Span::styled(" to ", styles::muted_style()),
            Span::styled(tx.to.clone(), styles::credit_style()),
        ]));
    }

    let block = Block::default()
        .title(" Settle Up ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
