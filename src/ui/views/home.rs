use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  ╔╦╗┬┬  ┬┬╔╦╗┌─┐┌┬┐┌─┐",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "   ║║│└┐┌┘│║║║├─┤ │ ├┤ ",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "  ═╩╝┴ └┘ ┴╩ ╩┴ ┴ ┴ └─┘",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Split group expenses without the spreadsheet.",
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Track who paid, who owes, and settle up with the",
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            "  fewest possible transactions.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("[l]", styles::help_key_style()),
            Span::styled(" Sign in    ", styles::help_desc_style()),
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(" Create account    ", styles::help_desc_style()),
            Span::styled("[?]", styles::help_key_style()),
            Span::styled(" Help    ", styles::help_desc_style()),
            Span::styled("[q]", styles::help_key_style()),
            Span::styled(" Quit", styles::help_desc_style()),
        ]),
    ];

    if let Some(email) = app.config.last_email.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Last signed in as {}", email),
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::NONE);

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
