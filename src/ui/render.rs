use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, AuthFocus, AuthMode, ExpenseFocus, GroupFocus, Screen};
use crate::utils::{format_amount, truncate_string};

use super::styles;
use super::views::{dashboard, home, summary};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::Authenticating => render_auth_overlay(frame, app),
        AppState::CreatingGroup => render_create_group_overlay(frame, app),
        AppState::AddingExpense => render_add_expense_overlay(frame, app),
        AppState::AddingMember => render_add_member_overlay(frame, app),
        AppState::RemovingMember => render_remove_member_overlay(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

/// The screen that may actually be shown this frame.
///
/// Gated screens never render for an unauthenticated session, whatever
/// navigation state says; such frames fall back to the home screen. The
/// event loop additionally opens the login form for that case, so the
/// fallback is normally only visible behind the auth overlay.
fn effective_screen(app: &App) -> Screen {
    if app.screen.requires_auth() && !app.session.is_authenticated() {
        Screen::Home
    } else {
        app.screen
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  DiviMate";
    let right = match app.session.user() {
        Some(user) if !user.email.is_empty() => format!("{}  [?] Help", user.email),
        Some(_) => "[?] Help".to_string(),
        None => "Not signed in  [?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len())
                .saturating_sub(right.len() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // No session decision yet: show a neutral frame rather than flashing
    // either the home screen or gated content.
    if app.session.is_loading() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("  Loading session...", styles::muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines), area);
        return;
    }

    match effective_screen(app) {
        Screen::Home => home::render(frame, app, area),
        Screen::Dashboard => dashboard::render(frame, app, area),
        Screen::GroupSummary => summary::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.refreshing {
        " Refreshing... ".to_string()
    } else {
        " Ready ".to_string()
    };

    let shortcuts = match effective_screen(app) {
        Screen::Home => "[l]ogin | [r]egister | [q]uit",
        Screen::Dashboard => "[n]ew group | [e]nter | [u]pdate | [o]ut | [q]uit",
        Screen::GroupSummary => "[e]xpense | [a]dd | [r]emove | [Esc] back | [q]uit",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Overlays
// ============================================================================

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<10}[", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), value_style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("           ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let base_height = match app.auth_mode {
        AuthMode::Login => 12,
        AuthMode::Register => 14,
    };
    let height = if app.auth_error.is_some() {
        base_height + 2
    } else {
        base_height
    };
    let area = centered_rect_fixed(46, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];

    // Mode row
    let mode_focused = app.auth_focus == AuthFocus::Mode;
    let (login_style, register_style) = match app.auth_mode {
        AuthMode::Login => (styles::title_style(), styles::muted_style()),
        AuthMode::Register => (styles::muted_style(), styles::title_style()),
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            if mode_focused { "▶ " } else { "  " },
            styles::highlight_style(),
        ),
        Span::styled("Sign In", login_style),
        Span::styled("  /  ", styles::muted_style()),
        Span::styled("Create Account", register_style),
    ]));
    lines.push(Line::from(""));

    if app.auth_mode == AuthMode::Register {
        lines.push(field_line(
            "Name:",
            &app.auth_name,
            app.auth_focus == AuthFocus::Name,
        ));
    }
    lines.push(field_line(
        "Email:",
        &app.auth_email,
        app.auth_focus == AuthFocus::Email,
    ));
    let password_masked = "*".repeat(app.auth_password.chars().count().min(24));
    lines.push(field_line(
        "Password:",
        &password_masked,
        app.auth_focus == AuthFocus::Password,
    ));
    if app.auth_mode == AuthMode::Register {
        let confirm_masked = "*".repeat(app.auth_confirm.chars().count().min(24));
        lines.push(field_line(
            "Confirm:",
            &confirm_masked,
            app.auth_focus == AuthFocus::Confirm,
        ));
    }

    lines.push(Line::from(""));
    let button_label = if app.auth_in_flight {
        "Working..."
    } else {
        app.auth_mode.title()
    };
    lines.push(button_line(button_label, app.auth_focus == AuthFocus::Submit));

    if let Some(ref error) = app.auth_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field   Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(format!(" {} ", app.auth_mode.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_create_group_overlay(frame: &mut Frame, app: &App) {
    let list_height = app.users.len().min(8) as u16;
    let area = centered_rect_fixed(50, 11 + list_height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];
    lines.push(field_line(
        "Name:",
        &app.group_name_input,
        app.group_focus == GroupFocus::Name,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Members:",
        if app.group_focus == GroupFocus::Members {
            styles::highlight_style()
        } else {
            styles::muted_style()
        },
    )));

    let own_id = app.session.user().map(|u| u.id);
    for (i, user) in app.users.iter().enumerate().take(8) {
        let at_cursor = app.group_focus == GroupFocus::Members && i == app.member_cursor;
        let selected = app.member_selected.contains(&user.id);
        let checkbox = if selected { "[x]" } else { "[ ]" };
        let marker = if at_cursor { "▶ " } else { "  " };
        let label = if Some(user.id) == own_id {
            format!("{} (you)", user.name)
        } else {
            user.display_label()
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(marker.to_string(), styles::highlight_style()),
            Span::styled(checkbox.to_string(), styles::help_key_style()),
            Span::styled(
                format!(" {}", truncate_string(&label, 38)),
                if at_cursor {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]));
    }

    if let Some(ref error) = app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: field  Space: toggle  Enter: create  Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" New Group ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_add_expense_overlay(frame: &mut Frame, app: &App) {
    let payer_count = app
        .selected_summary()
        .map(|s| s.members.len().min(6))
        .unwrap_or(0) as u16;
    let area = centered_rect_fixed(50, 11 + payer_count, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];
    lines.push(field_line(
        "What for:",
        &app.expense_description,
        app.expense_focus == ExpenseFocus::Description,
    ));
    lines.push(field_line(
        "Amount:",
        &app.expense_amount,
        app.expense_focus == ExpenseFocus::Amount,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Paid by:",
        if app.expense_focus == ExpenseFocus::Payer {
            styles::highlight_style()
        } else {
            styles::muted_style()
        },
    )));

    if let Some(summary) = app.selected_summary() {
        for (i, member) in summary.members.iter().enumerate().take(6) {
            let at_cursor = app.expense_focus == ExpenseFocus::Payer && i == app.payer_cursor;
            let chosen = i == app.payer_cursor;
            let marker = if at_cursor { "▶ " } else { "  " };
            let radio = if chosen { "(•)" } else { "( )" };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(marker.to_string(), styles::highlight_style()),
                Span::styled(radio.to_string(), styles::help_key_style()),
                Span::styled(
                    format!(" {}", truncate_string(&member.name, 36)),
                    if at_cursor {
                        styles::selected_style()
                    } else {
                        styles::list_item_style()
                    },
                ),
            ]));
        }
    }

    if let Some(ref error) = app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: field  Enter: add  Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Add Expense ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_add_member_overlay(frame: &mut Frame, app: &App) {
    let candidates = app.addable_users();
    let list_height = candidates.len().min(10).max(1) as u16;
    let area = centered_rect_fixed(50, 6 + list_height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];
    if candidates.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Everyone is already in this group.",
            styles::muted_style(),
        )));
    }
    for (i, user) in candidates.iter().enumerate().take(10) {
        let at_cursor = i == app.member_cursor;
        let marker = if at_cursor { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(marker.to_string(), styles::highlight_style()),
            Span::styled(
                truncate_string(&user.display_label(), 40),
                if at_cursor {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]));
    }

    if let Some(ref error) = app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: add  Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Add Member ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_remove_member_overlay(frame: &mut Frame, app: &App) {
    let members = app
        .selected_summary()
        .map(|s| s.members.as_slice())
        .unwrap_or_default();
    let list_height = members.len().min(10).max(1) as u16;
    let area = centered_rect_fixed(50, 6 + list_height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];
    for (i, member) in members.iter().enumerate().take(10) {
        let at_cursor = i == app.member_cursor;
        let marker = if at_cursor { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(marker.to_string(), styles::highlight_style()),
            Span::styled(
                format!(
                    "{:<24}{}",
                    truncate_string(&member.name, 24),
                    format_amount(member.balance.abs())
                ),
                if at_cursor {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]));
    }

    if let Some(ref error) = app.form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter: remove  Esc: cancel",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Remove Member ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            "      ╔╦╗┬┬  ┬┬╔╦╗┌─┐┌┬┐┌─┐",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "       ║║│└┐┌┘│║║║├─┤ │ ├┤ ",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "      ═╩╝┴ └┘ ┴╩ ╩┴ ┴ ┴ └─┘",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Dashboard", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓      ", styles::help_key_style()),
            Span::styled("Navigate groups", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter    ", styles::help_key_style()),
            Span::styled("Open group balance sheet", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  n        ", styles::help_key_style()),
            Span::styled("New group", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  u        ", styles::help_key_style()),
            Span::styled("Refresh from server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  o        ", styles::help_key_style()),
            Span::styled("Sign out", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Group", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  e        ", styles::help_key_style()),
            Span::styled("Add expense", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  a / r    ", styles::help_key_style()),
            Span::styled("Add / remove member", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Esc      ", styles::help_key_style()),
            Span::styled("Back to dashboard", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" DiviMate ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
