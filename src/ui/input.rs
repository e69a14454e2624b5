//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, AuthFocus, AuthMode, ExpenseFocus, GroupFocus, Screen};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Overlay states take the keyboard exclusively
    match app.state {
        AppState::Authenticating => return handle_auth_input(app, key).await,
        AppState::CreatingGroup => return handle_create_group_input(app, key).await,
        AppState::AddingExpense => return handle_add_expense_input(app, key).await,
        AppState::AddingMember => return handle_add_member_input(app, key).await,
        AppState::RemovingMember => return handle_remove_member_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // A new keypress clears any lingering status message
    app.status_message = None;

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        _ => {}
    }

    // Gated screens fall back to home-screen bindings when the session
    // is not authenticated, mirroring what the render pass shows.
    let screen = if app.screen.requires_auth() && !app.session.is_authenticated() {
        Screen::Home
    } else {
        app.screen
    };

    match screen {
        Screen::Home => handle_home_input(app, key),
        Screen::Dashboard => handle_dashboard_input(app, key).await,
        Screen::GroupSummary => handle_summary_input(app, key).await,
    }

    Ok(false)
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') | KeyCode::Enter => app.start_auth(AuthMode::Login),
        KeyCode::Char('r') => app.start_auth(AuthMode::Register),
        _ => {}
    }
}

async fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_group(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_group(),
        KeyCode::Enter => app.open_selected_group(),
        KeyCode::Char('n') => app.start_create_group(),
        KeyCode::Char('u') => app.refresh_dashboard(),
        KeyCode::Char('o') => app.logout().await,
        _ => {}
    }
}

async fn handle_summary_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_group(),
        KeyCode::Char('e') => app.start_add_expense(),
        KeyCode::Char('a') => app.start_add_member(),
        KeyCode::Char('r') => app.start_remove_member(),
        KeyCode::Char('u') => {
            if let Some(group_id) = app.selected_group_id {
                app.refresh_group(group_id);
            }
        }
        KeyCode::Char('o') => app.logout().await,
        _ => {}
    }
}

async fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.cancel_dialog();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.auth_focus = app.auth_focus.next(app.auth_mode);
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.auth_focus = app.auth_focus.prev(app.auth_mode);
        }
        KeyCode::Left | KeyCode::Right => {
            if app.auth_focus == AuthFocus::Mode {
                app.toggle_auth_mode();
            }
        }
        KeyCode::Enter => match app.auth_focus {
            AuthFocus::Mode => app.toggle_auth_mode(),
            AuthFocus::Submit => app.attempt_auth_submit().await,
            _ => app.auth_focus = app.auth_focus.next(app.auth_mode),
        },
        KeyCode::Backspace => match app.auth_focus {
            AuthFocus::Name => {
                app.auth_name.pop();
            }
            AuthFocus::Email => {
                app.auth_email.pop();
            }
            AuthFocus::Password => {
                app.auth_password.pop();
            }
            AuthFocus::Confirm => {
                app.auth_confirm.pop();
            }
            AuthFocus::Mode | AuthFocus::Submit => {}
        },
        KeyCode::Char(' ') if app.auth_focus == AuthFocus::Mode => {
            app.toggle_auth_mode();
        }
        KeyCode::Char(c) => match app.auth_focus {
            AuthFocus::Name => {
                if app.can_add_name_char(c) {
                    app.auth_name.push(c);
                }
            }
            AuthFocus::Email => {
                if app.can_add_email_char(c) {
                    app.auth_email.push(c);
                }
            }
            AuthFocus::Password => {
                if app.can_add_password_char(c) {
                    app.auth_password.push(c);
                }
            }
            AuthFocus::Confirm => {
                if app.can_add_password_char(c) {
                    app.auth_confirm.push(c);
                }
            }
            AuthFocus::Mode | AuthFocus::Submit => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_create_group_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_dialog(),
        KeyCode::Tab | KeyCode::BackTab => {
            app.group_focus = app.group_focus.toggled();
        }
        KeyCode::Enter => app.submit_create_group().await,
        KeyCode::Up => {
            if app.group_focus == GroupFocus::Members && app.member_cursor > 0 {
                app.member_cursor -= 1;
            }
        }
        KeyCode::Down => {
            if app.group_focus == GroupFocus::Members
                && app.member_cursor + 1 < app.users.len()
            {
                app.member_cursor += 1;
            }
        }
        KeyCode::Char(' ') if app.group_focus == GroupFocus::Members => {
            app.toggle_member_at_cursor();
        }
        KeyCode::Backspace => {
            if app.group_focus == GroupFocus::Name {
                app.group_name_input.pop();
            }
        }
        KeyCode::Char(c) => {
            if app.group_focus == GroupFocus::Name && app.can_add_group_name_char(c) {
                app.group_name_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_add_expense_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let member_count = app.selected_summary().map(|s| s.members.len()).unwrap_or(0);

    match key.code {
        KeyCode::Esc => app.cancel_dialog(),
        KeyCode::Tab => app.expense_focus = app.expense_focus.next(),
        KeyCode::BackTab => app.expense_focus = app.expense_focus.prev(),
        KeyCode::Enter => app.submit_add_expense().await,
        KeyCode::Up => {
            if app.expense_focus == ExpenseFocus::Payer && app.payer_cursor > 0 {
                app.payer_cursor -= 1;
            }
        }
        KeyCode::Down => {
            if app.expense_focus == ExpenseFocus::Payer && app.payer_cursor + 1 < member_count {
                app.payer_cursor += 1;
            }
        }
        KeyCode::Backspace => match app.expense_focus {
            ExpenseFocus::Description => {
                app.expense_description.pop();
            }
            ExpenseFocus::Amount => {
                app.expense_amount.pop();
            }
            ExpenseFocus::Payer => {}
        },
        KeyCode::Char(c) => match app.expense_focus {
            ExpenseFocus::Description => {
                if app.can_add_description_char(c) {
                    app.expense_description.push(c);
                }
            }
            ExpenseFocus::Amount => {
                if app.can_add_amount_char(c) {
                    app.expense_amount.push(c);
                }
            }
            ExpenseFocus::Payer => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_add_member_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let candidate_count = app.addable_users().len();

    match key.code {
        KeyCode::Esc => app.cancel_dialog(),
        KeyCode::Up => {
            if app.member_cursor > 0 {
                app.member_cursor -= 1;
            }
        }
        KeyCode::Down => {
            if app.member_cursor + 1 < candidate_count {
                app.member_cursor += 1;
            }
        }
        KeyCode::Enter => app.submit_add_member().await,
        _ => {}
    }
    Ok(false)
}

async fn handle_remove_member_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let member_count = app.selected_summary().map(|s| s.members.len()).unwrap_or(0);

    match key.code {
        KeyCode::Esc => app.cancel_dialog(),
        KeyCode::Up => {
            if app.member_cursor > 0 {
                app.member_cursor -= 1;
            }
        }
        KeyCode::Down => {
            if app.member_cursor + 1 < member_count {
                app.member_cursor += 1;
            }
        }
        KeyCode::Enter => app.submit_remove_member().await,
        _ => {}
    }
    Ok(false)
}
