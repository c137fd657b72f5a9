//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Tab, MAX_FIELD_LENGTH};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Any keypress dismisses a transient status message
    if app.status_message.is_some() && !matches!(app.state, AppState::Searching) {
        app.status_message = None;
    }

    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingClear => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.clear_history();
                    app.state = AppState::Normal;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => return handle_search_input(app, key),
        AppState::EditingPatient => return handle_patient_input(app, key),
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Tab => {
            app.current_tab = app.current_tab.next();
            return Ok(false);
        }
        KeyCode::Char('l') => {
            app.cycle_language();
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Evaluate => handle_evaluate_input(app, key),
        Tab::History => handle_history_input(app, key),
    }
    Ok(false)
}

fn handle_evaluate_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='6') => {
            app.select_score(c as u8 - b'0');
        }
        KeyCode::Down | KeyCode::Char('j') => app.focus_next_field(),
        KeyCode::Up | KeyCode::Char('k') => app.focus_prev_field(),
        KeyCode::Char('s') | KeyCode::Enter => app.save_evaluation(),
        KeyCode::Char('c') => app.clear_form(),
        KeyCode::Char('p') => app.state = AppState::EditingPatient,
        _ => {}
    }
}

fn handle_history_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if app.history_selection + 1 < app.records.len() {
                app.history_selection += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.history_selection = app.history_selection.saturating_sub(1);
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('f') => app.cycle_range_filter(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('x') => app.export_csv(),
        KeyCode::Char('C') => app.state = AppState::ConfirmingClear,
        KeyCode::Enter => app.load_selected_into_form(),
        KeyCode::Esc => {
            app.search_query.clear();
            app.refresh_history();
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.state = AppState::Normal;
            app.refresh_history();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.refresh_history();
        }
        KeyCode::Char(c) => {
            if app.search_query.len() < MAX_FIELD_LENGTH {
                app.search_query.push(c);
                app.refresh_history();
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_patient_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.patient_field = app.patient_field.next();
        }
        KeyCode::Backspace => {
            app.patient_field_value_mut().pop();
        }
        KeyCode::Char(c) => {
            let value = app.patient_field_value_mut();
            if value.len() < MAX_FIELD_LENGTH {
                value.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}
