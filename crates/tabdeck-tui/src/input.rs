use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    OpenSelected,
    StartFilter,
    ClearFilter,
    RefreshFavicons,
    ToggleHelp,
    ExitMode,
    InputChar(char),
    Backspace,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    match app.mode {
        Mode::Filter => return handle_filter_mode(key),
        // Any key closes help
        Mode::Help => return Action::ToggleHelp,
        Mode::Normal => {}
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Selection within the grid
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => Action::MoveLeft,
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => Action::MoveRight,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::MoveDown,

        // Pages
        (KeyCode::PageDown, _) | (KeyCode::Char(']'), KeyModifiers::NONE) => Action::NextPage,
        (KeyCode::PageUp, _) | (KeyCode::Char('['), KeyModifiers::NONE) => Action::PrevPage,
        (KeyCode::Home, _) | (KeyCode::Char('g'), KeyModifiers::NONE) => Action::FirstPage,
        (KeyCode::End, _) | (KeyCode::Char('G'), KeyModifiers::SHIFT) => Action::LastPage,

        (KeyCode::Enter, _) => Action::OpenSelected,
        (KeyCode::Char('/'), KeyModifiers::NONE) => Action::StartFilter,
        (KeyCode::Esc, _) => Action::ClearFilter,
        (KeyCode::Char('R'), KeyModifiers::SHIFT) => Action::RefreshFavicons,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,

        _ => Action::None,
    }
}

/// Handle keys while typing a filter query
fn handle_filter_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::ClearFilter,
        KeyCode::Enter => Action::ExitMode,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char(c) => Action::InputChar(c),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_filter_mode_captures_text() {
        assert_eq!(
            handle_filter_mode(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Action::InputChar('q')
        );
        assert_eq!(
            handle_filter_mode(key(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Action::InputChar('R')
        );
        assert_eq!(
            handle_filter_mode(key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::ExitMode
        );
        assert_eq!(
            handle_filter_mode(key(KeyCode::Esc, KeyModifiers::NONE)),
            Action::ClearFilter
        );
    }
}
