use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::InputMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    SelectFeed,
    OpenInBrowser,
    Reload,
    AddFeed,
    DeleteFeed,
    ConfirmYes,
    ConfirmNo,
    ShowHelp,
    HideHelp,
    // Add-feed form actions
    FormChar(char),
    FormBackspace,
    FormNextField,
    FormConfirm,
    FormCancel,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    match mode {
        // If help is showing, any key closes it
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(AppAction::ConfirmYes),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(AppAction::ConfirmNo),
            _ => None,
        },

        InputMode::Form => match key.code {
            KeyCode::Enter => Some(AppAction::FormConfirm),
            KeyCode::Esc => Some(AppAction::FormCancel),
            KeyCode::Tab | KeyCode::BackTab => Some(AppAction::FormNextField),
            KeyCode::Backspace => Some(AppAction::FormBackspace),
            KeyCode::Char(c) => Some(AppAction::FormChar(c)),
            _ => None,
        },

        InputMode::Normal => match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(AppAction::Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppAction::Quit),

            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(AppAction::MoveDown),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(AppAction::MoveUp),
            (KeyCode::Char('<'), _) | (KeyCode::Home, _) => Some(AppAction::MoveToTop),
            (KeyCode::Char('>'), _) | (KeyCode::End, _) => Some(AppAction::MoveToBottom),

            (KeyCode::Enter, _) => Some(AppAction::SelectFeed),

            (KeyCode::Char('a'), _) => Some(AppAction::AddFeed),
            (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => Some(AppAction::DeleteFeed),
            (KeyCode::Char('o'), _) => Some(AppAction::OpenInBrowser),
            (KeyCode::Char('r'), _) => Some(AppAction::Reload),

            (KeyCode::Char('?'), _) => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}
