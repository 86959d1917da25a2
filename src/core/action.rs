//! Actions that key presses and commands resolve to

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::command::Command;
use crate::domain::Route;

/// What the app should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Load a route (raw path strings are parsed by the app)
    Navigate(Route),
    OpenPath(String),
    Back,

    CycleTab { forward: bool },
    SelectTab(String),
    NextPage,
    PrevPage,
    FirstPage,
    SetRange { from: Option<u64>, to: Option<u64> },
    FilterItem(Option<u64>),
    SelectRow { down: bool },
    OpenSelected,

    Refresh,
    Copy,
    Export,
    Verify,

    /// Open command line
    OpenCommand,
    ToggleHelp,

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

/// Normal-mode key bindings
pub fn action_for_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('q'), _) => Action::Quit,
        (KeyCode::Tab, _) => Action::CycleTab { forward: true },
        (KeyCode::BackTab, _) => Action::CycleTab { forward: false },
        (KeyCode::Char('n'), _) | (KeyCode::Right, _) => Action::NextPage,
        (KeyCode::Char('p'), _) | (KeyCode::Left, _) => Action::PrevPage,
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Action::SelectRow { down: true },
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Action::SelectRow { down: false },
        (KeyCode::Enter, _) => Action::OpenSelected,
        (KeyCode::Char('r'), _) => Action::Refresh,
        (KeyCode::Char('y'), _) => Action::Copy,
        (KeyCode::Char('e'), _) => Action::Export,
        (KeyCode::Char('b'), _) | (KeyCode::Backspace, _) => Action::Back,
        (KeyCode::Char(':'), _) => Action::OpenCommand,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,
        _ => Action::None,
    }
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        if let Some(route) = command.target() {
            return Action::Navigate(route);
        }
        match command {
            Command::Open(path) => Action::OpenPath(path),
            Command::Back => Action::Back,
            Command::Tab(name) => Action::SelectTab(name),
            Command::Next => Action::NextPage,
            Command::Prev => Action::PrevPage,
            Command::First => Action::FirstPage,
            Command::Range { from, to } => Action::SetRange { from, to },
            Command::Item(id) => Action::FilterItem(id),
            Command::Refresh => Action::Refresh,
            Command::Copy => Action::Copy,
            Command::Export => Action::Export,
            Command::Verify => Action::Verify,
            Command::Help => Action::ToggleHelp,
            Command::Quit => Action::Quit,
            Command::Unknown(input) => {
                Action::Notify(format!("Unknown command: {}", input), NotifyLevel::Warn)
            }
            Command::Account(_) | Command::Block(_) | Command::Token(_) | Command::Search(_) => {
                Action::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::parse_command;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            action_for_key(key(KeyCode::BackTab)),
            Action::CycleTab { forward: false }
        );
        assert_eq!(action_for_key(key(KeyCode::Char('n'))), Action::NextPage);
        assert_eq!(action_for_key(key(KeyCode::Backspace)), Action::Back);
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(action_for_key(key(KeyCode::Char('z'))), Action::None);
    }

    #[test]
    fn test_commands_become_actions() {
        assert_eq!(
            Action::from(parse_command("block 7")),
            Action::Navigate(Route::block("7"))
        );
        assert_eq!(
            Action::from(parse_command("tab bridged")),
            Action::SelectTab("bridged".to_string())
        );
        assert!(matches!(
            Action::from(parse_command("what is this")),
            Action::Notify(_, NotifyLevel::Warn)
        ));
    }
}
