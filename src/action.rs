use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// All user intents the dashboard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,

    /// Switch to the next color scheme and remember it
    SwitchTheme,

    /// Save current configuration
    SaveConfig,

    /// No operation
    Tick,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Self {
        if key.kind != KeyEventKind::Press {
            return Action::Tick;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('t') => Action::SwitchTheme,
            KeyCode::Char('w') => Action::SaveConfig,
            _ => Action::Tick,
        }
    }
}
