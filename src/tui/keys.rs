use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Intent;

/// What a key press asks the browser to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    Navigate(Intent),
    OpenGoToPrompt,
    SelectUp,
    SelectDown,
    SelectNext,
    SelectPrevious,
}

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub keys: Vec<(KeyCode, KeyModifiers)>,
    pub action: Action,
    pub description: String,
}

impl KeyBinding {
    pub fn new(keys: &[(KeyCode, KeyModifiers)], action: Action, description: &str) -> Self {
        Self {
            keys: keys.to_vec(),
            action,
            description: description.to_string(),
        }
    }

    /// Shift is ignored for character keys, since `?` arrives shifted on most layouts
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let mut modifiers = event.modifiers;
        if matches!(event.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        self.keys
            .iter()
            .any(|(code, mods)| *code == event.code && *mods == modifiers)
    }

    /// Human readable key list, e.g. `→/l/n`
    pub fn keys_label(&self) -> String {
        self.keys
            .iter()
            .map(|(code, mods)| key_label(*code, *mods))
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn key_label(code: KeyCode, modifiers: KeyModifiers) -> String {
    let key = match code {
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{:?}", other),
    };
    if modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{}", key)
    } else {
        key
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        const NONE: KeyModifiers = KeyModifiers::NONE;
        Self {
            bindings: vec![
                KeyBinding::new(
                    &[(KeyCode::Right, NONE), (KeyCode::Char('l'), NONE), (KeyCode::Char('n'), NONE)],
                    Action::Navigate(Intent::Next),
                    "Next page",
                ),
                KeyBinding::new(
                    &[(KeyCode::Left, NONE), (KeyCode::Char('h'), NONE), (KeyCode::Char('p'), NONE)],
                    Action::Navigate(Intent::Previous),
                    "Previous page",
                ),
                KeyBinding::new(&[(KeyCode::Home, NONE)], Action::Navigate(Intent::First), "First page"),
                KeyBinding::new(&[(KeyCode::End, NONE)], Action::Navigate(Intent::Last), "Last page"),
                KeyBinding::new(&[(KeyCode::Char('g'), NONE)], Action::OpenGoToPrompt, "Go to page"),
                KeyBinding::new(&[(KeyCode::Char('r'), NONE)], Action::Navigate(Intent::Reload), "Reload page"),
                KeyBinding::new(
                    &[(KeyCode::Up, NONE), (KeyCode::Char('k'), NONE)],
                    Action::SelectUp,
                    "Select product above",
                ),
                KeyBinding::new(
                    &[(KeyCode::Down, NONE), (KeyCode::Char('j'), NONE)],
                    Action::SelectDown,
                    "Select product below",
                ),
                KeyBinding::new(&[(KeyCode::Tab, NONE)], Action::SelectNext, "Select next product"),
                KeyBinding::new(
                    &[(KeyCode::BackTab, KeyModifiers::SHIFT), (KeyCode::BackTab, NONE)],
                    Action::SelectPrevious,
                    "Select previous product",
                ),
                KeyBinding::new(&[(KeyCode::Char('?'), NONE)], Action::ToggleHelp, "Show/hide help"),
                KeyBinding::new(
                    &[(KeyCode::Char('q'), NONE), (KeyCode::Char('c'), KeyModifiers::CONTROL)],
                    Action::Quit,
                    "Quit application",
                ),
            ],
        }
    }
}

impl KeyMap {
    /// Action bound to `event`, if any
    pub fn action(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .find(|binding| binding.matches(event))
            .map(|binding| binding.action)
    }

    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.action(event) == Some(Action::Quit)
    }

    #[cfg(test)]
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        let width = self
            .bindings
            .iter()
            .map(|b| b.keys_label().chars().count())
            .max()
            .unwrap_or(0);

        self.bindings
            .iter()
            .map(|b| format!("{:<width$}  {}", b.keys_label(), b.description, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
