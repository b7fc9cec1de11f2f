use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Represents a key binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    pub fn with_ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Maps keys to action names.
///
/// Global bindings apply everywhere; the input and results maps only apply
/// when that pane has focus. Keys with no binding in the input pane are
/// handed to the text input.
pub struct KeyDispatcher {
    global_map: HashMap<KeyBinding, String>,
    input_map: HashMap<KeyBinding, String>,
    results_map: HashMap<KeyBinding, String>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        let mut dispatcher = Self {
            global_map: HashMap::new(),
            input_map: HashMap::new(),
            results_map: HashMap::new(),
        };
        dispatcher.setup_global_bindings();
        dispatcher.setup_input_bindings();
        dispatcher.setup_results_bindings();
        dispatcher
    }

    fn setup_global_bindings(&mut self) {
        self.global_map
            .insert(KeyBinding::with_ctrl(KeyCode::Char('c')), "quit".into());
        self.global_map
            .insert(KeyBinding::with_ctrl(KeyCode::Char('d')), "quit".into());
        self.global_map
            .insert(KeyBinding::new(KeyCode::Esc), "quit".into());
        self.global_map
            .insert(KeyBinding::new(KeyCode::Tab), "toggle_focus".into());
        self.global_map
            .insert(KeyBinding::new(KeyCode::F(1)), "toggle_help".into());
        self.global_map
            .insert(KeyBinding::new(KeyCode::F(5)), "toggle_logs".into());
    }

    fn setup_input_bindings(&mut self) {
        self.input_map
            .insert(KeyBinding::new(KeyCode::Enter), "submit".into());
        self.input_map
            .insert(KeyBinding::new(KeyCode::Down), "focus_results".into());
        self.input_map
            .insert(KeyBinding::with_ctrl(KeyCode::Char('u')), "clear_query".into());
    }

    fn setup_results_bindings(&mut self) {
        self.results_map
            .insert(KeyBinding::new(KeyCode::Up), "previous_result".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Down), "next_result".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('k')), "previous_result".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('j')), "next_result".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('g')), "first_result".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('G')), "last_result".into());
        self.results_map.insert(
            KeyBinding {
                code: KeyCode::Char('G'),
                modifiers: KeyModifiers::SHIFT,
            },
            "last_result".into(),
        );
        self.results_map
            .insert(KeyBinding::new(KeyCode::Enter), "submit".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('i')), "focus_input".into());
        self.results_map
            .insert(KeyBinding::new(KeyCode::Char('/')), "focus_input".into());
    }

    pub fn get_global_action(&self, key: &KeyEvent) -> Option<&str> {
        self.global_map
            .get(&KeyBinding::from_event(key))
            .map(|s| s.as_str())
    }

    pub fn get_input_action(&self, key: &KeyEvent) -> Option<&str> {
        self.input_map
            .get(&KeyBinding::from_event(key))
            .map(|s| s.as_str())
    }

    pub fn get_results_action(&self, key: &KeyEvent) -> Option<&str> {
        self.results_map
            .get(&KeyBinding::from_event(key))
            .map(|s| s.as_str())
    }

    /// (key, description) pairs for the help pane
    pub fn help_entries() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Enter", "Search for the typed description"),
            ("Tab", "Switch between input and results"),
            ("Up/Down, j/k", "Move through results"),
            ("g / G", "First / last result"),
            ("Ctrl+U", "Clear the query"),
            ("F5", "Show or hide the log pane"),
            ("F1", "Show or hide this help"),
            ("Esc, Ctrl+C", "Quit"),
        ]
    }
}

impl Default for KeyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_submits_from_both_panes() {
        let dispatcher = KeyDispatcher::new();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert_eq!(dispatcher.get_input_action(&enter), Some("submit"));
        assert_eq!(dispatcher.get_results_action(&enter), Some("submit"));
    }

    #[test]
    fn test_plain_characters_fall_through_in_input() {
        let dispatcher = KeyDispatcher::new();
        let j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::empty());
        assert_eq!(dispatcher.get_input_action(&j), None);
        assert_eq!(dispatcher.get_global_action(&j), None);
        assert_eq!(dispatcher.get_results_action(&j), Some("next_result"));
    }

    #[test]
    fn test_global_bindings() {
        let dispatcher = KeyDispatcher::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(dispatcher.get_global_action(&ctrl_c), Some("quit"));

        let f5 = KeyEvent::new(KeyCode::F(5), KeyModifiers::empty());
        assert_eq!(dispatcher.get_global_action(&f5), Some("toggle_logs"));
    }

    #[test]
    #[allow(non_snake_case)]
    fn test_shift_G_goes_to_last() {
        let dispatcher = KeyDispatcher::new();
        let G = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(dispatcher.get_results_action(&G), Some("last_result"));
    }
}
