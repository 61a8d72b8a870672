use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Jump to the first line or row
    Top,
    /// Jump to the last line or row
    Bottom,
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    /// Scroll one column to the left
    ScrollLeft,
    /// Scroll one column to the right
    ScrollRight,
    /// Switch to the next sheet or page
    NextPane,
    /// Switch to the previous sheet or page
    PreviousPane,
    /// No action
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q, Esc or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Jumps
        (KeyCode::Home, _) => KeyAction::Top,
        (KeyCode::Char('g'), KeyModifiers::NONE) => KeyAction::Top,
        (KeyCode::End, _) => KeyAction::Bottom,
        (KeyCode::Char('G'), KeyModifiers::NONE | KeyModifiers::SHIFT) => KeyAction::Bottom,

        // Vertical
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::LineUp,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::LineUp,
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::LineDown,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::LineDown,
        (KeyCode::PageUp, _) => KeyAction::PageUp,
        (KeyCode::PageDown, _) => KeyAction::PageDown,

        // Horizontal
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::ScrollLeft,
        (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::ScrollLeft,
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::ScrollRight,
        (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::ScrollRight,

        // Panes
        (KeyCode::Tab, KeyModifiers::NONE) => KeyAction::NextPane,
        (KeyCode::BackTab, _) => KeyAction::PreviousPane,

        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_quit() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Esc)), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_key_jumps() {
        assert_eq!(handle_key_event(key(KeyCode::Home)), KeyAction::Top);
        assert_eq!(handle_key_event(key(KeyCode::Char('g'))), KeyAction::Top);
        assert_eq!(handle_key_event(key(KeyCode::End)), KeyAction::Bottom);

        let shift_g = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(handle_key_event(shift_g), KeyAction::Bottom);
        assert_eq!(handle_key_event(key(KeyCode::Char('G'))), KeyAction::Bottom);
    }

    #[test]
    fn test_key_vertical() {
        assert_eq!(handle_key_event(key(KeyCode::Up)), KeyAction::LineUp);
        assert_eq!(handle_key_event(key(KeyCode::Char('k'))), KeyAction::LineUp);
        assert_eq!(handle_key_event(key(KeyCode::Down)), KeyAction::LineDown);
        assert_eq!(handle_key_event(key(KeyCode::Char('j'))), KeyAction::LineDown);
        assert_eq!(handle_key_event(key(KeyCode::PageUp)), KeyAction::PageUp);
        assert_eq!(handle_key_event(key(KeyCode::PageDown)), KeyAction::PageDown);
    }

    #[test]
    fn test_key_horizontal() {
        assert_eq!(handle_key_event(key(KeyCode::Left)), KeyAction::ScrollLeft);
        assert_eq!(handle_key_event(key(KeyCode::Char('h'))), KeyAction::ScrollLeft);
        assert_eq!(handle_key_event(key(KeyCode::Right)), KeyAction::ScrollRight);
        assert_eq!(handle_key_event(key(KeyCode::Char('l'))), KeyAction::ScrollRight);
    }

    #[test]
    fn test_key_panes() {
        assert_eq!(handle_key_event(key(KeyCode::Tab)), KeyAction::NextPane);

        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(handle_key_event(back_tab), KeyAction::PreviousPane);
    }

    #[test]
    fn test_key_none() {
        assert_eq!(handle_key_event(key(KeyCode::Char('x'))), KeyAction::None);

        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_q), KeyAction::None);
    }
}
