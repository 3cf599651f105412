//! Key and mouse bindings: normal (a/d, arrows) and vim-style (h/l, j/k).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press or mouse event. Pointer positions are terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    /// Nudge aim counter-clockwise (toward the left wall).
    AimLeft,
    /// Nudge aim clockwise (toward the right wall).
    AimRight,
    Fire,
    Reload,
    WildReload,
    Pause,
    Restart,
    Quit,
    Pointer { column: u16, row: u16 },
    FireAt { column: u16, row: u16 },
    None,
}

impl Action {
    /// Actions that stay active while the key is held.
    pub fn is_held(self) -> bool {
        matches!(self, Self::MoveLeft | Self::MoveRight)
    }
}

/// Map key event to game action. Supports both normal and vim-style keys.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('p') if no_mod => Action::Pause,
        KeyCode::Char('R') if no_mod => Action::Restart,
        KeyCode::Char('r') if no_mod => Action::Reload,
        KeyCode::Char('f') if no_mod => Action::WildReload,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') if no_mod => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') if no_mod => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') if no_mod => Action::AimLeft,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') if no_mod => Action::AimRight,
        KeyCode::Enter | KeyCode::Char(' ') if no_mod => Action::Fire,
        _ => Action::None,
    }
}

/// Map mouse event to game action: movement aims, left click fires.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Action::Pointer { column, row },
        MouseEventKind::Down(MouseButton::Left) => Action::FireAt { column, row },
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_normal_and_vim_keys_agree() {
        let none = KeyModifiers::NONE;
        for (a, b, action) in [
            (KeyCode::Char('a'), KeyCode::Char('h'), Action::MoveLeft),
            (KeyCode::Char('d'), KeyCode::Char('l'), Action::MoveRight),
            (KeyCode::Up, KeyCode::Char('k'), Action::AimLeft),
            (KeyCode::Down, KeyCode::Char('j'), Action::AimRight),
            (KeyCode::Enter, KeyCode::Char(' '), Action::Fire),
        ] {
            assert_eq!(key_to_action(press(a, none)), action);
            assert_eq!(key_to_action(press(b, none)), action);
        }
    }

    #[test]
    fn test_reload_and_restart_are_case_sensitive() {
        assert_eq!(key_to_action(press(KeyCode::Char('r'), KeyModifiers::NONE)), Action::Reload);
        assert_eq!(key_to_action(press(KeyCode::Char('R'), KeyModifiers::SHIFT)), Action::Restart);
        assert_eq!(key_to_action(press(KeyCode::Char('f'), KeyModifiers::NONE)), Action::WildReload);
    }

    #[test]
    fn test_modifiers() {
        assert_eq!(key_to_action(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(key_to_action(press(KeyCode::Char('a'), KeyModifiers::ALT)), Action::None);
        assert_eq!(key_to_action(press(KeyCode::Char('a'), KeyModifiers::CONTROL)), Action::None);
    }

    #[test]
    fn test_mouse_aims_and_fires() {
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Moved)),
            Action::Pointer { column: 12, row: 7 }
        );
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::FireAt { column: 12, row: 7 }
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Right))), Action::None);
        assert_eq!(mouse_to_action(mouse(MouseEventKind::ScrollUp)), Action::None);
    }

    #[test]
    fn test_only_movement_is_held() {
        assert!(Action::MoveLeft.is_held());
        assert!(!Action::Fire.is_held());
        assert!(!Action::AimLeft.is_held());
    }
}
