//! Pointer Input - Mouse events the overlay reacts to.
//!
//! Only the primary button matters to badges: press starts a drag, motion
//! with the button held moves the badge, release ends it. Clicks and
//! double clicks are derived from press/release pairs by the overlay.

use crossterm::event::{
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};

/// Pointer action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
    Drag,
    Move,
}

/// Pointer event in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub action: PointerAction,
    /// X coordinate (0-indexed)
    pub x: u16,
    /// Y coordinate (0-indexed)
    pub y: u16,
}

impl PointerEvent {
    pub fn new(action: PointerAction, x: u16, y: u16) -> Self {
        Self { action, x, y }
    }

    pub fn down(x: u16, y: u16) -> Self {
        Self::new(PointerAction::Down, x, y)
    }

    pub fn up(x: u16, y: u16) -> Self {
        Self::new(PointerAction::Up, x, y)
    }

    pub fn drag(x: u16, y: u16) -> Self {
        Self::new(PointerAction::Drag, x, y)
    }
}

/// Convert a crossterm mouse event. Non-primary buttons and scrolling
/// are not overlay input.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<PointerEvent> {
    let action = match event.kind {
        MouseEventKind::Down(CrosstermMouseButton::Left) => PointerAction::Down,
        MouseEventKind::Up(CrosstermMouseButton::Left) => PointerAction::Up,
        MouseEventKind::Drag(CrosstermMouseButton::Left) => PointerAction::Drag,
        MouseEventKind::Moved => PointerAction::Move,
        _ => return None,
    };
    Some(PointerEvent::new(action, event.column, event.row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn crossterm_event(kind: MouseEventKind) -> CrosstermMouseEvent {
        CrosstermMouseEvent {
            kind,
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_convert_left_button() {
        let event = convert_mouse_event(crossterm_event(MouseEventKind::Down(CrosstermMouseButton::Left)));
        assert_eq!(event, Some(PointerEvent::down(10, 5)));

        let event = convert_mouse_event(crossterm_event(MouseEventKind::Drag(CrosstermMouseButton::Left)));
        assert_eq!(event, Some(PointerEvent::drag(10, 5)));

        let event = convert_mouse_event(crossterm_event(MouseEventKind::Up(CrosstermMouseButton::Left)));
        assert_eq!(event, Some(PointerEvent::up(10, 5)));
    }

    #[test]
    fn test_convert_ignores_other_input() {
        assert_eq!(
            convert_mouse_event(crossterm_event(MouseEventKind::Down(CrosstermMouseButton::Right))),
            None
        );
        assert_eq!(convert_mouse_event(crossterm_event(MouseEventKind::ScrollDown)), None);
    }

    #[test]
    fn test_convert_move() {
        let event = convert_mouse_event(crossterm_event(MouseEventKind::Moved));
        assert_eq!(event.map(|e| e.action), Some(PointerAction::Move));
    }
}
