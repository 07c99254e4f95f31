use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use spark_core::config::LayoutConfig;
use spark_core::reader::Gesture;

use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveDown,
    MoveUp,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    /// Open the selected post
    Select,
    /// Leave the reader
    Close,
    NextPage,
    PrevPage,
    NextPost,
    PrevPost,
    ToggleLike,
    ToggleSaved,
    Refresh,
    None,
}

/// Map a key press through the keymap
pub fn handle_key_event(key: KeyEvent, keymap: &Keymap) -> Action {
    keymap
        .get(&KeyBinding::new(key.code, key.modifiers))
        .copied()
        .unwrap_or(Action::None)
}

/// Size of a terminal cell in layout units.
///
/// The navigation engine works in the same units as the height estimator, so
/// one row counts as one estimated text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub row_px: f32,
    pub col_px: f32,
}

impl CellGeometry {
    pub fn from_layout(layout: &LayoutConfig) -> Self {
        let row_px = (layout.line_height as f32).max(1.0);
        Self {
            row_px,
            col_px: row_px / 2.0,
        }
    }

    pub fn rows_to_px(&self, rows: u16) -> f32 {
        f32::from(rows) * self.row_px
    }

    pub fn px_to_rows(&self, px: f32) -> u16 {
        (px / self.row_px).round().clamp(0.0, f32::from(u16::MAX)) as u16
    }
}

/// Translate a mouse event into a reader gesture. A press/release pair acts as a swipe.
pub fn mouse_gesture(mouse: &MouseEvent, geometry: CellGeometry, wheel_step: f32) -> Option<Gesture> {
    let x = f32::from(mouse.column) * geometry.col_px;
    let y = f32::from(mouse.row) * geometry.row_px;
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Gesture::Wheel {
            dx: 0.0,
            dy: wheel_step,
        }),
        MouseEventKind::ScrollUp => Some(Gesture::Wheel {
            dx: 0.0,
            dy: -wheel_step,
        }),
        MouseEventKind::ScrollRight => Some(Gesture::Wheel {
            dx: wheel_step,
            dy: 0.0,
        }),
        MouseEventKind::ScrollLeft => Some(Gesture::Wheel {
            dx: -wheel_step,
            dy: 0.0,
        }),
        MouseEventKind::Down(MouseButton::Left) => Some(Gesture::TouchStart { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(Gesture::TouchEnd { x, y }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_keys_map_through_keymap() {
        let keymap = Keymap::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(handle_key_event(key(KeyCode::Char(' ')), &keymap), Action::NextPage);
        assert_eq!(handle_key_event(key(KeyCode::Char('l')), &keymap), Action::NextPost);
        assert_eq!(handle_key_event(key(KeyCode::Char('z')), &keymap), Action::None);
    }

    #[test]
    fn test_wheel_events_become_wheel_gestures() {
        let g = CellGeometry::from_layout(&LayoutConfig::default());
        assert_eq!(
            mouse_gesture(&mouse(MouseEventKind::ScrollDown, 0, 0), g, 72.0),
            Some(Gesture::Wheel { dx: 0.0, dy: 72.0 })
        );
        assert_eq!(
            mouse_gesture(&mouse(MouseEventKind::ScrollLeft, 0, 0), g, 72.0),
            Some(Gesture::Wheel { dx: -72.0, dy: 0.0 })
        );
    }

    #[test]
    fn test_press_and_release_are_scaled_to_layout_units() {
        let g = CellGeometry::from_layout(&LayoutConfig::default());
        assert_eq!(
            mouse_gesture(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 3), g, 72.0),
            Some(Gesture::TouchStart { x: 120.0, y: 72.0 })
        );
        assert_eq!(
            mouse_gesture(&mouse(MouseEventKind::Drag(MouseButton::Left), 10, 3), g, 72.0),
            None
        );
    }

    #[test]
    fn test_cell_geometry_round_trip() {
        let g = CellGeometry::from_layout(&LayoutConfig::default());
        assert_eq!(g.rows_to_px(5), 120.0);
        assert_eq!(g.px_to_rows(130.0), 5);
        assert_eq!(g.px_to_rows(-4.0), 0);
    }
}
