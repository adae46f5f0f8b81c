//! Cursor and left-button tracking for terrain picking.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// Where the cursor is and whether the left button went down this frame.
///
/// Only the left button drives the tool; other buttons are ignored.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Vec2,
    inside: bool,
    left_held: bool,
    left_clicked: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A move implies the cursor is inside the window.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = Vec2::new(x as f32, y as f32);
        self.inside = true;
    }

    pub fn on_cursor_left(&mut self) {
        self.inside = false;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                self.left_clicked |= !self.left_held;
                self.left_held = true;
            }
            ElementState::Released => self.left_held = false,
        }
    }

    pub fn clear_transients(&mut self) {
        self.left_clicked = false;
    }

    /// Cursor position in whole window pixels, `None` while the cursor is outside.
    #[must_use]
    pub fn window_position(&self) -> Option<(i32, i32)> {
        self.inside
            .then(|| (self.position.x as i32, self.position.y as i32))
    }

    /// The left button transitioned to pressed since the last clear.
    #[must_use]
    pub fn left_clicked(&self) -> bool {
        self.left_clicked
    }
}
