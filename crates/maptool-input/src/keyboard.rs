//! Held keys and per-frame press edges.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A key event stripped of winit's platform data, so scripts and tests can
/// build one.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

impl RawKeyEvent {
    pub fn pressed(code: KeyCode) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    pub fn released(code: KeyCode) -> Self {
        Self {
            state: ElementState::Released,
            ..Self::pressed(code)
        }
    }
}

/// Physical keys currently down, plus the ones that went down since the last
/// [`clear_transients`](Self::clear_transients).
///
/// Movement reads the held set. Toggles read the edges, so holding F2 flips
/// wireframe once.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<PhysicalKey>,
    pressed_this_frame: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// OS auto-repeat never produces a new edge.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(event.key) {
                    self.pressed_this_frame.insert(event.key);
                }
            }
            ElementState::Released => {
                self.held.remove(&event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn test_nothing_held_initially() {
        let kb = KeyboardState::new();
        for code in [KeyCode::F1, KeyCode::ArrowUp, KeyCode::PageDown] {
            assert!(!kb.is_pressed(key(code)));
            assert!(!kb.just_pressed(key(code)));
        }
    }

    #[test]
    fn test_toggle_key_edge_lasts_one_frame() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::pressed(KeyCode::F2));
        assert!(kb.just_pressed(key(KeyCode::F2)));

        kb.clear_transients();
        assert!(kb.is_pressed(key(KeyCode::F2)));
        assert!(!kb.just_pressed(key(KeyCode::F2)));
    }

    #[test]
    fn test_auto_repeat_does_not_retrigger() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::pressed(KeyCode::F3));
        kb.clear_transients();
        kb.process_raw(RawKeyEvent {
            repeat: true,
            ..RawKeyEvent::pressed(KeyCode::F3)
        });
        kb.process_raw(RawKeyEvent::pressed(KeyCode::F3));
        assert!(!kb.just_pressed(key(KeyCode::F3)));
    }

    #[test]
    fn test_release_then_press_is_a_new_edge() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::pressed(KeyCode::F4));
        kb.clear_transients();
        kb.process_raw(RawKeyEvent::released(KeyCode::F4));
        assert!(!kb.is_pressed(key(KeyCode::F4)));
        kb.process_raw(RawKeyEvent::pressed(KeyCode::F4));
        assert!(kb.just_pressed(key(KeyCode::F4)));
    }
}
