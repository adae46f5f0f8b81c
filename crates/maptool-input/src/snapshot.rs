//! Per-frame view of input consumed by the scene.

use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::PhysicalKey;

use crate::bindings::{Binding, KeyBindings};
use crate::keyboard::{KeyboardState, RawKeyEvent};
use crate::mouse::MouseState;

/// The five edge-triggered scene toggles.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Toggle {
    /// Show or hide the text overlay.
    DisplayUi,
    /// Wireframe rasterization for terrain and brush.
    Wireframe,
    /// Animate the light direction.
    AutoPlay,
    /// Draw each visible cell's bounding lines.
    CellLines,
    /// Keep the camera a fixed height above the terrain.
    HeightLock,
}

impl Toggle {
    /// All toggles, in the order they are applied each frame.
    pub const ALL: [Toggle; 5] = [
        Toggle::DisplayUi,
        Toggle::Wireframe,
        Toggle::AutoPlay,
        Toggle::CellLines,
        Toggle::HeightLock,
    ];
}

/// Held camera movement inputs.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Movement {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Up,
    Down,
    LookUp,
    LookDown,
}

/// What the scene reads from input once per frame.
pub trait InputSnapshot {
    /// Cursor position in window pixels, `None` when it is outside the window.
    fn mouse_window_position(&self) -> Option<(i32, i32)>;

    /// Left button went down this frame.
    fn is_left_click(&self) -> bool;

    /// The key for `toggle` went down this frame.
    fn is_toggled(&self, toggle: Toggle) -> bool;

    /// The key for `movement` is held.
    fn is_held(&self, movement: Movement) -> bool;
}

/// Live input state fed by window events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keyboard: KeyboardState,
    mouse: MouseState,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            bindings,
        }
    }

    pub fn on_key_event(&mut self, event: &KeyEvent) {
        self.keyboard.process_event(event);
    }

    pub fn on_raw_key(&mut self, event: RawKeyEvent) {
        self.keyboard.process_raw(event);
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.mouse.on_cursor_moved(x, y);
    }

    pub fn on_cursor_left(&mut self) {
        self.mouse.on_cursor_left();
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.mouse.on_button(button, state);
    }

    /// Drop this frame's edges. Call after the scene frame.
    pub fn end_frame(&mut self) {
        self.keyboard.clear_transients();
        self.mouse.clear_transients();
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    fn key(&self, binding: Binding) -> PhysicalKey {
        PhysicalKey::Code(self.bindings.key(binding))
    }
}

impl InputSnapshot for InputState {
    fn mouse_window_position(&self) -> Option<(i32, i32)> {
        self.mouse.window_position()
    }

    fn is_left_click(&self) -> bool {
        self.mouse.left_clicked()
    }

    fn is_toggled(&self, toggle: Toggle) -> bool {
        self.keyboard.just_pressed(self.key(Binding::Toggle(toggle)))
    }

    fn is_held(&self, movement: Movement) -> bool {
        self.keyboard.is_pressed(self.key(Binding::Movement(movement)))
    }
}

/// A fixed input frame, for scripted runs and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub mouse: Option<(i32, i32)>,
    pub left_click: bool,
    pub toggles: Vec<Toggle>,
    pub held: Vec<Movement>,
}

impl FrameInput {
    /// A frame with no input at all.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_toggle(mut self, toggle: Toggle) -> Self {
        self.toggles.push(toggle);
        self
    }

    pub fn with_held(mut self, movement: Movement) -> Self {
        self.held.push(movement);
        self
    }

    pub fn with_click(mut self, x: i32, y: i32) -> Self {
        self.mouse = Some((x, y));
        self.left_click = true;
        self
    }
}

impl InputSnapshot for FrameInput {
    fn mouse_window_position(&self) -> Option<(i32, i32)> {
        self.mouse
    }

    fn is_left_click(&self) -> bool {
        self.left_click
    }

    fn is_toggled(&self, toggle: Toggle) -> bool {
        self.toggles.contains(&toggle)
    }

    fn is_held(&self, movement: Movement) -> bool {
        self.held.contains(&movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_toggle_fires_once_per_press() {
        let mut input = InputState::default();
        input.on_raw_key(RawKeyEvent::pressed(KeyCode::F2));
        assert!(input.is_toggled(Toggle::Wireframe));
        assert!(!input.is_toggled(Toggle::DisplayUi));

        input.end_frame();
        assert!(!input.is_toggled(Toggle::Wireframe));
    }

    #[test]
    fn test_movement_is_level_triggered() {
        let mut input = InputState::default();
        input.on_raw_key(RawKeyEvent::pressed(KeyCode::ArrowUp));
        input.end_frame();
        assert!(input.is_held(Movement::Forward));
        input.on_raw_key(RawKeyEvent::released(KeyCode::ArrowUp));
        assert!(!input.is_held(Movement::Forward));
    }

    #[test]
    fn test_left_click_and_position() {
        let mut input = InputState::default();
        assert_eq!(input.mouse_window_position(), None);
        input.on_cursor_moved(320.0, 240.0);
        input.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_left_click());
        assert_eq!(input.mouse_window_position(), Some((320, 240)));
        input.end_frame();
        assert!(!input.is_left_click());
    }

    #[test]
    fn test_rebound_toggle() {
        let mut bindings = KeyBindings::default();
        bindings.bind(Binding::Toggle(Toggle::AutoPlay), KeyCode::KeyP);
        let mut input = InputState::new(bindings);
        input.on_raw_key(RawKeyEvent::pressed(KeyCode::F3));
        assert!(!input.is_toggled(Toggle::AutoPlay));
        input.on_raw_key(RawKeyEvent::pressed(KeyCode::KeyP));
        assert!(input.is_toggled(Toggle::AutoPlay));
    }

    #[test]
    fn test_frame_input_builder() {
        let frame = FrameInput::idle()
            .with_toggle(Toggle::CellLines)
            .with_held(Movement::Up)
            .with_click(10, 20);
        assert!(frame.is_toggled(Toggle::CellLines));
        assert!(frame.is_held(Movement::Up));
        assert!(frame.is_left_click());
        assert_eq!(frame.mouse_window_position(), Some((10, 20)));
    }
}
