//! Scripted input for windowless runs.
//!
//! A script is a list of timed actions replayed into an [`InputState`] as if
//! they came from the window, so key bindings apply exactly as they would
//! interactively.

use maptool_input::{Binding, InputState, Movement, RawKeyEvent, Toggle};
use winit::event::{ElementState, MouseButton};

/// Something the user does at the start of a given frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScriptAction {
    Press(Binding),
    Release(Binding),
    MoveCursor { x: f64, y: f64 },
    LeaveWindow,
    Click,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptStep {
    pub frame: u64,
    pub action: ScriptAction,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, frame: u64, action: ScriptAction) -> Self {
        self.steps.push(ScriptStep { frame, action });
        self
    }

    /// Press and release a toggle over two frames.
    pub fn tap(self, frame: u64, toggle: Toggle) -> Self {
        self.at(frame, ScriptAction::Press(Binding::Toggle(toggle)))
            .at(frame + 1, ScriptAction::Release(Binding::Toggle(toggle)))
    }

    /// Hold a movement key for `frames` frames.
    pub fn hold(self, frame: u64, frames: u64, movement: Movement) -> Self {
        self.at(frame, ScriptAction::Press(Binding::Movement(movement)))
            .at(frame + frames, ScriptAction::Release(Binding::Movement(movement)))
    }

    /// Move the cursor to `(x, y)` and left-click there.
    pub fn click(self, frame: u64, x: f64, y: f64) -> Self {
        self.at(frame, ScriptAction::MoveCursor { x, y })
            .at(frame, ScriptAction::Click)
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// A short tour: pick the screen center, fly forward while turning,
    /// animate the light, then lock to the terrain.
    pub fn tour(width: u32, height: u32) -> Self {
        let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        Self::new()
            .click(1, cx, cy)
            .hold(10, 90, Movement::Forward)
            .hold(40, 30, Movement::TurnRight)
            .tap(120, Toggle::AutoPlay)
            .tap(150, Toggle::CellLines)
            .tap(180, Toggle::HeightLock)
            .hold(190, 60, Movement::Forward)
            .click(260, cx, cy * 1.5)
            .tap(280, Toggle::Wireframe)
    }

    /// Feed this frame's actions into `input`. Returns how many were applied.
    pub fn apply(&self, frame: u64, input: &mut InputState) -> usize {
        let mut applied = 0;
        for step in self.steps.iter().filter(|s| s.frame == frame) {
            match step.action {
                ScriptAction::Press(binding) => {
                    let key = input.bindings().key(binding);
                    input.on_raw_key(RawKeyEvent::pressed(key));
                }
                ScriptAction::Release(binding) => {
                    let key = input.bindings().key(binding);
                    input.on_raw_key(RawKeyEvent::released(key));
                }
                ScriptAction::MoveCursor { x, y } => input.on_cursor_moved(x, y),
                ScriptAction::LeaveWindow => input.on_cursor_left(),
                ScriptAction::Click => {
                    input.on_mouse_button(MouseButton::Left, ElementState::Pressed);
                    input.on_mouse_button(MouseButton::Left, ElementState::Released);
                }
            }
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptool_input::{InputSnapshot, KeyBindings};
    use std::collections::HashMap;
    use winit::keyboard::KeyCode;

    #[test]
    fn test_tap_fires_toggle_once() {
        let script = InputScript::new().tap(3, Toggle::AutoPlay);
        let mut input = InputState::new(KeyBindings::default());

        assert_eq!(script.apply(2, &mut input), 0);
        assert!(!input.is_toggled(Toggle::AutoPlay));
        input.end_frame();

        assert_eq!(script.apply(3, &mut input), 1);
        assert!(input.is_toggled(Toggle::AutoPlay));
        input.end_frame();

        script.apply(4, &mut input);
        assert!(!input.is_toggled(Toggle::AutoPlay));
    }

    #[test]
    fn test_hold_spans_frames() {
        let script = InputScript::new().hold(0, 2, Movement::Forward);
        let mut input = InputState::new(KeyBindings::default());
        for frame in 0..2 {
            script.apply(frame, &mut input);
            assert!(input.is_held(Movement::Forward), "frame {frame}");
            input.end_frame();
        }
        script.apply(2, &mut input);
        assert!(!input.is_held(Movement::Forward));
    }

    #[test]
    fn test_click_reports_position_and_edge() {
        let script = InputScript::new().click(0, 100.0, 50.0);
        let mut input = InputState::new(KeyBindings::default());
        script.apply(0, &mut input);
        assert_eq!(input.mouse_window_position(), Some((100, 50)));
        assert!(input.is_left_click());
        input.end_frame();
        assert!(!input.is_left_click());
    }

    #[test]
    fn test_script_follows_rebinding() {
        let overrides = HashMap::from([("ToggleAutoPlay".to_string(), "KeyL".to_string())]);
        let bindings = KeyBindings::with_overrides(&overrides);
        assert_eq!(bindings.key(Binding::Toggle(Toggle::AutoPlay)), KeyCode::KeyL);

        let script = InputScript::new().tap(0, Toggle::AutoPlay);
        let mut input = InputState::new(bindings);
        script.apply(0, &mut input);
        assert!(input.is_toggled(Toggle::AutoPlay));
        assert!(input.keyboard().is_pressed(winit::keyboard::PhysicalKey::Code(KeyCode::KeyL)));
    }

    #[test]
    fn test_tour_is_ordered_and_in_window() {
        let tour = InputScript::tour(800, 600);
        assert!(!tour.steps().is_empty());
        for step in tour.steps() {
            if let ScriptAction::MoveCursor { x, y } = step.action {
                assert!((0.0..800.0).contains(&x) && (0.0..600.0).contains(&y));
            }
        }
    }
}
