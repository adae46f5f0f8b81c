//! Key bindings for the scene toggles and camera movement.
//!
//! Defaults follow the map tool's function-key layout (F1 to F5 for the
//! toggles, arrows and page keys for the camera). Overrides come from the
//! config's `input.keybindings` table as `action name -> key name` strings.

use std::collections::HashMap;
use tracing::warn;
use winit::keyboard::KeyCode;

use crate::snapshot::{Movement, Toggle};

/// Anything a key can be bound to.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Binding {
    /// An edge-triggered scene toggle.
    Toggle(Toggle),
    /// A held camera movement.
    Movement(Movement),
}

impl Binding {
    /// Every bindable action.
    pub const ALL: [Binding; 13] = [
        Binding::Toggle(Toggle::DisplayUi),
        Binding::Toggle(Toggle::Wireframe),
        Binding::Toggle(Toggle::AutoPlay),
        Binding::Toggle(Toggle::CellLines),
        Binding::Toggle(Toggle::HeightLock),
        Binding::Movement(Movement::Forward),
        Binding::Movement(Movement::Backward),
        Binding::Movement(Movement::TurnLeft),
        Binding::Movement(Movement::TurnRight),
        Binding::Movement(Movement::Up),
        Binding::Movement(Movement::Down),
        Binding::Movement(Movement::LookUp),
        Binding::Movement(Movement::LookDown),
    ];

    /// The name used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Binding::Toggle(Toggle::DisplayUi) => "ToggleUi",
            Binding::Toggle(Toggle::Wireframe) => "ToggleWireframe",
            Binding::Toggle(Toggle::AutoPlay) => "ToggleAutoPlay",
            Binding::Toggle(Toggle::CellLines) => "ToggleCellLines",
            Binding::Toggle(Toggle::HeightLock) => "ToggleHeightLock",
            Binding::Movement(Movement::Forward) => "MoveForward",
            Binding::Movement(Movement::Backward) => "MoveBackward",
            Binding::Movement(Movement::TurnLeft) => "TurnLeft",
            Binding::Movement(Movement::TurnRight) => "TurnRight",
            Binding::Movement(Movement::Up) => "MoveUp",
            Binding::Movement(Movement::Down) => "MoveDown",
            Binding::Movement(Movement::LookUp) => "LookUp",
            Binding::Movement(Movement::LookDown) => "LookDown",
        }
    }

    /// Parse a config-file action name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn default_key(self) -> KeyCode {
        match self {
            Binding::Toggle(Toggle::DisplayUi) => KeyCode::F1,
            Binding::Toggle(Toggle::Wireframe) => KeyCode::F2,
            Binding::Toggle(Toggle::AutoPlay) => KeyCode::F3,
            Binding::Toggle(Toggle::CellLines) => KeyCode::F4,
            Binding::Toggle(Toggle::HeightLock) => KeyCode::F5,
            Binding::Movement(Movement::Forward) => KeyCode::ArrowUp,
            Binding::Movement(Movement::Backward) => KeyCode::ArrowDown,
            Binding::Movement(Movement::TurnLeft) => KeyCode::ArrowLeft,
            Binding::Movement(Movement::TurnRight) => KeyCode::ArrowRight,
            Binding::Movement(Movement::Up) => KeyCode::KeyA,
            Binding::Movement(Movement::Down) => KeyCode::KeyZ,
            Binding::Movement(Movement::LookUp) => KeyCode::PageUp,
            Binding::Movement(Movement::LookDown) => KeyCode::PageDown,
        }
    }
}

/// Parse a key name as printed by `KeyCode`'s `Debug` output.
pub fn keycode_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "F5" => KeyCode::F5,
        "F6" => KeyCode::F6,
        "F7" => KeyCode::F7,
        "F8" => KeyCode::F8,
        "F9" => KeyCode::F9,
        "F10" => KeyCode::F10,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyL" => KeyCode::KeyL,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyZ" => KeyCode::KeyZ,
        "Space" => KeyCode::Space,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ControlLeft" => KeyCode::ControlLeft,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        _ => return None,
    })
}

/// Binding table from actions to physical keys.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    keys: HashMap<Binding, KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            keys: Binding::ALL
                .into_iter()
                .map(|b| (b, b.default_key()))
                .collect(),
        }
    }
}

impl KeyBindings {
    /// Defaults with config overrides applied. Unknown action or key names
    /// are skipped with a warning.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut bindings = Self::default();
        for (action, key) in overrides {
            match (Binding::from_name(action), keycode_from_name(key)) {
                (Some(binding), Some(code)) => bindings.bind(binding, code),
                (None, _) => warn!("ignoring binding for unknown action '{action}'"),
                (_, None) => warn!("ignoring binding '{action}' to unknown key '{key}'"),
            }
        }
        bindings
    }

    /// Rebind one action.
    pub fn bind(&mut self, binding: Binding, key: KeyCode) {
        self.keys.insert(binding, key);
    }

    /// Key bound to `binding`.
    pub fn key(&self, binding: Binding) -> KeyCode {
        self.keys
            .get(&binding)
            .copied()
            .unwrap_or_else(|| binding.default_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_function_keys_for_toggles() {
        let b = KeyBindings::default();
        assert_eq!(b.key(Binding::Toggle(Toggle::DisplayUi)), KeyCode::F1);
        assert_eq!(b.key(Binding::Toggle(Toggle::HeightLock)), KeyCode::F5);
        assert_eq!(b.key(Binding::Movement(Movement::LookDown)), KeyCode::PageDown);
    }

    #[test]
    fn test_names_round_trip() {
        for binding in Binding::ALL {
            assert_eq!(Binding::from_name(binding.name()), Some(binding));
        }
        assert_eq!(Binding::from_name("Jump"), None);
    }

    #[test]
    fn test_overrides_apply_and_skip_unknown() {
        let overrides = HashMap::from([
            ("ToggleWireframe".to_string(), "KeyG".to_string()),
            ("Jump".to_string(), "Space".to_string()),
            ("MoveUp".to_string(), "NotAKey".to_string()),
        ]);
        let b = KeyBindings::with_overrides(&overrides);
        assert_eq!(b.key(Binding::Toggle(Toggle::Wireframe)), KeyCode::KeyG);
        assert_eq!(b.key(Binding::Movement(Movement::Up)), KeyCode::KeyA);
    }
}
