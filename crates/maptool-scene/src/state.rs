//! Scene flags flipped by the function keys.

use maptool_input::{InputSnapshot, Toggle};

/// Display and behavior flags of a running scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneState {
    pub display_ui: bool,
    pub wireframe: bool,
    pub auto_play: bool,
    pub show_cell_lines: bool,
    pub height_locked: bool,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            display_ui: true,
            wireframe: false,
            auto_play: false,
            show_cell_lines: true,
            height_locked: false,
        }
    }
}

impl SceneState {
    /// A copy with the flag for `toggle` flipped.
    pub fn toggled(self, toggle: Toggle) -> Self {
        let mut next = self;
        let flag = next.flag_mut(toggle);
        *flag = !*flag;
        next
    }

    pub fn is_set(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::DisplayUi => self.display_ui,
            Toggle::Wireframe => self.wireframe,
            Toggle::AutoPlay => self.auto_play,
            Toggle::CellLines => self.show_cell_lines,
            Toggle::HeightLock => self.height_locked,
        }
    }

    /// Flip every flag whose toggle fired.
    pub fn apply(&mut self, fired: &ToggleSet) {
        for toggle in fired.iter() {
            *self = self.toggled(toggle);
        }
    }

    fn flag_mut(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::DisplayUi => &mut self.display_ui,
            Toggle::Wireframe => &mut self.wireframe,
            Toggle::AutoPlay => &mut self.auto_play,
            Toggle::CellLines => &mut self.show_cell_lines,
            Toggle::HeightLock => &mut self.height_locked,
        }
    }
}

/// The toggles that fired during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToggleSet {
    bits: u8,
}

impl ToggleSet {
    pub fn from_input(input: &dyn InputSnapshot) -> Self {
        let mut set = Self::default();
        for toggle in Toggle::ALL {
            if input.is_toggled(toggle) {
                set.insert(toggle);
            }
        }
        set
    }

    pub fn insert(&mut self, toggle: Toggle) {
        self.bits |= Self::bit(toggle);
    }

    pub fn contains(&self, toggle: Toggle) -> bool {
        self.bits & Self::bit(toggle) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Fired toggles in function-key order.
    pub fn iter(&self) -> impl Iterator<Item = Toggle> + '_ {
        Toggle::ALL.into_iter().filter(|t| self.contains(*t))
    }

    fn bit(toggle: Toggle) -> u8 {
        1 << toggle as u8
    }
}

impl FromIterator<Toggle> for ToggleSet {
    fn from_iter<I: IntoIterator<Item = Toggle>>(iter: I) -> Self {
        let mut set = Self::default();
        for toggle in iter {
            set.insert(toggle);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptool_input::FrameInput;

    #[test]
    fn test_defaults() {
        let state = SceneState::default();
        assert!(state.display_ui);
        assert!(state.show_cell_lines);
        assert!(!state.wireframe && !state.auto_play && !state.height_locked);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let state = SceneState::default();
        for toggle in Toggle::ALL {
            let once = state.toggled(toggle);
            assert_ne!(once, state);
            assert_eq!(once.is_set(toggle), !state.is_set(toggle));
            assert_eq!(once.toggled(toggle), state);
        }
    }

    #[test]
    fn test_apply_flips_only_fired() {
        let mut state = SceneState::default();
        let fired: ToggleSet = [Toggle::Wireframe, Toggle::DisplayUi].into_iter().collect();
        state.apply(&fired);
        assert!(state.wireframe);
        assert!(!state.display_ui);
        assert!(state.show_cell_lines);
        assert!(!state.auto_play);
    }

    #[test]
    fn test_toggle_set_from_input() {
        let input = FrameInput::idle()
            .with_toggle(Toggle::HeightLock)
            .with_toggle(Toggle::AutoPlay);
        let set = ToggleSet::from_input(&input);
        assert!(set.contains(Toggle::HeightLock));
        assert!(set.contains(Toggle::AutoPlay));
        assert!(!set.contains(Toggle::CellLines));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Toggle::AutoPlay, Toggle::HeightLock]);
        assert!(ToggleSet::from_input(&FrameInput::idle()).is_empty());
    }
}
