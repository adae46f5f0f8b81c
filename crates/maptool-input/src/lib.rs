//! Input abstraction: frame-coherent keyboard and mouse state mapped through
//! configurable key bindings onto the map tool's toggles and camera movement.

pub mod bindings;
pub mod keyboard;
pub mod mouse;
pub mod snapshot;

pub use bindings::{Binding, KeyBindings};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
pub use snapshot::{FrameInput, InputSnapshot, InputState, Movement, Toggle};
