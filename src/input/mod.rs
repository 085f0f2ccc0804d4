//! Input event model and physical state

mod event;
pub mod keymap;
mod state;

pub use event::{MouseButton, RawInputEvent};
pub use keymap::{is_modifier, key_name, KeyCode, KEYMAP, UNKNOWN_KEY};
pub use state::{MouseState, PhysicalState, Position};
