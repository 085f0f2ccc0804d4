//! Raw input event types delivered by the capture hook

use super::keymap::{key_name, KeyCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mouse button identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl MouseButton {
    /// Name of the pseudo-key synthesized for this button
    pub fn key_name(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Middle => "Middle",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// A single input occurrence, as emitted by the native hook.
///
/// The serialized form is the hook's wire format: internally tagged by
/// `type`, with snake_case field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawInputEvent {
    KeyEvent {
        pressed: bool,
        name: String,
    },
    MouseButtonEvent {
        pressed: bool,
        button: MouseButton,
    },
    MouseMoveEvent {
        x: f64,
        y: f64,
    },
    MouseWheelEvent {
        delta_x: f64,
        delta_y: f64,
    },
}

impl RawInputEvent {
    pub fn key_down(name: impl Into<String>) -> Self {
        Self::KeyEvent {
            pressed: true,
            name: name.into(),
        }
    }

    pub fn key_up(name: impl Into<String>) -> Self {
        Self::KeyEvent {
            pressed: false,
            name: name.into(),
        }
    }

    pub fn button_down(button: MouseButton) -> Self {
        Self::MouseButtonEvent {
            pressed: true,
            button,
        }
    }

    pub fn button_up(button: MouseButton) -> Self {
        Self::MouseButtonEvent {
            pressed: false,
            button,
        }
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        Self::MouseMoveEvent { x, y }
    }

    pub fn wheel(delta_x: f64, delta_y: f64) -> Self {
        Self::MouseWheelEvent { delta_x, delta_y }
    }

    /// Build a key event from a raw scancode, naming it through the keymap.
    ///
    /// Unmapped scancodes produce a key named `"Unknown"`.
    pub fn from_scancode(code: KeyCode, pressed: bool) -> Self {
        Self::KeyEvent {
            pressed,
            name: key_name(code).to_string(),
        }
    }

    /// Short tag used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyEvent { .. } => "key",
            Self::MouseButtonEvent { .. } => "button",
            Self::MouseMoveEvent { .. } => "move",
            Self::MouseWheelEvent { .. } => "wheel",
        }
    }
}
