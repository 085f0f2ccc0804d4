//! Read-only views handed to observers

use super::KeyGroup;
use crate::input::{MouseButton, MouseState};
use serde::Serialize;
use std::fmt;

/// Pointer state as seen by a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MouseView {
    pub x: f64,
    pub y: f64,
    pub wheel: i8,
    pub dragging: bool,
}

impl From<&MouseState> for MouseView {
    fn from(mouse: &MouseState) -> Self {
        Self {
            x: mouse.position.x,
            y: mouse.position.y,
            wheel: mouse.wheel,
            dragging: mouse.dragging,
        }
    }
}

/// Immutable copy of the engine's observable state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Held keys, buttons and pseudo-keys, sorted
    pub pressed_keys: Vec<String>,
    pub pressed_mouse_button: Option<MouseButton>,
    pub mouse: MouseView,
    /// Oldest first; the last group is the active one
    pub groups: Vec<KeyGroup>,
}

impl Snapshot {
    pub fn is_pressed(&self, name: &str) -> bool {
        self.pressed_keys.iter().any(|k| k == name)
    }

    /// Group member names, for quick comparisons
    pub fn group_names(&self) -> Vec<Vec<&str>> {
        self.groups.iter().map(|g| g.names()).collect()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return f.write_str("(empty)");
        }
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}
