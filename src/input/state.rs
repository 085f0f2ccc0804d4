//! Physical input state tracking

use super::MouseButton;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// A pointer position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pointer and wheel state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MouseState {
    /// Current pointer position
    pub position: Position,
    /// Sign of the last vertical wheel delta (-1, 0 or 1); 0 when not scrolling
    pub wheel: i8,
    /// When the last wheel event arrived
    #[serde(skip)]
    pub last_scroll_at: Option<Instant>,
    /// Where the held button went down
    pub drag_start: Option<Position>,
    /// Whether the held button has moved past the drag threshold
    pub dragging: bool,
}

impl MouseState {
    /// Forget any in-progress press or drag
    pub fn clear_drag(&mut self) {
        self.drag_start = None;
        self.dragging = false;
    }
}

/// Currently held keys, buttons and pseudo-keys plus pointer state
#[derive(Debug, Clone, Default)]
pub struct PhysicalState {
    pressed_keys: HashSet<String>,
    pressed_mouse_button: Option<MouseButton>,
    mouse: MouseState,
}

impl PhysicalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns `false` if the key was already held,
    /// in which case the press is a repeat and nothing changes.
    pub fn press(&mut self, name: &str) -> bool {
        if self.pressed_keys.contains(name) {
            return false;
        }
        self.pressed_keys.insert(name.to_string());
        true
    }

    /// Record a release. Releasing a key that is not held is a no-op;
    /// returns whether the key was held.
    pub fn release(&mut self, name: &str) -> bool {
        self.pressed_keys.remove(name)
    }

    pub fn is_pressed(&self, name: &str) -> bool {
        self.pressed_keys.contains(name)
    }

    pub fn pressed_keys(&self) -> &HashSet<String> {
        &self.pressed_keys
    }

    /// Number of keys currently held
    pub fn pressed_count(&self) -> usize {
        self.pressed_keys.len()
    }

    /// Held key names in sorted order
    pub fn pressed_sorted(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.pressed_keys.iter().cloned().collect();
        keys.sort();
        keys
    }

    pub fn pressed_mouse_button(&self) -> Option<MouseButton> {
        self.pressed_mouse_button
    }

    pub fn set_pressed_mouse_button(&mut self, button: Option<MouseButton>) {
        self.pressed_mouse_button = button;
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    pub fn mouse_mut(&mut self) -> &mut MouseState {
        &mut self.mouse
    }

    pub fn reset(&mut self) {
        self.pressed_keys.clear();
        self.pressed_mouse_button = None;
        self.mouse = MouseState::default();
    }
}
