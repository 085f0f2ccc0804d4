//! Pointer gestures as pseudo-keys
//!
//! Buttons, drags and wheel motion are turned into synthetic key events
//! and dispatched straight back through the engine, so grouping treats
//! them like any other key.

use super::Engine;
use crate::input::{MouseButton, Position, RawInputEvent};
use log::{debug, trace};
use std::time::Instant;

/// Pseudo-key shown while a button is held past the drag threshold
pub const DRAG_KEY: &str = "Drag";

/// Pseudo-key shown while the wheel is moving
pub const SCROLL_KEY: &str = "Scroll";

/// Sign of a wheel delta; zero and NaN map to 0
pub fn wheel_direction(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

impl Engine {
    pub(super) fn on_mouse_button_press(&mut self, button: MouseButton, now: Instant) {
        let mouse = self.state.mouse_mut();
        // A second button during a drag does not restart drag tracking
        if !mouse.dragging {
            mouse.drag_start = Some(mouse.position);
        }
        self.state.set_pressed_mouse_button(Some(button));
        self.dirty = true;

        self.synthesize(RawInputEvent::key_down(button.key_name()), now);
    }

    pub(super) fn on_mouse_button_release(&mut self, button: MouseButton, now: Instant) {
        let was_dragging = self.state.mouse().dragging;
        self.state.set_pressed_mouse_button(None);
        self.state.mouse_mut().clear_drag();
        self.dirty = true;

        self.synthesize(RawInputEvent::key_up(button.key_name()), now);
        if was_dragging {
            debug!("drag ended by {} release", button);
            self.synthesize(RawInputEvent::key_up(DRAG_KEY), now);
        }
    }

    pub(super) fn on_mouse_move(&mut self, position: Position, now: Instant) {
        if !position.is_finite() {
            trace!("ignoring non-finite pointer position");
            return;
        }

        let mouse = self.state.mouse_mut();
        mouse.position = position;
        self.dirty = true;

        let Some(start) = mouse.drag_start else {
            return;
        };
        if mouse.dragging || start.distance_to(position) <= self.config.drag_threshold_px {
            return;
        }
        mouse.dragging = true;

        // The drag supersedes the button's own pseudo-key
        if let Some(button) = self.state.pressed_mouse_button() {
            let name = button.key_name();
            self.state.release(name);
            self.groups.remove_from_active(name);
        }

        debug!("drag started at ({}, {})", start.x, start.y);
        self.synthesize(RawInputEvent::key_down(DRAG_KEY), now);
    }

    pub(super) fn on_mouse_wheel(&mut self, delta_y: f64, now: Instant) {
        let mouse = self.state.mouse_mut();
        mouse.wheel = wheel_direction(delta_y);
        mouse.last_scroll_at = Some(now);
        self.dirty = true;

        // No matching release here; the sweep ends the scroll
        self.synthesize(RawInputEvent::key_down(SCROLL_KEY), now);
    }
}
