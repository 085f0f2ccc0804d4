//! Periodic aging of released keys and finished scrolls

use super::KeyGroup;
use crate::input::MouseState;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Result of a linger sweep that changed something
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    /// Surviving groups, empty ones removed
    pub groups: Vec<KeyGroup>,
    /// Number of keys removed
    pub evicted: usize,
}

/// Drop every key that is neither held nor within its linger window.
///
/// Returns `None` when no group lost a member, so callers can skip
/// publishing.
pub fn sweep_groups(
    groups: &[KeyGroup],
    pressed: &HashSet<String>,
    linger: Duration,
    now: Instant,
) -> Option<Sweep> {
    let mut evicted = 0;
    let mut survivors = Vec::with_capacity(groups.len());

    for group in groups {
        let kept = group.retained(|key| {
            pressed.contains(&key.name)
                || now.saturating_duration_since(key.last_pressed_at) < linger
        });
        evicted += group.len() - kept.len();
        if !kept.is_empty() {
            survivors.push(kept);
        }
    }

    if evicted == 0 {
        return None;
    }

    Some(Sweep {
        groups: survivors,
        evicted,
    })
}

/// Whether the last wheel event is older than the scroll linger
pub fn scroll_expired(mouse: &MouseState, scroll_linger: Duration, now: Instant) -> bool {
    match mouse.last_scroll_at {
        Some(at) => now.saturating_duration_since(at) > scroll_linger,
        None => false,
    }
}
