//! Chord grouping
//!
//! A [`KeyGroup`] is one visual "pressed together" unit. The [`GroupManager`]
//! owns the ordered sequence of groups (oldest first, last = active) and
//! reshapes it on every accepted key press.

use crate::input::is_modifier;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

/// One key, button or gesture shown on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayKey {
    /// Identity of the key
    pub name: String,
    /// Times pressed while a member of the active group (always >= 1)
    pub pressed_count: u32,
    /// Whether the key is a modifier (Shift, Ctrl, Alt, Meta, Fn)
    pub modifier: bool,
    /// Last (re-)press, used for aging
    #[serde(skip)]
    pub last_pressed_at: Instant,
}

impl DisplayKey {
    pub fn new(name: impl Into<String>, now: Instant) -> Self {
        let name = name.into();
        Self {
            modifier: is_modifier(&name),
            name,
            pressed_count: 1,
            last_pressed_at: now,
        }
    }

    /// Count another press and refresh the timestamp
    pub fn press(&mut self, now: Instant) {
        self.pressed_count = self.pressed_count.saturating_add(1);
        self.last_pressed_at = now;
    }
}

impl fmt::Display for DisplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pressed_count > 1 {
            write!(f, "{} x{}", self.name, self.pressed_count)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Keys shown together, in press order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct KeyGroup {
    keys: Vec<DisplayKey>,
}

impl KeyGroup {
    pub fn new(keys: Vec<DisplayKey>) -> Self {
        Self { keys }
    }

    pub fn single(key: DisplayKey) -> Self {
        Self { keys: vec![key] }
    }

    pub fn keys(&self) -> &[DisplayKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.iter().any(|k| k.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&DisplayKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Member names in order
    pub fn names(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.name.as_str()).collect()
    }

    /// True if any member is no longer physically held
    pub fn is_stale(&self, pressed: &HashSet<String>) -> bool {
        self.keys.iter().any(|k| !pressed.contains(&k.name))
    }

    /// Members that are still physically held
    pub fn live_subset(&self, pressed: &HashSet<String>) -> KeyGroup {
        self.retained(|k| pressed.contains(&k.name))
    }

    /// Copy of this group keeping only members matching `keep`
    pub fn retained(&self, mut keep: impl FnMut(&DisplayKey) -> bool) -> KeyGroup {
        KeyGroup {
            keys: self.keys.iter().filter(|k| keep(*k)).cloned().collect(),
        }
    }

    /// Copy of this group without the named member
    pub fn without(&self, name: &str) -> KeyGroup {
        self.retained(|k| k.name != name)
    }

    /// Copy of this group with `key` appended
    pub fn with(&self, key: DisplayKey) -> KeyGroup {
        let mut keys = self.keys.clone();
        keys.push(key);
        KeyGroup { keys }
    }
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}", key)?;
        }
        f.write_str("]")
    }
}

/// Grouping behavior, taken from the aggregation config at call time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingMode {
    /// Keep a bounded trail of groups instead of only the live one
    pub show_history: bool,
    /// Bound on retained groups in history mode
    pub max_groups: usize,
}

/// What a press did to the group sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupChange {
    /// A new group was appended (or replaced everything in replace mode)
    Started,
    /// The active group was extended or rebuilt in place
    Updated,
}

/// Owner of the ordered group sequence
#[derive(Debug, Clone, Default)]
pub struct GroupManager {
    groups: Vec<KeyGroup>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[KeyGroup] {
        &self.groups
    }

    /// The last group, if any
    pub fn active(&self) -> Option<&KeyGroup> {
        self.groups.last()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Swap in a new sequence
    pub fn replace_all(&mut self, groups: Vec<KeyGroup>) {
        self.groups = groups;
    }

    /// Apply an accepted press of `name`.
    ///
    /// `pressed` is the physical set after the press was recorded, so it
    /// always contains `name`. The next sequence is built separately and
    /// swapped in at the end.
    pub fn press(
        &mut self,
        name: &str,
        pressed: &HashSet<String>,
        mode: GroupingMode,
        now: Instant,
    ) -> GroupChange {
        let (mut next, change) = match self.groups.split_last() {
            Some((last, older)) if last.contains(name) => {
                Self::press_again(older, last, name, pressed, mode, now)
            }
            Some((last, older)) if pressed.len() > 1 => {
                Self::extend(older, last, name, pressed, mode, now)
            }
            _ => (self.start_new(name, mode, now), GroupChange::Started),
        };

        if mode.show_history && next.len() > mode.max_groups {
            let excess = next.len() - mode.max_groups;
            next = next.split_off(excess);
        }

        self.groups = next;
        change
    }

    /// Remove one member from the active group, dropping the group if it
    /// empties. Returns whether anything was removed.
    pub fn remove_from_active(&mut self, name: &str) -> bool {
        let Some(last) = self.groups.last() else {
            return false;
        };
        if !last.contains(name) {
            return false;
        }

        let trimmed = last.without(name);
        let mut next = self.groups[..self.groups.len() - 1].to_vec();
        if !trimmed.is_empty() {
            next.push(trimmed);
        }
        self.groups = next;
        true
    }

    // The key is already a member of the active group.
    fn press_again(
        older: &[KeyGroup],
        last: &KeyGroup,
        name: &str,
        pressed: &HashSet<String>,
        mode: GroupingMode,
        now: Instant,
    ) -> (Vec<KeyGroup>, GroupChange) {
        let mut next = older.to_vec();

        if mode.show_history && last.len() > 1 {
            // Re-struck inside a combo: new frame with the live chord, the
            // re-struck key counted afresh.
            let frame = KeyGroup::new(
                last.keys()
                    .iter()
                    .filter(|k| pressed.contains(&k.name))
                    .map(|k| {
                        if k.name == name {
                            DisplayKey::new(name, now)
                        } else {
                            k.clone()
                        }
                    })
                    .collect(),
            );
            next.push(last.clone());
            next.push(frame);
            return (next, GroupChange::Started);
        }

        let rebuilt = KeyGroup::new(
            last.keys()
                .iter()
                .filter_map(|k| {
                    if k.name == name {
                        let mut bumped = k.clone();
                        bumped.press(now);
                        Some(bumped)
                    } else if pressed.contains(&k.name) {
                        Some(k.clone())
                    } else {
                        None
                    }
                })
                .collect(),
        );
        next.push(rebuilt);
        (next, GroupChange::Updated)
    }

    // A new key joins while others are held.
    fn extend(
        older: &[KeyGroup],
        last: &KeyGroup,
        name: &str,
        pressed: &HashSet<String>,
        mode: GroupingMode,
        now: Instant,
    ) -> (Vec<KeyGroup>, GroupChange) {
        let mut next = older.to_vec();
        let key = DisplayKey::new(name, now);

        if mode.show_history && last.is_stale(pressed) {
            next.push(last.clone());
            next.push(last.live_subset(pressed).with(key));
            return (next, GroupChange::Started);
        }

        next.push(last.with(key));
        (next, GroupChange::Updated)
    }

    // Only this key is held, or nothing has been shown yet.
    fn start_new(&self, name: &str, mode: GroupingMode, now: Instant) -> Vec<KeyGroup> {
        let group = KeyGroup::single(DisplayKey::new(name, now));
        if mode.show_history {
            let mut next = self.groups.clone();
            next.push(group);
            next
        } else {
            vec![group]
        }
    }
}
