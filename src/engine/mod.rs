//! Input aggregation engine
//!
//! The [`Engine`] turns the raw input stream into an ordered, bounded
//! sequence of [`KeyGroup`]s for an overlay to render. It is a single-writer
//! state machine: the capture hook calls [`Engine::handle`] for every event,
//! a timer calls [`Engine::tick`], and renderers read [`Snapshot`]s.
//!
//! Everything runs synchronously on the caller's thread. Synthetic events
//! produced for pointer gestures are dispatched inline, so an external event
//! and all of its consequences are applied (and published once) before the
//! next external event is processed. To share an engine across threads, put
//! the whole engine behind one `Mutex` or drive it from a single consumer
//! of an event channel.
//!
//! ## Example
//!
//! ```
//! use keystroke_overlay::config::AggregationConfig;
//! use keystroke_overlay::engine::Engine;
//! use keystroke_overlay::input::RawInputEvent;
//!
//! let mut engine = Engine::new(AggregationConfig::default()).unwrap();
//! let updates = engine.subscribe();
//!
//! engine.handle(&RawInputEvent::key_down("Ctrl"));
//! engine.handle(&RawInputEvent::key_down("C"));
//!
//! let latest = updates.try_iter().last().unwrap();
//! assert_eq!(latest.to_string(), "[Ctrl + C]");
//! ```

mod eviction;
mod gesture;
mod group;
mod snapshot;

pub use eviction::{scroll_expired, sweep_groups, Sweep};
pub use gesture::{wheel_direction, DRAG_KEY, SCROLL_KEY};
pub use group::{DisplayKey, GroupChange, GroupManager, GroupingMode, KeyGroup};
pub use snapshot::{MouseView, Snapshot};

use crate::config::{AggregationConfig, ConfigError};
use crate::input::{MouseState, PhysicalState, Position, RawInputEvent, UNKNOWN_KEY};
use log::{debug, trace};
use serde::Serialize;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Counters describing what the engine has processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EngineStats {
    /// Events received from the capture hook
    pub total_events: u64,
    /// Pseudo-key events produced for gestures
    pub synthetic_events: u64,
    /// Hook presses dropped because the key was already held
    pub ignored_repeats: u64,
    /// Groups created
    pub groups_started: u64,
    /// Keys removed by linger eviction
    pub keys_evicted: u64,
    /// Largest group ever displayed
    pub max_chord_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    External,
    Synthetic,
}

/// The aggregation state machine
pub struct Engine {
    config: AggregationConfig,
    state: PhysicalState,
    groups: GroupManager,
    subscribers: Vec<mpsc::Sender<Snapshot>>,
    stats: EngineStats,
    /// Observable state changed since the last publish
    dirty: bool,
}

impl Engine {
    /// Create an engine with empty state.
    ///
    /// Fails if the configuration has out-of-range bounds; after this point
    /// no operation can fail.
    pub fn new(config: AggregationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: PhysicalState::new(),
            groups: GroupManager::new(),
            subscribers: Vec::new(),
            stats: EngineStats::default(),
            dirty: false,
        })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Swap the configuration. Existing groups are left as they are; the new
    /// values apply from the next event or tick.
    pub fn set_config(&mut self, config: AggregationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        debug!(
            "config updated: history={} max_groups={}",
            config.show_history, config.max_groups
        );
        self.config = config;
        Ok(())
    }

    /// Process one event from the capture hook, timestamped now
    pub fn handle(&mut self, event: &RawInputEvent) {
        self.handle_at(event, Instant::now());
    }

    /// Process one event from the capture hook at an explicit time
    pub fn handle_at(&mut self, event: &RawInputEvent, now: Instant) {
        self.stats.total_events += 1;
        self.dispatch(event, now, Origin::External);
        self.publish();
    }

    /// Run the eviction sweep, timestamped now
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Run the eviction sweep at an explicit time.
    ///
    /// Ends a finished scroll, then drops keys that are neither held nor
    /// within the linger window. Publishes only if something changed.
    pub fn tick_at(&mut self, now: Instant) {
        if scroll_expired(self.state.mouse(), self.config.scroll_linger(), now) {
            debug!("scroll ended");
            let mouse = self.state.mouse_mut();
            mouse.wheel = 0;
            mouse.last_scroll_at = None;
            self.dirty = true;
            self.synthesize(RawInputEvent::key_up(SCROLL_KEY), now);
        }

        if let Some(sweep) = sweep_groups(
            self.groups.groups(),
            self.state.pressed_keys(),
            self.config.linger_duration(),
            now,
        ) {
            debug!("evicted {} key(s)", sweep.evicted);
            self.stats.keys_evicted += sweep.evicted as u64;
            self.groups.replace_all(sweep.groups);
            self.dirty = true;
        }

        self.publish();
    }

    /// Earliest time at which [`Engine::tick_at`] would change anything,
    /// or `None` if no tick can until the next event.
    ///
    /// Timer drivers can use this to skip ticks that would do nothing.
    pub fn next_deadline(&self) -> Option<Instant> {
        // a scroll ends once its age strictly exceeds the linger
        let scroll_end = self.state.mouse().last_scroll_at.and_then(|at| {
            at.checked_add(self.config.scroll_linger() + Duration::from_nanos(1))
        });

        let linger = self.config.linger_duration();
        let pressed = self.state.pressed_keys();
        let key_expiry = self
            .groups
            .groups()
            .iter()
            .flat_map(|g| g.keys())
            .filter(|k| !pressed.contains(&k.name))
            .filter_map(|k| k.last_pressed_at.checked_add(linger))
            .min();

        match (scroll_end, key_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Register an observer. Every state change after this call delivers one
    /// [`Snapshot`]; dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<Snapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Copy of the current observable state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pressed_keys: self.state.pressed_sorted(),
            pressed_mouse_button: self.state.pressed_mouse_button(),
            mouse: MouseView::from(self.state.mouse()),
            groups: self.groups.groups().to_vec(),
        }
    }

    pub fn groups(&self) -> &[KeyGroup] {
        self.groups.groups()
    }

    pub fn mouse(&self) -> &MouseState {
        self.state.mouse()
    }

    pub fn is_pressed(&self, name: &str) -> bool {
        self.state.is_pressed(name)
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Clear all input state, groups and counters. Configuration and
    /// subscribers are kept.
    pub fn reset(&mut self) {
        self.state.reset();
        self.groups.clear();
        self.stats = EngineStats::default();
        self.dirty = true;
        self.publish();
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode {
            show_history: self.config.show_history,
            max_groups: self.config.max_groups,
        }
    }

    fn dispatch(&mut self, event: &RawInputEvent, now: Instant, origin: Origin) {
        trace!("{:?} {} event: {:?}", origin, event.kind(), event);
        if origin == Origin::Synthetic {
            self.stats.synthetic_events += 1;
        }

        match event {
            RawInputEvent::KeyEvent {
                pressed: true,
                name,
            } => self.on_key_press(name, now, origin),
            RawInputEvent::KeyEvent {
                pressed: false,
                name,
            } => self.on_key_release(name),
            RawInputEvent::MouseButtonEvent {
                pressed: true,
                button,
            } => self.on_mouse_button_press(*button, now),
            RawInputEvent::MouseButtonEvent {
                pressed: false,
                button,
            } => self.on_mouse_button_release(*button, now),
            RawInputEvent::MouseMoveEvent { x, y } => {
                self.on_mouse_move(Position::new(*x, *y), now)
            }
            RawInputEvent::MouseWheelEvent { delta_y, .. } => self.on_mouse_wheel(*delta_y, now),
        }
    }

    /// Feed a gesture's pseudo-key event back through the dispatcher
    fn synthesize(&mut self, event: RawInputEvent, now: Instant) {
        self.dispatch(&event, now, Origin::Synthetic);
    }

    fn on_key_press(&mut self, name: &str, now: Instant, origin: Origin) {
        if !self.state.press(name) {
            // Held pseudo-keys are re-pressed by every wheel event; only
            // hook-level key repeat counts
            if origin == Origin::External {
                self.stats.ignored_repeats += 1;
            }
            return;
        }
        self.dirty = true;

        // Tracked as held, never displayed
        if name == UNKNOWN_KEY {
            return;
        }

        let mode = self.mode();
        let change = self.groups.press(name, self.state.pressed_keys(), mode, now);
        if change == GroupChange::Started {
            self.stats.groups_started += 1;
            debug!("group started by {}", name);
        }

        if let Some(active) = self.groups.active() {
            self.stats.max_chord_size = self.stats.max_chord_size.max(active.len());
        }
    }

    fn on_key_release(&mut self, name: &str) {
        // Released keys stay in their group until the sweep ages them out
        if self.state.release(name) {
            self.dirty = true;
        }
    }

    fn publish(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}
