//! Scripted replay of recorded input
//!
//! A script is a JSON-lines file, one [`ScriptStep`] per line:
//!
//! ```text
//! # Ctrl+C, then nothing for four seconds
//! {"step":"input","at_ms":0,"event":{"type":"KeyEvent","pressed":true,"name":"Ctrl"}}
//! {"step":"input","at_ms":40,"event":{"type":"KeyEvent","pressed":true,"name":"C"}}
//! {"step":"idle","at_ms":4000}
//! ```
//!
//! [`Replay`] drives an [`Engine`] on a simulated clock, running the
//! eviction tick at the configured interval between steps, and collects
//! every published snapshot as a [`Frame`].

use crate::config::{Config, ConfigError};
use crate::engine::{Engine, Snapshot};
use crate::input::RawInputEvent;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Latest script offset a replay accepts: one year
pub const MAX_SCRIPT_MS: u64 = 365 * 24 * 60 * 60 * 1000;

/// Error type for replay operations
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A script line is not a valid step
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// A step is timestamped before the one preceding it
    #[error("step at {at_ms} ms is earlier than current time {current_ms} ms")]
    OutOfOrder { at_ms: u64, current_ms: u64 },
    /// A step is timestamped past [`MAX_SCRIPT_MS`]
    #[error("step at {at_ms} ms is past the {max_ms} ms limit")]
    TooLate { at_ms: u64, max_ms: u64 },
    /// IO error reading the script
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Deliver an event at the given offset
    Input { at_ms: u64, event: RawInputEvent },
    /// Only advance the clock
    Idle { at_ms: u64 },
}

impl ScriptStep {
    pub fn at_ms(&self) -> u64 {
        match self {
            Self::Input { at_ms, .. } | Self::Idle { at_ms } => *at_ms,
        }
    }
}

/// Parse a script, skipping blank lines and `#` comments
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ReplayError> {
    read_script(text.as_bytes())
}

/// Read a script from any buffered reader
pub fn read_script(reader: impl BufRead) -> Result<Vec<ScriptStep>, ReplayError> {
    let mut steps = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
            line: index + 1,
            source,
        })?;
        steps.push(step);
    }
    Ok(steps)
}

/// A snapshot published at a point in script time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub at_ms: u64,
    pub snapshot: Snapshot,
}

/// Engine plus simulated clock
pub struct Replay {
    engine: Engine,
    updates: mpsc::Receiver<Snapshot>,
    origin: Instant,
    tick_interval_ms: u64,
    now_ms: u64,
    /// `None` once the tick schedule runs past `u64` milliseconds
    next_tick_ms: Option<u64>,
}

impl Replay {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.scheduler.validate()?;
        let mut engine = Engine::new(config.aggregation.clone())?;
        let updates = engine.subscribe();
        let tick_interval_ms = config.scheduler.tick_interval_ms;

        Ok(Self {
            engine,
            updates,
            origin: Instant::now(),
            tick_interval_ms,
            now_ms: 0,
            next_tick_ms: Some(tick_interval_ms),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Script time reached so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    /// Run every due tick, then apply the step
    pub fn step(&mut self, step: &ScriptStep) -> Result<Vec<Frame>, ReplayError> {
        let at_ms = step.at_ms();
        if at_ms > MAX_SCRIPT_MS {
            return Err(ReplayError::TooLate {
                at_ms,
                max_ms: MAX_SCRIPT_MS,
            });
        }
        if at_ms < self.now_ms {
            return Err(ReplayError::OutOfOrder {
                at_ms,
                current_ms: self.now_ms,
            });
        }

        let mut frames = self.advance_to(at_ms);
        if let ScriptStep::Input { event, .. } = step {
            self.engine.handle_at(event, self.instant(at_ms));
            frames.extend(self.drain(at_ms));
        }
        self.now_ms = at_ms;
        Ok(frames)
    }

    /// Replay a whole script
    pub fn run(&mut self, steps: &[ScriptStep]) -> Result<Vec<Frame>, ReplayError> {
        debug!("replaying {} step(s)", steps.len());
        let mut frames = Vec::new();
        for step in steps {
            frames.extend(self.step(step)?);
        }
        Ok(frames)
    }

    /// Run the ticks due up to `at_ms`. Ticks before the engine's next
    /// deadline cannot change anything, so the schedule skips ahead to the
    /// first tick at or after it, but never past the first tick after
    /// `at_ms`: the next step may bring an earlier deadline.
    fn advance_to(&mut self, at_ms: u64) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(tick_ms) = self.next_tick_ms.filter(|&t| t <= at_ms) {
            // `None` here means no tick fits in `u64`
            let horizon = self.tick_at_or_after(at_ms.saturating_add(1));
            let due = match self.deadline_ms().map(|ms| self.tick_at_or_after(ms)) {
                Some(Some(due)) => Some(horizon.map_or(due, |h| due.min(h))),
                Some(None) | None => horizon,
            };
            if !matches!(due, Some(due) if due <= tick_ms) {
                trace!("skipping ticks from {} ms to {:?}", tick_ms, due);
                self.next_tick_ms = due;
                continue;
            }

            self.engine.tick_at(self.instant(tick_ms));
            frames.extend(self.drain(tick_ms));
            self.next_tick_ms = tick_ms.checked_add(self.tick_interval_ms);
        }
        frames
    }

    /// The engine's next deadline in script time, rounded up to a whole ms
    fn deadline_ms(&self) -> Option<u64> {
        let deadline = self.engine.next_deadline()?;
        let nanos = deadline.saturating_duration_since(self.origin).as_nanos();
        let ms = nanos.div_ceil(1_000_000);
        Some(u64::try_from(ms).unwrap_or(u64::MAX))
    }

    /// First scheduled tick at or after `target_ms`, if it fits in `u64`
    fn tick_at_or_after(&self, target_ms: u64) -> Option<u64> {
        target_ms
            .div_ceil(self.tick_interval_ms)
            .max(1)
            .checked_mul(self.tick_interval_ms)
    }

    fn drain(&self, at_ms: u64) -> Vec<Frame> {
        self.updates
            .try_iter()
            .map(|snapshot| Frame { at_ms, snapshot })
            .collect()
    }

    fn instant(&self, at_ms: u64) -> Instant {
        self.origin + Duration::from_millis(at_ms)
    }
}
