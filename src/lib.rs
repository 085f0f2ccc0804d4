//! Keystroke Overlay - input aggregation for live keyboard and mouse overlays
//!
//! Turns a raw stream of key, button, pointer and wheel events into an
//! ordered, bounded sequence of key groups that an overlay can render.
//! Capture and rendering live outside this crate.

pub mod config;
pub mod engine;
pub mod input;
pub mod replay;
pub mod report;

pub use config::Config;
pub use engine::{Engine, KeyGroup, Snapshot};
pub use input::{MouseButton, RawInputEvent};
