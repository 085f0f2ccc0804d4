//! Session report and export functionality

use crate::engine::{Engine, EngineStats, KeyGroup};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Complete session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Engine counters at the end of the session
    pub summary: EngineStats,
    /// Keys still held when the report was taken
    pub pressed_keys: Vec<String>,
    /// Groups still on screen when the report was taken
    pub final_groups: Vec<KeyGroup>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

impl SessionReport {
    /// Create a report from the engine's current state
    pub fn new(engine: &Engine, duration: Duration) -> Self {
        let now: DateTime<Utc> = Utc::now();
        let snapshot = engine.snapshot();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: duration.as_secs_f64(),
            },
            summary: engine.stats(),
            pressed_keys: snapshot.pressed_keys,
            final_groups: snapshot.groups,
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
