//! Keystroke Overlay - replay recorded input through the aggregation engine
//!
//! Reads a JSON-lines event script and prints every frame the overlay
//! would render.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use keystroke_overlay::{
    config::Config,
    replay::{read_script, Replay},
    report::SessionReport,
};

/// Replay an input script and print the resulting key groups
#[derive(Debug, Parser)]
#[command(name = "keystroke-overlay", version, about)]
struct Cli {
    /// Event script in JSON lines; `-` or nothing reads stdin
    script: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep a trail of past groups
    #[arg(long)]
    history: bool,

    /// Maximum groups kept in history mode
    #[arg(long)]
    max_groups: Option<usize>,

    /// Print frames as JSON lines
    #[arg(long)]
    json: bool,

    /// Write a session report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("using default config: {}", e);
            Config::default()
        }),
    };

    if cli.history {
        config.aggregation.show_history = true;
    }
    if let Some(max_groups) = cli.max_groups {
        config.aggregation.max_groups = max_groups;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(&cli)?;

    let steps = match cli.script.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            read_script(BufReader::new(file))?
        }
        _ => read_script(io::stdin().lock())?,
    };

    let mut replay = Replay::new(&config)?;
    let frames = replay.run(&steps)?;

    let mut out = io::stdout().lock();
    for frame in &frames {
        if cli.json {
            writeln!(out, "{}", serde_json::to_string(frame)?)?;
        } else {
            writeln!(out, "{:>7} ms  {}", frame.at_ms, frame.snapshot)?;
        }
    }

    if let Some(path) = &cli.report {
        SessionReport::new(replay.engine(), replay.elapsed())
            .export_json(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    if !cli.json {
        let stats = replay.engine().stats();
        writeln!(out)?;
        writeln!(out, "Total events processed: {}", stats.total_events)?;
        writeln!(out, "Groups shown: {}", stats.groups_started)?;
        writeln!(out, "Largest chord: {}", stats.max_chord_size)?;
    }

    Ok(())
}
