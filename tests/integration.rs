//! Integration tests for Keystroke Overlay
//!
//! These tests drive the engine through its public entry points the way a
//! capture hook and a timer would, and check what a renderer would see.

use keystroke_overlay::config::{AggregationConfig, Config};
use keystroke_overlay::engine::{Engine, DRAG_KEY, SCROLL_KEY};
use keystroke_overlay::input::{KeyCode, MouseButton, RawInputEvent, UNKNOWN_KEY};
use keystroke_overlay::replay::{parse_script, Replay};
use keystroke_overlay::report::SessionReport;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn engine_with(show_history: bool, max_groups: usize) -> Engine {
    Engine::new(AggregationConfig {
        show_history,
        max_groups,
        ..AggregationConfig::default()
    })
    .unwrap()
}

/// Press and release a key at the given time
fn tap(engine: &mut Engine, name: &str, at: Instant) {
    engine.handle_at(&RawInputEvent::key_down(name), at);
    engine.handle_at(&RawInputEvent::key_up(name), at + ms(20));
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[test]
fn repeated_press_is_idempotent() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 5);

    engine.handle_at(&RawInputEvent::key_down("K"), t0);
    let after_first = engine.snapshot();
    for i in 1..10 {
        engine.handle_at(&RawInputEvent::key_down("K"), t0 + ms(i * 30));
    }

    assert_eq!(engine.snapshot(), after_first);
    assert_eq!(engine.stats().ignored_repeats, 9);
}

#[test]
fn chord_growth_in_replace_mode() {
    let t0 = Instant::now();
    let mut engine = engine_with(false, 5);

    engine.handle_at(&RawInputEvent::key_down("Shift"), t0);
    engine.handle_at(&RawInputEvent::key_down("A"), t0 + ms(50));

    assert_eq!(engine.snapshot().group_names(), vec![vec!["Shift", "A"]]);
}

/// Shift then A in history mode. A key joining a fully held chord extends
/// the active group in place, so this yields one group `[Shift + A]` rather
/// than the `[Shift]`, `[Shift + A]` trail; see DESIGN.md, open question 2.
#[test]
fn chord_growth_in_history_mode_extends_held_chord() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 5);

    engine.handle_at(&RawInputEvent::key_down("Shift"), t0);
    engine.handle_at(&RawInputEvent::key_down("A"), t0 + ms(50));

    assert_eq!(engine.snapshot().group_names(), vec![vec!["Shift", "A"]]);
}

#[test]
fn history_mode_splits_after_partial_release() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 5);

    engine.handle_at(&RawInputEvent::key_down("Shift"), t0);
    tap(&mut engine, "A", t0 + ms(50));
    engine.handle_at(&RawInputEvent::key_down("B"), t0 + ms(200));

    assert_eq!(
        engine.snapshot().group_names(),
        vec![vec!["Shift", "A"], vec!["Shift", "B"]]
    );
}

#[test]
fn replace_mode_retyping_same_key_counts_presses() {
    let t0 = Instant::now();
    let mut engine = engine_with(false, 5);

    for i in 0..3 {
        tap(&mut engine, "J", t0 + ms(i * 100));
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.group_names(), vec![vec!["J"]]);
    assert_eq!(snapshot.groups[0].get("J").unwrap().pressed_count, 3);
    assert_eq!(snapshot.to_string(), "[J x3]");
}

#[test]
fn history_is_bounded_to_most_recent_chords() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 3);

    for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        tap(&mut engine, name, t0 + ms(i as u64 * 100));
    }

    assert_eq!(
        engine.snapshot().group_names(),
        vec![vec!["C"], vec!["D"], vec!["E"]]
    );
}

#[test]
fn unknown_keys_never_reach_groups() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 5);

    engine.handle_at(&RawInputEvent::from_scancode(KeyCode(29), true), t0);
    engine.handle_at(&RawInputEvent::from_scancode(KeyCode(0), true), t0 + ms(10));
    engine.handle_at(&RawInputEvent::from_scancode(KeyCode(46), true), t0 + ms(20));

    let snapshot = engine.snapshot();
    assert!(snapshot.is_pressed(UNKNOWN_KEY));
    assert!(snapshot.groups.iter().all(|g| !g.contains(UNKNOWN_KEY)));
    assert_eq!(snapshot.group_names(), vec![vec!["Ctrl", "C"]]);
}

// ---------------------------------------------------------------------------
// Eviction
// ---------------------------------------------------------------------------

#[test]
fn released_key_lingers_then_is_evicted() {
    let t0 = Instant::now();
    let mut engine = engine_with(false, 5);
    let linger = engine.config().linger_duration();

    tap(&mut engine, "A", t0);

    engine.tick_at(t0 + linger / 2);
    assert_eq!(engine.snapshot().group_names(), vec![vec!["A"]]);

    engine.tick_at(t0 + linger + ms(1));
    assert!(engine.groups().is_empty());
}

#[test]
fn eviction_keeps_held_members_of_a_group() {
    let t0 = Instant::now();
    let mut engine = engine_with(false, 5);

    engine.handle_at(&RawInputEvent::key_down("Alt"), t0);
    tap(&mut engine, "Tab", t0 + ms(10));

    engine.tick_at(t0 + ms(60_000));

    assert_eq!(engine.snapshot().group_names(), vec![vec!["Alt"]]);
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

#[test]
fn drag_replaces_button_and_ends_with_release() {
    let t0 = Instant::now();
    let mut engine = Engine::new(AggregationConfig {
        drag_threshold_px: 50.0,
        ..AggregationConfig::default()
    })
    .unwrap();

    engine.handle_at(&RawInputEvent::mouse_move(0.0, 0.0), t0);
    engine.handle_at(&RawInputEvent::button_down(MouseButton::Left), t0);
    engine.handle_at(&RawInputEvent::mouse_move(40.0, 0.0), t0 + ms(10));
    assert!(engine.is_pressed("Left"));

    engine.handle_at(&RawInputEvent::mouse_move(100.0, 0.0), t0 + ms(20));
    let snapshot = engine.snapshot();
    assert!(!snapshot.is_pressed("Left"));
    assert!(snapshot.is_pressed(DRAG_KEY));
    assert_eq!(snapshot.pressed_mouse_button, Some(MouseButton::Left));
    assert_eq!(snapshot.group_names(), vec![vec![DRAG_KEY]]);

    engine.handle_at(&RawInputEvent::button_up(MouseButton::Left), t0 + ms(30));
    let snapshot = engine.snapshot();
    assert!(snapshot.pressed_keys.is_empty());
    assert_eq!(snapshot.pressed_mouse_button, None);
    assert!(!snapshot.mouse.dragging);
}

#[test]
fn scroll_is_released_after_wheel_goes_quiet() {
    let t0 = Instant::now();
    let mut engine = engine_with(false, 5);
    let scroll_linger = engine.config().scroll_linger();

    engine.handle_at(&RawInputEvent::wheel(0.0, 3.0), t0);
    let snapshot = engine.snapshot();
    assert!(snapshot.is_pressed(SCROLL_KEY));
    assert_eq!(snapshot.mouse.wheel, 1);

    engine.tick_at(t0 + scroll_linger + ms(1));
    let snapshot = engine.snapshot();
    assert!(!snapshot.is_pressed(SCROLL_KEY));
    assert_eq!(snapshot.mouse.wheel, 0);
}

#[test]
fn pathological_sequences_do_not_panic() {
    let t0 = Instant::now();
    let mut engine = engine_with(true, 1);

    engine.handle_at(&RawInputEvent::key_up("A"), t0);
    engine.handle_at(&RawInputEvent::button_up(MouseButton::Right), t0);
    engine.handle_at(&RawInputEvent::key_up(DRAG_KEY), t0);
    engine.handle_at(&RawInputEvent::mouse_move(f64::NAN, f64::INFINITY), t0);
    engine.handle_at(&RawInputEvent::wheel(f64::NAN, f64::NAN), t0);
    engine.tick_at(t0);
    engine.tick_at(t0 + ms(1_000_000));
    engine.handle_at(&RawInputEvent::key_down(""), t0);

    assert!(engine.groups().len() <= 1);
}

// ---------------------------------------------------------------------------
// Replay and reporting
// ---------------------------------------------------------------------------

#[test]
fn replay_script_end_to_end() {
    let script = r#"
{"step":"input","at_ms":0,"event":{"type":"MouseButtonEvent","pressed":true,"button":"Left"}}
{"step":"input","at_ms":30,"event":{"type":"MouseButtonEvent","pressed":false,"button":"Left"}}
{"step":"input","at_ms":500,"event":{"type":"KeyEvent","pressed":true,"name":"Meta"}}
{"step":"input","at_ms":520,"event":{"type":"KeyEvent","pressed":true,"name":"L"}}
{"step":"idle","at_ms":1000}
"#;
    let mut config = Config::default();
    config.aggregation.show_history = true;

    let mut replay = Replay::new(&config).unwrap();
    let frames = replay.run(&parse_script(script).unwrap()).unwrap();

    let last = &frames.last().unwrap().snapshot;
    assert_eq!(last.group_names(), vec![vec!["Left"], vec!["Meta", "L"]]);
    assert_eq!(last.to_string(), "[Left] [Meta + L]");

    let report = SessionReport::new(replay.engine(), replay.elapsed());
    assert_eq!(report.summary.total_events, 4);
    assert_eq!(report.summary.groups_started, 2);
    assert_eq!(report.pressed_keys, vec!["L", "Meta"]);
}

#[test]
fn config_file_drives_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[aggregation]\nlinger_duration_ms = 100\n\n[scheduler]\ntick_interval_ms = 50\n",
    )
    .unwrap();
    let config = Config::load_from(&path).unwrap();

    let script = r#"
{"step":"input","at_ms":0,"event":{"type":"KeyEvent","pressed":true,"name":"Esc"}}
{"step":"input","at_ms":10,"event":{"type":"KeyEvent","pressed":false,"name":"Esc"}}
{"step":"idle","at_ms":500}
"#;
    let mut replay = Replay::new(&config).unwrap();
    let frames = replay.run(&parse_script(script).unwrap()).unwrap();

    let last = frames.last().unwrap();
    assert_eq!(last.at_ms, 100);
    assert!(last.snapshot.groups.is_empty());
}
