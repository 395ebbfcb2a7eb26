use std::path::PathBuf;

use eyecoord_core::constants::{CSV_HEADER, SETTINGS_KEY};
use eyecoord_core::store::load_settings;
use eyecoord_core::{calculate_visual_angle, AxisMode, MemoryStore, Settings, SettingsStore, Theme};
use host::{load_script, run_script, JsonFileStore, Script};

fn fixture(name: &str) -> Script {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    load_script(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn inline(json: serde_json::Value) -> Script {
    serde_json::from_value(json).expect("script should parse")
}

#[test]
fn free_session_stays_inside_the_play_region() {
    let script = fixture("free_session.json");
    let report = run_script(&script, MemoryStore::new(), 11).unwrap();

    assert_eq!(report.frames, 600);
    assert_eq!(report.axis_mode, AxisMode::Free);
    assert!(report.retargets > 1, "expected several waypoints, got {}", report.retargets);
    assert!(
        report.max_containment_violation < 1e-6,
        "shape left the region by {} px",
        report.max_containment_violation
    );
}

#[test]
fn scripted_marks_are_logged_at_their_frame() {
    let script = fixture("free_session.json");
    let report = run_script(&script, MemoryStore::new(), 11).unwrap();

    let times: Vec<i64> = report.entries().iter().map(|e| e.t_ms_since_session_start).collect();
    assert_eq!(times, vec![2000, 4500, 8250]);

    let first = &report.entries()[0];
    assert_eq!(first.iso_timestamp, "2026-10-19T14:03:24.000Z");
    assert_eq!(first.axis_mode, "free");
    assert_eq!(first.turn_min_s, 0.5);
    assert_eq!(first.turn_max_s, 1.5);
    assert_eq!(first.speed_px_s, 320.0);
    assert!(first.norm_x.abs() <= 1.0 && first.norm_y.abs() <= 1.0);
}

#[test]
fn same_seed_replays_the_same_session() {
    let script = fixture("free_session.json");
    let a = run_script(&script, MemoryStore::new(), 99).unwrap();
    let b = run_script(&script, MemoryStore::new(), 99).unwrap();

    assert_eq!(a.final_position, b.final_position);
    assert_eq!(a.retargets, b.retargets);
    assert_eq!(a.entries(), b.entries());
}

#[test]
fn orbit_marks_lie_on_the_circle() {
    let script = fixture("orbit_session.json");
    let report = run_script(&script, MemoryStore::new(), 5).unwrap();

    assert_eq!(report.axis_mode, AxisMode::Circle);
    assert_eq!(report.entries().len(), 3);

    let limit = calculate_visual_angle(150.0, 60.0, 110.0) + 0.1;
    for entry in report.entries() {
        let dx = (entry.x_px - 512) as f64;
        let dy = (entry.y_px - 384) as f64;
        let r = (dx * dx + dy * dy).sqrt();
        assert!((r - 150.0).abs() <= 1.5, "radius {} off the orbit", r);
        assert!(entry.ecc_deg_x.abs() <= limit);
        assert_eq!(entry.theme, "dark");
        assert_eq!(entry.shape, "square");
        assert_eq!(entry.circle_radius_px, 150.0);
    }
}

#[test]
fn csv_export_uses_the_dated_file_name() {
    let script = fixture("orbit_session.json");
    let report = run_script(&script, MemoryStore::new(), 5).unwrap();

    let export = report.log.export(report.started_at.date_naive()).unwrap();
    assert_eq!(export.file_name, "eye-coordination-log-2026-10-19.csv");

    let mut lines = export.contents.lines();
    let header = lines.next().unwrap();
    assert_eq!(header.split(',').count(), CSV_HEADER.len());
    assert_eq!(lines.count(), 3);
}

#[test]
fn empty_log_has_nothing_to_export() {
    let script = inline(serde_json::json!({ "duration_s": 1 }));
    let report = run_script(&script, MemoryStore::new(), 1).unwrap();

    assert!(report.entries().is_empty());
    let err = report.log.export(report.started_at.date_naive()).unwrap_err();
    assert_eq!(err.to_string(), "No data to export");
}

#[test]
fn script_settings_apply_from_the_first_waypoint() {
    let script = inline(serde_json::json!({
        "viewport": { "width": 1280, "height": 720 },
        "duration_s": 0.5,
        "settings": { "axisMode": "vertical", "pauseAtTurns": 0 }
    }));
    for seed in 0..5 {
        let report = run_script(&script, MemoryStore::new(), seed).unwrap();
        assert_eq!(report.final_position.x, 640.0, "seed {} drifted sideways", seed);
        assert_ne!(report.final_position.y, 360.0, "seed {} never moved", seed);
    }
}

#[test]
fn script_settings_are_persisted_before_the_run() {
    let mut store = MemoryStore::new();
    let script = inline(serde_json::json!({
        "duration_s": 0.1,
        "settings": { "axisMode": "vertical", "speed": 250 }
    }));
    run_script(&script, &mut store, 1).unwrap();

    let saved = load_settings(&store);
    assert_eq!(saved.axis_mode, AxisMode::Vertical);
    assert_eq!(saved.speed, 250.0);
}

#[test]
fn pause_for_the_whole_run_keeps_the_shape_centred() {
    let script = inline(serde_json::json!({
        "viewport": { "width": 800, "height": 600 },
        "duration_s": 2,
        "events": [ { "at_s": 0.0, "action": { "key": " " } } ]
    }));
    let report = run_script(&script, MemoryStore::new(), 2).unwrap();

    assert_eq!(report.final_position.x, 400.0);
    assert_eq!(report.final_position.y, 300.0);
}

#[test]
fn keys_are_ignored_while_an_input_has_focus() {
    let script = inline(serde_json::json!({
        "duration_s": 1,
        "events": [
            { "at_s": 0.2, "action": { "key": "d", "input_focused": true } },
            { "at_s": 0.4, "action": { "key": "d" } }
        ]
    }));
    let report = run_script(&script, MemoryStore::new(), 3).unwrap();

    assert_eq!(report.entries().len(), 1);
    assert_eq!(report.entries()[0].t_ms_since_session_start, 400);
}

#[test]
fn events_after_the_run_are_dropped() {
    let script = inline(serde_json::json!({
        "duration_s": 1,
        "events": [ { "at_s": 5.0, "action": "mark" } ]
    }));
    let report = run_script(&script, MemoryStore::new(), 4).unwrap();
    assert!(report.entries().is_empty());
}

#[test]
fn reset_clears_the_log_and_restarts_the_clock() {
    let script = inline(serde_json::json!({
        "duration_s": 3,
        "settings": { "speed": 500, "axisMode": "vertical" },
        "events": [
            { "at_s": 0.5, "action": "mark" },
            { "at_s": 1.0, "action": "reset" },
            { "at_s": 2.5, "action": "mark" }
        ]
    }));
    let mut store = MemoryStore::new();
    let report = run_script(&script, &mut store, 6).unwrap();

    assert_eq!(report.entries().len(), 1);
    let entry = &report.entries()[0];
    assert_eq!(entry.t_ms_since_session_start, 1500);
    assert_eq!(entry.axis_mode, "horizontal");
    assert_eq!(load_settings(&store), Settings::default());
}

#[test]
fn invalid_overrides_fall_back_per_key() {
    let script = inline(serde_json::json!({
        "duration_s": 0.5,
        "settings": { "axisMode": "zigzag", "speed": 275, "opacity": "half" },
        "events": [ { "at_s": 0.25, "action": "mark" } ]
    }));
    let report = run_script(&script, MemoryStore::new(), 8).unwrap();

    let entry = &report.entries()[0];
    assert_eq!(entry.axis_mode, "horizontal");
    assert_eq!(entry.speed_px_s, 275.0);
    assert_eq!(entry.opacity, 100);
}

#[test]
fn invalid_scripts_are_rejected() {
    let zero_fps = inline(serde_json::json!({ "fps": 0, "duration_s": 1 }));
    assert!(run_script(&zero_fps, MemoryStore::new(), 1).is_err());

    let negative = inline(serde_json::json!({ "duration_s": -2 }));
    assert!(run_script(&negative, MemoryStore::new(), 1).is_err());
}

#[test]
fn file_store_persists_settings_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let script = inline(serde_json::json!({
        "duration_s": 1,
        "settings": { "axisMode": "free" },
        "events": [ { "at_s": 0.5, "action": "toggle_theme" } ]
    }));
    run_script(&script, JsonFileStore::new(&path), 1).unwrap();

    let store = JsonFileStore::new(&path);
    let raw = store.load(SETTINGS_KEY).unwrap().expect("settings should be saved");
    assert!(raw.contains("\"axisMode\":\"free\""));

    let settings = load_settings(&store);
    assert_eq!(settings.theme, Theme::Dark);
    assert_eq!(settings.axis_mode, AxisMode::Free);

    // The next run starts from the persisted settings.
    let plain = inline(serde_json::json!({
        "duration_s": 0.5,
        "events": [ { "at_s": 0.1, "action": "mark" } ]
    }));
    let report = run_script(&plain, JsonFileStore::new(&path), 2).unwrap();
    assert_eq!(report.entries()[0].theme, "dark");
}

#[test]
fn corrupt_file_store_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(store.load(SETTINGS_KEY).is_err());
    assert_eq!(load_settings(&store), Settings::default());
}
