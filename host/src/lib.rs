use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use eyecoord_core::{
    AxisMode, Confirm, Frame, KeyOutcome, LogEntry, Modifiers, Session, SessionLog, SettingsStore,
    StoreError, Vec2, Viewport,
};
use eyecoord_core::store::{load_settings, save_settings};
use serde::{Deserialize, Serialize};

/// Scripted training session: a viewport, a run length and timed user actions
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default = "default_fps")]
    pub fps: u32,
    pub duration_s: f64,
    /// Partial settings, merged over whatever the store holds
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
    /// Wall-clock time of frame zero; defaults to now
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

fn default_viewport() -> Viewport {
    Viewport::new(1280.0, 720.0)
}

fn default_fps() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    pub at_s: f64,
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptAction {
    Named(NamedAction),
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        input_focused: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedAction {
    Mark,
    Pause,
    Resume,
    ToggleTheme,
    Reset,
}

/// Outcome of a scripted run
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub frames: u64,
    pub retargets: u64,
    pub axis_mode: AxisMode,
    pub final_position: Vec2,
    pub final_eccentricity_deg: f64,
    /// Largest distance the shape was seen outside its inset region (px)
    pub max_containment_violation: f64,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub log: SessionLog,
}

impl SessionReport {
    pub fn entries(&self) -> &[LogEntry] {
        self.log.entries()
    }
}

pub fn load_script(path: &Path) -> Result<Script, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    let script: Script = serde_json::from_str(&json)?;
    Ok(script)
}

/// Settings store backed by one JSON object of string values on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Scripted resets confirm without asking.
struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!("auto-confirming: {}", prompt);
        true
    }
}

/// Run `script` on a synthetic clock, frame by frame.
///
/// Frame `i` happens at `i * 1000 / fps` ms. Events fire before the first
/// frame at or after their time; events past the end of the run are
/// dropped with a warning.
pub fn run_script<S: SettingsStore>(
    script: &Script,
    mut store: S,
    seed: u64,
) -> Result<SessionReport, Box<dyn std::error::Error>> {
    if script.fps == 0 {
        return Err("fps must be positive".into());
    }
    if !script.duration_s.is_finite() || script.duration_s < 0.0 {
        return Err(format!("invalid duration: {}", script.duration_s).into());
    }

    let started_at = script.started_at.unwrap_or_else(Utc::now);
    let total_frames = (script.duration_s * f64::from(script.fps)).round() as u64;

    let mut settings = load_settings(&store);
    if let Some(overrides) = &script.settings {
        settings = settings.merged_lenient(overrides.clone())?;
        save_settings(&mut store, &settings);
    }
    let mut session = Session::with_settings(store, settings, script.viewport, seed, 0.0);

    let mut events: Vec<&ScriptEvent> = script.events.iter().collect();
    events.sort_by(|a, b| a.at_s.total_cmp(&b.at_s));
    let mut pending = events.into_iter().peekable();

    let mut confirm = AutoConfirm;
    let mut max_violation: f64 = 0.0;
    let mut last_frame = session.start(0.0);

    for i in 1..=total_frames {
        let now = i as f64 * 1000.0 / f64::from(script.fps);
        while let Some(event) = pending.next_if(|e| e.at_s * 1000.0 <= now) {
            apply(&mut session, event, now, wall_clock(started_at, now), &mut confirm);
        }
        last_frame = session.tick(now);
        max_violation = max_violation.max(containment_violation(&session, &last_frame));
    }

    let dropped = pending.count();
    if dropped > 0 {
        tracing::warn!("{} event(s) scheduled after the end of the run were dropped", dropped);
    }
    session.stop();

    tracing::info!(
        "run finished: {} frames, {} retargets, {} marks",
        total_frames,
        session.engine().retarget_count(),
        session.log().len()
    );

    Ok(SessionReport {
        frames: total_frames,
        retargets: session.engine().retarget_count(),
        axis_mode: session.settings().axis_mode,
        final_position: last_frame.position,
        final_eccentricity_deg: last_frame.eccentricity.signed_degrees(),
        max_containment_violation: max_violation,
        started_at,
        log: session.log().clone(),
    })
}

fn wall_clock(started_at: DateTime<Utc>, now_ms: f64) -> DateTime<Utc> {
    started_at + Duration::milliseconds(now_ms.round() as i64)
}

fn apply<S: SettingsStore>(
    session: &mut Session<S>,
    event: &ScriptEvent,
    now: f64,
    wall: DateTime<Utc>,
    confirm: &mut AutoConfirm,
) {
    match &event.action {
        ScriptAction::Named(NamedAction::Mark) => {
            let entry = session.mark(now, wall);
            tracing::info!("diplopia marked at {}", entry.summary());
        }
        ScriptAction::Named(NamedAction::Pause) => {
            if !session.engine().is_paused() {
                session.toggle_pause(now);
            }
        }
        ScriptAction::Named(NamedAction::Resume) => {
            if session.engine().is_paused() {
                session.toggle_pause(now);
            }
        }
        ScriptAction::Named(NamedAction::ToggleTheme) => {
            session.toggle_theme();
        }
        ScriptAction::Named(NamedAction::Reset) => {
            session.reset(now, confirm);
        }
        ScriptAction::Key { key, ctrl, meta, input_focused } => {
            let modifiers = Modifiers { ctrl: *ctrl, meta: *meta };
            let outcome = session.handle_key(key, modifiers, *input_focused, now, wall, confirm);
            if outcome == KeyOutcome::Ignored {
                tracing::debug!("key {:?} ignored", key);
            }
        }
    }
}

/// Orbit mode is not clamped to the region, so only waypoint modes count.
fn containment_violation<S: SettingsStore>(session: &Session<S>, frame: &Frame) -> f64 {
    if session.settings().axis_mode.is_orbit() {
        return 0.0;
    }
    let half = session.settings().half_footprint();
    let clamped = session.engine().region().clamp_inset(frame.position, half);
    clamped.distance(frame.position)
}
