//! Session controller.
//!
//! Owns the engine, the diplopia log and the settings store, and applies
//! the discrete user actions (settings edits, pause, theme, mark, reset)
//! between frames. All collaborators are injected, so a session runs the
//! same way under a browser shell, a terminal driver or a unit test.

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::{Settings, Theme};
use crate::constants::RESET_PROMPT;
use crate::engine::{Engine, Frame};
use crate::error::LogError;
use crate::geometry::Viewport;
use crate::keymap::{self, Command, Modifiers};
use crate::log::{CsvExport, LogEntry, SessionLog};
use crate::store::{self, SettingsStore};

/// Confirmation collaborator (a modal dialog in the browser shell)
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What a key press did
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Unbound key, or an input had focus
    Ignored,
    /// New pause state
    Paused(bool),
    /// Whether the reset was confirmed and performed
    Reset(bool),
    ThemeChanged(Theme),
    Marked(LogEntry),
}

pub struct Session<S: SettingsStore> {
    engine: Engine,
    log: SessionLog,
    store: S,
    session_start: f64,
}

impl<S: SettingsStore> Session<S> {
    /// Load the persisted settings and start a session at `now`.
    pub fn new(store: S, viewport: Viewport, seed: u64, now: f64) -> Self {
        let settings = store::load_settings(&store);
        Self::with_settings(store, settings, viewport, seed, now)
    }

    /// Start a session at `now` with `settings` in force from the first
    /// waypoint on. The store is only written on later edits.
    pub fn with_settings(store: S, settings: Settings, viewport: Viewport, seed: u64, now: f64) -> Self {
        tracing::debug!("session started: axis {} speed {}", settings.axis_mode, settings.speed);
        Self {
            engine: Engine::new(settings, viewport, seed, now),
            log: SessionLog::new(),
            store,
            session_start: now,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        self.engine.settings()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session_start(&self) -> f64 {
        self.session_start
    }

    /// One frame callback.
    pub fn tick(&mut self, now: f64) -> Frame {
        self.engine.step(now)
    }

    pub fn start(&mut self, now: f64) -> Frame {
        self.engine.start(now)
    }

    /// Release the frame loop; motion state is kept as is.
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn toggle_pause(&mut self, now: f64) -> bool {
        self.engine.toggle_pause(now)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.engine.resize(viewport);
    }

    /// Edit the settings, persist them and hand them to the engine.
    pub fn update_settings<F: FnOnce(&mut Settings)>(&mut self, edit: F) -> &Settings {
        let mut settings = self.engine.settings().clone();
        edit(&mut settings);
        let settings = settings.normalize();
        store::save_settings(&mut self.store, &settings);
        self.engine.apply_settings(settings);
        self.engine.settings()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.update_settings(|s| s.theme = s.theme.toggled()).theme
    }

    /// Record a diplopia mark at frame time `now`.
    pub fn mark(&mut self, now: f64, wall_clock: DateTime<Utc>) -> &LogEntry {
        self.log.mark(&self.engine, now, self.session_start, wall_clock)
    }

    pub fn export(&self, date: NaiveDate) -> Result<CsvExport, LogError> {
        self.log.export(date)
    }

    /// Restore defaults, clear the log and restart the session clock, if
    /// the user confirms.
    pub fn reset<C: Confirm + ?Sized>(&mut self, now: f64, confirm: &mut C) -> bool {
        if !confirm.confirm(RESET_PROMPT) {
            return false;
        }
        let settings = Settings::default();
        store::save_settings(&mut self.store, &settings);
        self.log.clear();
        self.session_start = now;
        self.engine.reset(settings);
        tracing::debug!("session reset");
        true
    }

    /// Dispatch a key press through the keymap.
    pub fn handle_key<C: Confirm + ?Sized>(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        input_focused: bool,
        now: f64,
        wall_clock: DateTime<Utc>,
        confirm: &mut C,
    ) -> KeyOutcome {
        match keymap::command_for(key, modifiers, input_focused) {
            None => KeyOutcome::Ignored,
            Some(Command::TogglePause) => KeyOutcome::Paused(self.toggle_pause(now)),
            Some(Command::Reset) => KeyOutcome::Reset(self.reset(now, confirm)),
            Some(Command::ToggleTheme) => KeyOutcome::ThemeChanged(self.toggle_theme()),
            Some(Command::MarkDiplopia) => KeyOutcome::Marked(self.mark(now, wall_clock).clone()),
        }
    }
}
