//! Motion engine for eye-coordination training sessions.
//!
//! A single shape travels inside a play region of the viewport: along one
//! axis, freely between random waypoints, or around a circular orbit. Each
//! frame reports the shape's position and its horizontal eccentricity in
//! degrees of visual angle. Diplopia marks capture the motion state into a
//! session log that exports as CSV.
//!
//! Everything here is host-agnostic: time is passed in as milliseconds,
//! randomness comes from a seeded generator, and persistence and
//! confirmation are injected collaborators.

pub mod boundary;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod keymap;
pub mod log;
pub mod orbit;
pub mod session;
pub mod steering;
pub mod store;
pub mod targeting;
pub mod visual_angle;

pub use config::{AxisMode, Settings, ShapeKind, Theme, TurnModel};
pub use engine::{Engine, Frame, MotionState};
pub use error::{LogError, SettingsError, StoreError};
pub use geometry::{PlayRegion, Vec2, Viewport};
pub use keymap::{Command, Modifiers};
pub use log::{CsvExport, LogEntry, SessionLog};
pub use session::{Confirm, KeyOutcome, Session};
pub use store::{MemoryStore, SettingsStore};
pub use visual_angle::{calculate_visual_angle, Eccentricity, ViewingGeometry};
