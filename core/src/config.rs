//! Trainer settings.
//!
//! [`Settings`] is the snapshot handed to the engine on construction and
//! after every external change. Its serialized form uses the camelCase keys
//! of the persisted settings object, so a stored snapshot round-trips
//! through [`Settings::to_json`] and [`Settings::from_json_lenient`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::*;
use crate::error::SettingsError;

/// Colour theme of the trainer page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Shape drawn at the tracked position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Circle,
    Square,
    /// Pointer-style marker with a fixed footprint; ignores `size`
    Cursor,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Cursor => "cursor",
        }
    }
}

/// How the heading follows a new target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TurnModel {
    /// Heading snaps to the target instantly
    #[default]
    Angular,
    /// Heading turns toward the target at a bounded rate
    Curved,
}

impl TurnModel {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnModel::Angular => "angular",
            TurnModel::Curved => "curved",
        }
    }
}

/// Constraint on where targets are sampled, or the parametric orbit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    #[default]
    Horizontal,
    Vertical,
    Free,
    /// Circular orbit around the region centre
    Circle,
}

impl AxisMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AxisMode::Horizontal => "horizontal",
            AxisMode::Vertical => "vertical",
            AxisMode::Free => "free",
            AxisMode::Circle => "circle",
        }
    }

    pub fn is_orbit(self) -> bool {
        matches!(self, AxisMode::Circle)
    }
}

impl std::str::FromStr for AxisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal" => Ok(AxisMode::Horizontal),
            "vertical" => Ok(AxisMode::Vertical),
            "free" => Ok(AxisMode::Free),
            "circle" => Ok(AxisMode::Circle),
            _ => Err(format!(
                "Invalid axis mode: '{}'. Must be 'horizontal', 'vertical', 'free', or 'circle'",
                s
            )),
        }
    }
}

impl std::fmt::Display for AxisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All tunable parameters of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,

    /// Shape edge length (pixels)
    pub size: f64,

    #[serde(rename = "shapeType")]
    pub shape: ShapeKind,

    /// 0-100
    pub opacity: u8,

    /// Travel speed (pixels/second)
    pub speed: f64,

    #[serde(rename = "turnType")]
    pub turn_model: TurnModel,

    /// Lower bound of the turn duration (seconds)
    #[serde(rename = "minFreq")]
    pub min_turn_s: f64,

    /// Upper bound of the turn duration (seconds)
    #[serde(rename = "maxFreq")]
    pub max_turn_s: f64,

    /// Play region size as a percentage of the viewport, per axis
    #[serde(rename = "playArea")]
    pub play_area_pct: f64,

    #[serde(rename = "axisMode")]
    pub axis_mode: AxisMode,

    /// Rest at each waypoint transition (milliseconds)
    #[serde(rename = "pauseAtTurns")]
    pub pause_ms: f64,

    #[serde(rename = "gridOverlay")]
    pub grid_overlay: bool,

    #[serde(rename = "circleRadius")]
    pub orbit_radius: f64,

    #[serde(rename = "viewingDistance")]
    pub viewing_distance_cm: f64,

    #[serde(rename = "screenPPI")]
    pub screen_ppi: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            size: DEFAULT_SIZE_PX,
            shape: ShapeKind::Circle,
            opacity: DEFAULT_OPACITY,
            speed: DEFAULT_SPEED_PX_S,
            turn_model: TurnModel::Angular,
            min_turn_s: DEFAULT_MIN_TURN_S,
            max_turn_s: DEFAULT_MAX_TURN_S,
            play_area_pct: DEFAULT_PLAY_AREA_PCT,
            axis_mode: AxisMode::Horizontal,
            pause_ms: DEFAULT_PAUSE_MS,
            grid_overlay: false,
            orbit_radius: DEFAULT_ORBIT_RADIUS_PX,
            viewing_distance_cm: DEFAULT_VIEWING_DISTANCE_CM,
            screen_ppi: DEFAULT_SCREEN_PPI,
        }
    }
}

impl Settings {
    /// Half of the shape's square footprint (pixels)
    pub fn half_footprint(&self) -> f64 {
        match self.shape {
            ShapeKind::Cursor => CURSOR_HALF_SIZE,
            _ => self.size / 2.0,
        }
    }

    /// Set the lower turn bound, dragging the upper bound up if needed.
    pub fn set_min_turn(&mut self, seconds: f64) {
        self.min_turn_s = seconds;
        if self.min_turn_s > self.max_turn_s {
            self.max_turn_s = self.min_turn_s;
        }
    }

    /// Set the upper turn bound, dragging the lower bound down if needed.
    pub fn set_max_turn(&mut self, seconds: f64) {
        self.max_turn_s = seconds;
        if self.max_turn_s < self.min_turn_s {
            self.min_turn_s = self.max_turn_s;
        }
    }

    /// Repair a snapshot so every per-frame computation stays finite.
    ///
    /// Non-finite numbers fall back to their defaults, size and speed are
    /// floored at 0, percentages are clamped into 0..=100 and the turn
    /// bounds are reordered by raising the upper bound.
    pub fn normalize(mut self) -> Self {
        let d = Settings::default();
        finite_or(&mut self.size, d.size);
        finite_or(&mut self.speed, d.speed);
        finite_or(&mut self.min_turn_s, d.min_turn_s);
        finite_or(&mut self.max_turn_s, d.max_turn_s);
        finite_or(&mut self.play_area_pct, d.play_area_pct);
        finite_or(&mut self.pause_ms, d.pause_ms);
        finite_or(&mut self.orbit_radius, d.orbit_radius);

        if !(self.viewing_distance_cm.is_finite() && self.viewing_distance_cm > 0.0) {
            self.viewing_distance_cm = d.viewing_distance_cm;
        }
        if !(self.screen_ppi.is_finite() && self.screen_ppi > 0.0) {
            self.screen_ppi = d.screen_ppi;
        }

        self.size = self.size.max(0.0);
        self.speed = self.speed.max(0.0);
        self.play_area_pct = self.play_area_pct.clamp(0.0, 100.0);
        self.opacity = self.opacity.min(100);

        if self.min_turn_s > self.max_turn_s {
            self.max_turn_s = self.min_turn_s;
        }
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a persisted snapshot over the defaults, key by key.
    ///
    /// Missing keys keep their default. Unknown keys and keys whose value
    /// does not fit the field are skipped with a warning instead of
    /// discarding the whole snapshot. Only a document that is not a JSON
    /// object at all is an error.
    pub fn from_json_lenient(raw: &str) -> Result<Settings, SettingsError> {
        Settings::default().merged_lenient(serde_json::from_str(raw)?)
    }

    /// Apply the keys of `overrides` on top of `self`, with the same
    /// per-key leniency as [`Settings::from_json_lenient`].
    pub fn merged_lenient(&self, overrides: Value) -> Result<Settings, SettingsError> {
        let saved = match overrides {
            Value::Object(map) => map,
            other => return Err(SettingsError::NotAnObject(json_kind(&other))),
        };

        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => return Err(SettingsError::NotAnObject(json_kind(&other))),
        };

        for (key, value) in saved {
            if !merged.contains_key(&key) {
                tracing::warn!("Ignoring unknown settings key '{}'", key);
                continue;
            }
            let previous = merged.insert(key.clone(), value);
            if !fits(&merged) {
                tracing::warn!("Ignoring invalid value for settings key '{}'", key);
                if let Some(previous) = previous {
                    merged.insert(key, previous);
                }
            }
        }

        let settings: Settings = serde_json::from_value(Value::Object(merged))?;
        Ok(settings.normalize())
    }
}

fn finite_or(value: &mut f64, fallback: f64) {
    if !value.is_finite() {
        *value = fallback;
    }
}

fn fits(map: &Map<String, Value>) -> bool {
    serde_json::from_value::<Settings>(Value::Object(map.clone())).is_ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_match_persisted_keys() {
        let json = Settings::default().to_json().unwrap();
        for key in [
            "\"theme\":\"light\"",
            "\"shapeType\":\"circle\"",
            "\"turnType\":\"angular\"",
            "\"minFreq\":1.5",
            "\"axisMode\":\"horizontal\"",
            "\"pauseAtTurns\":200.0",
            "\"circleRadius\":60.0",
            "\"screenPPI\":110.0",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn lenient_load_merges_partial_snapshot() {
        let s = Settings::from_json_lenient(r#"{"speed": 350, "axisMode": "circle"}"#).unwrap();
        assert_eq!(s.speed, 350.0);
        assert_eq!(s.axis_mode, AxisMode::Circle);
        assert_eq!(s.size, DEFAULT_SIZE_PX);
        assert_eq!(s.theme, Theme::Light);
    }

    #[test]
    fn lenient_load_skips_bad_values() {
        let s = Settings::from_json_lenient(
            r#"{"speed": "fast", "axisMode": "diagonal", "opacity": 40, "bogus": 1}"#,
        )
        .unwrap();
        assert_eq!(s.speed, DEFAULT_SPEED_PX_S);
        assert_eq!(s.axis_mode, AxisMode::Horizontal);
        assert_eq!(s.opacity, 40);
    }

    #[test]
    fn lenient_load_rejects_non_objects() {
        assert!(matches!(
            Settings::from_json_lenient("[1, 2]"),
            Err(SettingsError::NotAnObject("an array"))
        ));
        assert!(matches!(
            Settings::from_json_lenient("{not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn overrides_keep_the_base_for_untouched_keys() {
        let base = Settings { theme: Theme::Dark, speed: 90.0, ..Settings::default() };
        let s = base
            .merged_lenient(serde_json::json!({ "axisMode": "free", "size": "big" }))
            .unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.speed, 90.0);
        assert_eq!(s.axis_mode, AxisMode::Free);
        assert_eq!(s.size, DEFAULT_SIZE_PX);
    }

    #[test]
    fn lenient_load_repairs_turn_order() {
        let s = Settings::from_json_lenient(r#"{"minFreq": 5, "maxFreq": 2}"#).unwrap();
        assert_eq!(s.min_turn_s, 5.0);
        assert_eq!(s.max_turn_s, 5.0);
    }

    #[test]
    fn normalize_clamps_ranges_and_geometry() {
        let s = Settings {
            play_area_pct: 140.0,
            opacity: 230,
            screen_ppi: 0.0,
            viewing_distance_cm: -3.0,
            speed: f64::NAN,
            ..Settings::default()
        }
        .normalize();
        assert_eq!(s.play_area_pct, 100.0);
        assert_eq!(s.opacity, 100);
        assert_eq!(s.screen_ppi, DEFAULT_SCREEN_PPI);
        assert_eq!(s.viewing_distance_cm, DEFAULT_VIEWING_DISTANCE_CM);
        assert_eq!(s.speed, DEFAULT_SPEED_PX_S);
    }

    #[test]
    fn normalize_floors_size_and_speed() {
        let s = Settings { size: -20.0, speed: -150.0, ..Settings::default() }.normalize();
        assert_eq!(s.size, 0.0);
        assert_eq!(s.speed, 0.0);
        assert_eq!(s.half_footprint(), 0.0);

        let s = Settings::from_json_lenient(r#"{"size": -4, "speed": -1}"#).unwrap();
        assert_eq!((s.size, s.speed), (0.0, 0.0));
    }

    #[test]
    fn cursor_has_fixed_footprint() {
        let s = Settings {
            shape: ShapeKind::Cursor,
            size: 40.0,
            ..Settings::default()
        };
        assert_eq!(s.half_footprint(), CURSOR_HALF_SIZE);
        let s = Settings {
            size: 40.0,
            ..Settings::default()
        };
        assert_eq!(s.half_footprint(), 20.0);
    }

    #[test]
    fn axis_mode_parses_case_insensitively() {
        assert_eq!("Circle".parse::<AxisMode>().unwrap(), AxisMode::Circle);
        assert!("zigzag".parse::<AxisMode>().is_err());
        assert_eq!(AxisMode::Free.to_string(), "free");
    }

    proptest! {
        #[test]
        fn raising_min_drags_max(min in 0.0f64..20.0, max in 0.0f64..20.0, new_min in 0.0f64..20.0) {
            let mut s = Settings { min_turn_s: min.min(max), max_turn_s: max.max(min), ..Settings::default() };
            s.set_min_turn(new_min);
            prop_assert_eq!(s.min_turn_s, new_min);
            prop_assert!(s.min_turn_s <= s.max_turn_s);
            if new_min > max.max(min) {
                prop_assert_eq!(s.max_turn_s, new_min);
            }
        }

        #[test]
        fn lowering_max_drags_min(min in 0.0f64..20.0, max in 0.0f64..20.0, new_max in 0.0f64..20.0) {
            let mut s = Settings { min_turn_s: min.min(max), max_turn_s: max.max(min), ..Settings::default() };
            s.set_max_turn(new_max);
            prop_assert_eq!(s.max_turn_s, new_max);
            prop_assert!(s.min_turn_s <= s.max_turn_s);
            if new_max < min.min(max) {
                prop_assert_eq!(s.min_turn_s, new_max);
            }
        }
    }
}
