// Trainer constants shared by the engine, the settings layer and the exporter.
// The storage key and CSV header are read by existing saved data and
// spreadsheets; changing them breaks compatibility.

/// Key under which the serialized settings are persisted
pub const SETTINGS_KEY: &str = "eyeTrainingSettings";

/// Half footprint of the cursor marker shape (pixels), independent of size
pub const CURSOR_HALF_SIZE: f64 = 8.0;

/// Maximum heading change rate for curved steering (radians/second)
pub const MAX_TURN_RATE: f64 = core::f64::consts::TAU;

/// Centimetres per inch, for the pixel to physical distance conversion
pub const CM_PER_INCH: f64 = 2.54;

/// Confirmation prompt shown before a full session reset
pub const RESET_PROMPT: &str = "Reset all settings and clear session log?";

/// Prefix of the exported CSV file name, followed by `-<YYYY-MM-DD>.csv`
pub const EXPORT_FILE_PREFIX: &str = "eye-coordination-log";

/// CSV header, in export column order
pub const CSV_HEADER: [&str; 18] = [
    "iso_timestamp",
    "t_ms_since_session_start",
    "x_px",
    "y_px",
    "norm_x",
    "norm_y",
    "ecc_deg_x",
    "speed_px_s",
    "dot_size_px",
    "play_area_pct",
    "axis_mode",
    "turn_min_s",
    "turn_max_s",
    "pause_ms",
    "circle_radius_px",
    "theme",
    "opacity",
    "shape",
];

// Settings defaults

pub const DEFAULT_SIZE_PX: f64 = 12.0;
pub const DEFAULT_OPACITY: u8 = 100;
pub const DEFAULT_SPEED_PX_S: f64 = 200.0;
pub const DEFAULT_MIN_TURN_S: f64 = 1.5;
pub const DEFAULT_MAX_TURN_S: f64 = 3.0;
pub const DEFAULT_PLAY_AREA_PCT: f64 = 60.0;
pub const DEFAULT_PAUSE_MS: f64 = 200.0;
pub const DEFAULT_ORBIT_RADIUS_PX: f64 = 60.0;
pub const DEFAULT_VIEWING_DISTANCE_CM: f64 = 60.0;
pub const DEFAULT_SCREEN_PPI: f64 = 110.0;
