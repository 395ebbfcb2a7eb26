//! Diplopia event log and CSV export.
//!
//! Each mark captures the full instantaneous state: where the shape was,
//! how eccentric that was in degrees, and every setting in force. Entries
//! are only ever appended; the whole log is cleared on session reset.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::constants::{CSV_HEADER, EXPORT_FILE_PREFIX};
use crate::engine::Engine;
use crate::error::LogError;

/// One marked event
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    /// Wall clock at mark time, ISO-8601 UTC with milliseconds
    pub iso_timestamp: String,
    pub t_ms_since_session_start: i64,
    pub x_px: i64,
    pub y_px: i64,
    /// Offset from the centre over half the region width, 3 decimals
    pub norm_x: f64,
    /// Offset from the centre over half the region height, 3 decimals
    pub norm_y: f64,
    /// Unsigned horizontal visual angle, 1 decimal
    pub ecc_deg_x: f64,
    pub speed_px_s: f64,
    pub dot_size_px: f64,
    pub play_area_pct: f64,
    pub axis_mode: &'static str,
    pub turn_min_s: f64,
    pub turn_max_s: f64,
    pub pause_ms: f64,
    pub circle_radius_px: f64,
    pub theme: &'static str,
    pub opacity: u8,
    pub shape: &'static str,
}

impl LogEntry {
    /// Snapshot the engine at `now` (frame-clock ms).
    pub fn capture(engine: &Engine, now: f64, session_start: f64, wall_clock: DateTime<Utc>) -> Self {
        let settings = engine.settings();
        let region = engine.region();
        let position = engine.state().position;
        let center = engine.viewport().center();
        let offset_x = position.x - center.x;
        let offset_y = position.y - center.y;

        Self {
            iso_timestamp: wall_clock.to_rfc3339_opts(SecondsFormat::Millis, true),
            t_ms_since_session_start: round_half_up(now - session_start),
            x_px: round_half_up(position.x),
            y_px: round_half_up(position.y),
            norm_x: round_to(normalized(offset_x, region.width), 3),
            norm_y: round_to(normalized(offset_y, region.height), 3),
            ecc_deg_x: round_to(engine.geometry().visual_angle(offset_x), 1),
            speed_px_s: settings.speed,
            dot_size_px: settings.size,
            play_area_pct: settings.play_area_pct,
            axis_mode: settings.axis_mode.as_str(),
            turn_min_s: settings.min_turn_s,
            turn_max_s: settings.max_turn_s,
            pause_ms: settings.pause_ms,
            circle_radius_px: settings.orbit_radius,
            theme: settings.theme.as_str(),
            opacity: settings.opacity,
            shape: settings.shape.as_str(),
        }
    }

    /// Field values in [`CSV_HEADER`] order.
    pub fn csv_fields(&self) -> [CsvValue; 18] {
        [
            CsvValue::Text(self.iso_timestamp.clone()),
            CsvValue::Integer(self.t_ms_since_session_start),
            CsvValue::Integer(self.x_px),
            CsvValue::Integer(self.y_px),
            CsvValue::Number(self.norm_x),
            CsvValue::Number(self.norm_y),
            CsvValue::Number(self.ecc_deg_x),
            CsvValue::Number(self.speed_px_s),
            CsvValue::Number(self.dot_size_px),
            CsvValue::Number(self.play_area_pct),
            CsvValue::Text(self.axis_mode.to_string()),
            CsvValue::Number(self.turn_min_s),
            CsvValue::Number(self.turn_max_s),
            CsvValue::Number(self.pause_ms),
            CsvValue::Number(self.circle_radius_px),
            CsvValue::Text(self.theme.to_string()),
            CsvValue::Integer(self.opacity as i64),
            CsvValue::Text(self.shape.to_string()),
        ]
    }

    /// Readout text for the most recent mark, e.g. `4.4° (time 14:03:22)`.
    /// The time is shown in the local zone, 24-hour.
    pub fn summary(&self) -> String {
        let time = DateTime::parse_from_rfc3339(&self.iso_timestamp)
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| self.iso_timestamp.clone());
        format!("{:.1}° (time {})", self.ecc_deg_x, time)
    }
}

/// A CSV cell: strings are double-quoted, numbers are bare
#[derive(Clone, Debug, PartialEq)]
pub enum CsvValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl std::fmt::Display for CsvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvValue::Text(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            CsvValue::Integer(i) => write!(f, "{}", i),
            // `{}` prints integral floats without a fractional part;
            // adding 0.0 folds -0 into 0.
            CsvValue::Number(n) => write!(f, "{}", n + 0.0),
        }
    }
}

/// Named CSV document ready to hand to the download/persistence layer
#[derive(Clone, Debug, PartialEq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
}

/// Append-only session log
#[derive(Clone, Debug, Default)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Record a diplopia mark; never fails.
    pub fn mark(&mut self, engine: &Engine, now: f64, session_start: f64, wall_clock: DateTime<Utc>) -> &LogEntry {
        let entry = LogEntry::capture(engine, now, session_start, wall_clock);
        tracing::debug!(
            "diplopia mark #{} at ({}, {}) ecc {}°",
            self.entries.len() + 1,
            entry.x_px,
            entry.y_px,
            entry.ecc_deg_x
        );
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Drop every entry. Only a full session reset does this.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Header plus one row per entry, in insertion order, `\n`-terminated.
    pub fn to_csv(&self) -> Result<String, LogError> {
        if self.entries.is_empty() {
            return Err(LogError::Empty);
        }
        let mut csv = CSV_HEADER.join(",");
        csv.push('\n');
        for entry in &self.entries {
            let row: Vec<String> = entry.csv_fields().iter().map(|v| v.to_string()).collect();
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        Ok(csv)
    }

    /// CSV named for the export `date`.
    pub fn export(&self, date: NaiveDate) -> Result<CsvExport, LogError> {
        let contents = self.to_csv()?;
        let file_name = export_file_name(date);
        tracing::info!("Exporting {} diplopia marks to {}", self.entries.len(), file_name);
        Ok(CsvExport { file_name, contents })
    }
}

/// `eye-coordination-log-<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}-{}.csv", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Offset over half the extent; a zero-size extent yields 0.
fn normalized(offset: f64, extent: f64) -> f64 {
    let half = extent / 2.0;
    if half > 0.0 {
        offset / half
    } else {
        0.0
    }
}

/// Round half toward positive infinity, as spreadsheet consumers expect
/// for pixel and millisecond columns.
fn round_half_up(value: f64) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
