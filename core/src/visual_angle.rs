//! Pixel offset to visual angle conversion.
//!
//! The physical offset is `|px| / ppi * 2.54` centimetres; the angle it
//! subtends at viewing distance `d` is `2 * atan(cm / (2 * d))`, in degrees.

use crate::constants::CM_PER_INCH;

/// Physical viewing geometry used for the conversion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewingGeometry {
    pub viewing_distance_cm: f64,
    pub screen_ppi: f64,
}

impl ViewingGeometry {
    pub fn new(viewing_distance_cm: f64, screen_ppi: f64) -> Self {
        Self { viewing_distance_cm, screen_ppi }
    }

    /// Unsigned visual angle in degrees subtended by `pixel_offset`.
    pub fn visual_angle(&self, pixel_offset: f64) -> f64 {
        calculate_visual_angle(pixel_offset, self.viewing_distance_cm, self.screen_ppi)
    }

    /// Signed eccentricity of a horizontal offset, for the live readout.
    pub fn eccentricity(&self, pixel_offset: f64) -> Eccentricity {
        Eccentricity {
            degrees: self.visual_angle(pixel_offset),
            negative: pixel_offset < 0.0,
        }
    }
}

/// Visual angle in degrees. Zero offset, and degenerate geometry that
/// would divide by zero, both yield 0.
pub fn calculate_visual_angle(pixel_offset: f64, viewing_distance_cm: f64, screen_ppi: f64) -> f64 {
    if pixel_offset == 0.0 || !(screen_ppi > 0.0) || !(viewing_distance_cm > 0.0) {
        return 0.0;
    }
    let cm = pixel_offset.abs() / screen_ppi * CM_PER_INCH;
    let degrees = 2.0 * (cm / (2.0 * viewing_distance_cm)).atan().to_degrees();
    if degrees.is_finite() {
        degrees
    } else {
        0.0
    }
}

/// Sign-annotated angle shown in the live readout, e.g. `+4.4°`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eccentricity {
    /// Unsigned magnitude
    pub degrees: f64,
    /// Left of (or above) the viewport centre
    pub negative: bool,
}

impl Eccentricity {
    pub fn signed_degrees(&self) -> f64 {
        if self.negative {
            -self.degrees
        } else {
            self.degrees
        }
    }
}

impl std::fmt::Display for Eccentricity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { '-' } else { '+' };
        write!(f, "{}{:.1}°", sign, self.degrees)
    }
}
