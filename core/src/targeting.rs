//! Waypoint selection.
//!
//! Targets are sampled uniformly inside the play region shrunk by the
//! shape's half footprint, constrained by the axis mode. The orbit mode is
//! parametric and has no waypoints.

use rand::Rng;

use crate::config::{AxisMode, Settings};
use crate::geometry::{PlayRegion, Vec2};

/// A freshly selected waypoint and how long the engine may travel toward it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub target: Vec2,
    /// Seconds, within `[min_turn_s, max_turn_s]`
    pub turn_duration: f64,
}

/// Uniform sample along one axis of the inset region.
fn sample_axis<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    lo + rng.gen::<f64>() * (hi - lo)
}

/// Pick the next target for `mode`, or `None` in orbit mode.
pub fn select_target<R: Rng + ?Sized>(
    mode: AxisMode,
    region: &PlayRegion,
    half: f64,
    rng: &mut R,
) -> Option<Vec2> {
    let center = region.center();
    match mode {
        AxisMode::Horizontal => Some(Vec2::new(
            sample_axis(rng, region.inset_x(half)),
            center.y,
        )),
        AxisMode::Vertical => Some(Vec2::new(
            center.x,
            sample_axis(rng, region.inset_y(half)),
        )),
        AxisMode::Free => {
            let x = sample_axis(rng, region.inset_x(half));
            let y = sample_axis(rng, region.inset_y(half));
            Some(Vec2::new(x, y))
        }
        AxisMode::Circle => None,
    }
}

/// Uniform turn duration in `[min, max]` seconds.
pub fn sample_turn_duration<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    min + rng.gen::<f64>() * (max - min).max(0.0)
}

/// Full policy: target plus turn duration, or `None` in orbit mode.
pub fn next_waypoint<R: Rng + ?Sized>(settings: &Settings, region: &PlayRegion, rng: &mut R) -> Option<Waypoint> {
    let target = select_target(settings.axis_mode, region, settings.half_footprint(), rng)?;
    let turn_duration = sample_turn_duration(settings.min_turn_s, settings.max_turn_s, rng);
    Some(Waypoint { target, turn_duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn region() -> PlayRegion {
        PlayRegion { x: 100.0, y: 50.0, width: 400.0, height: 200.0 }
    }

    #[test]
    fn horizontal_targets_stay_on_centre_line() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let t = select_target(AxisMode::Horizontal, &region(), 6.0, &mut rng).unwrap();
            assert_eq!(t.y, 150.0);
            assert!(t.x >= 106.0 && t.x <= 494.0);
        }
    }

    #[test]
    fn vertical_targets_stay_on_centre_column() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let t = select_target(AxisMode::Vertical, &region(), 6.0, &mut rng).unwrap();
            assert_eq!(t.x, 300.0);
            assert!(t.y >= 56.0 && t.y <= 244.0);
        }
    }

    #[test]
    fn free_targets_cover_both_axes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let targets: Vec<Vec2> = (0..200)
            .map(|_| select_target(AxisMode::Free, &region(), 6.0, &mut rng).unwrap())
            .collect();
        assert!(targets.iter().all(|t| region().contains_inset(*t, 6.0, 0.0)));
        assert!(targets.iter().any(|t| t.y < 100.0));
        assert!(targets.iter().any(|t| t.y > 200.0));
    }

    #[test]
    fn orbit_mode_has_no_waypoints() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(select_target(AxisMode::Circle, &region(), 6.0, &mut rng), None);
    }

    #[test]
    fn oversized_footprint_targets_region_centre() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let tiny = PlayRegion { x: 0.0, y: 0.0, width: 8.0, height: 8.0 };
        for _ in 0..10 {
            let t = select_target(AxisMode::Free, &tiny, 6.0, &mut rng).unwrap();
            assert_eq!(t, Vec2::new(4.0, 4.0));
        }
    }

    #[test]
    fn turn_duration_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..500 {
            let d = sample_turn_duration(1.5, 3.0, &mut rng);
            assert!((1.5..=3.0).contains(&d));
        }
        assert_eq!(sample_turn_duration(2.0, 2.0, &mut rng), 2.0);
    }
}
