// Circular orbit: position is a pure function of an accumulated angle, with
// angular speed = linear speed / radius. No targets, no clamping.

use core::f64::consts::TAU;

use crate::geometry::Vec2;

/// Advance `angle` by `speed / radius * dt`, wrapped into [0, 2pi).
///
/// A non-positive or non-finite radius leaves the angle unchanged.
pub fn advance_angle(angle: f64, speed: f64, radius: f64, dt: f64) -> f64 {
    if !(radius > 0.0 && radius.is_finite()) {
        return angle;
    }
    let next = (angle + speed / radius * dt).rem_euclid(TAU);
    if next.is_finite() {
        next
    } else {
        angle
    }
}

/// Point on the orbit of `radius` around `center` at `angle`.
pub fn orbit_position(center: Vec2, radius: f64, angle: f64) -> Vec2 {
    if !(radius > 0.0 && radius.is_finite()) {
        return center;
    }
    center + Vec2::from_polar(radius, angle)
}
