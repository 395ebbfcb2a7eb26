//! Heading control for waypoint travel.
//!
//! Both models rebuild the velocity at the configured speed; they differ in
//! how far the heading may move per frame. Every function here returns
//! `None` instead of a velocity when the target coincides with the current
//! position, since the direction would be undefined.

use core::f64::consts::{PI, TAU};

use crate::config::TurnModel;
use crate::constants::MAX_TURN_RATE;
use crate::geometry::Vec2;

/// Wrap an angle difference into (-pi, pi].
pub fn normalize_angle(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    angle %= TAU;
    if angle > PI {
        angle -= TAU;
    } else if angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Velocity pointing straight at `target` with magnitude `speed`.
pub fn aim(position: Vec2, target: Vec2, speed: f64) -> Option<Vec2> {
    let delta = target - position;
    let distance = delta.length();
    if distance > 0.0 && distance.is_finite() {
        Some(delta * (speed / distance))
    } else {
        None
    }
}

/// Rotate `velocity` toward `target`, turning at most `MAX_TURN_RATE * dt`.
pub fn turn_toward(position: Vec2, velocity: Vec2, target: Vec2, speed: f64, dt: f64) -> Option<Vec2> {
    let delta = target - position;
    if !(delta.length() > 0.0) {
        return None;
    }
    let target_angle = delta.angle();
    let current_angle = velocity.angle();
    let max_turn = MAX_TURN_RATE * dt.max(0.0);
    let turn = normalize_angle(target_angle - current_angle).clamp(-max_turn, max_turn);
    Some(Vec2::from_polar(speed, current_angle + turn))
}

/// Per-frame steering under `model`.
pub fn steer(model: TurnModel, position: Vec2, velocity: Vec2, target: Vec2, speed: f64, dt: f64) -> Option<Vec2> {
    match model {
        TurnModel::Angular => aim(position, target, speed),
        TurnModel::Curved => turn_toward(position, velocity, target, speed, dt),
    }
}
