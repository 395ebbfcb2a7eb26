//! The frame stepper.
//!
//! [`Engine`] owns the motion state and advances it once per rendered
//! frame from caller-supplied timestamps (milliseconds, monotonic, as a
//! display-synchronized frame callback provides them). It never reads a
//! clock itself, so a session can be replayed headlessly and
//! deterministically from a seed and a list of timestamps.
//!
//! Step order, for a running engine with a previous timestamp:
//!
//! 1. `dt = (now - last) / 1000`, then `last = now`
//! 2. paused, or inside the post-retarget rest: stop
//! 3. orbit mode: advance the orbit angle and place the shape
//! 4. waypoint mode: retarget when the turn timer expired or the step would
//!    overshoot the target (no integration that frame); otherwise steer,
//!    integrate and run the boundary handler

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::boundary;
use crate::config::{AxisMode, Settings, TurnModel};
use crate::geometry::{PlayRegion, Vec2, Viewport};
use crate::orbit;
use crate::steering;
use crate::targeting;
use crate::visual_angle::{Eccentricity, ViewingGeometry};

/// Mutable motion state
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MotionState {
    pub position: Vec2,
    /// Pixels/second
    pub velocity: Vec2,
    pub target: Vec2,
    /// Radians in [0, 2pi), orbit mode only
    pub orbit_angle: f64,
    /// Seconds drawn for the current waypoint
    pub turn_duration: f64,
    /// Timestamp (ms) at which a new target is picked regardless of progress
    pub next_target_at: f64,
    /// Timestamp (ms) until which the shape rests
    pub pause_until: f64,
    /// Previous frame timestamp; `None` until the first frame is seen
    pub last_time: Option<f64>,
}

/// What the render collaborator receives every frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Centre of the shape (pixels)
    pub position: Vec2,
    /// Edge length of the square footprint (pixels)
    pub footprint: f64,
    /// Horizontal eccentricity from the viewport centre
    pub eccentricity: Eccentricity,
}

impl Frame {
    /// Top-left corner for a translate-style render transform.
    pub fn origin(&self) -> Vec2 {
        self.position - Vec2::new(self.footprint / 2.0, self.footprint / 2.0)
    }
}

/// The motion engine
#[derive(Debug)]
pub struct Engine {
    settings: Settings,
    viewport: Viewport,
    region: PlayRegion,
    state: MotionState,
    paused: bool,
    running: bool,
    retargets: u64,
    rng: ChaCha8Rng,
}

impl Engine {
    /// Build an engine and pick the first waypoint at `now`.
    ///
    /// The engine starts running but has not seen a frame: the first
    /// [`step`](Self::step) only records its timestamp.
    pub fn new(settings: Settings, viewport: Viewport, seed: u64, now: f64) -> Self {
        let settings = settings.normalize();
        let region = PlayRegion::from_viewport(viewport, settings.play_area_pct);
        let mut engine = Self {
            settings,
            viewport,
            region,
            state: MotionState::default(),
            paused: false,
            running: true,
            retargets: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        engine.init_position();
        engine.retarget(now);
        engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut MotionState {
        &mut self.state
    }

    pub fn region(&self) -> &PlayRegion {
        &self.region
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of waypoint selections since construction
    pub fn retarget_count(&self) -> u64 {
        self.retargets
    }

    pub fn geometry(&self) -> ViewingGeometry {
        ViewingGeometry::new(self.settings.viewing_distance_cm, self.settings.screen_ppi)
    }

    /// Advance one frame and report what to draw.
    pub fn step(&mut self, now: f64) -> Frame {
        if self.running {
            self.advance(now);
        }
        self.frame()
    }

    /// Current render payload, without advancing.
    pub fn frame(&self) -> Frame {
        let half = self.settings.half_footprint();
        let offset_x = self.state.position.x - self.viewport.center().x;
        Frame {
            position: self.state.position,
            footprint: half * 2.0,
            eccentricity: self.geometry().eccentricity(offset_x),
        }
    }

    fn advance(&mut self, now: f64) {
        let Some(last) = self.state.last_time else {
            self.state.last_time = Some(now);
            return;
        };
        let dt = (now - last) / 1000.0;
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.state.last_time = Some(now);

        if self.paused || self.state.pause_until > now {
            return;
        }

        match self.settings.axis_mode {
            AxisMode::Circle => self.step_orbit(dt),
            AxisMode::Horizontal | AxisMode::Vertical | AxisMode::Free => self.step_waypoint(now, dt),
        }
    }

    fn step_orbit(&mut self, dt: f64) {
        let radius = self.settings.orbit_radius;
        self.state.orbit_angle = orbit::advance_angle(self.state.orbit_angle, self.settings.speed, radius, dt);
        self.state.position = orbit::orbit_position(self.region.center(), radius, self.state.orbit_angle);
    }

    fn step_waypoint(&mut self, now: f64, dt: f64) {
        let speed = self.settings.speed;
        let distance = self.state.position.distance(self.state.target);
        let expired = now >= self.state.next_target_at;
        let overshoot = distance < speed * dt;
        if expired || overshoot {
            self.retarget(now);
            return;
        }

        if let Some(velocity) = steering::steer(
            self.settings.turn_model,
            self.state.position,
            self.state.velocity,
            self.state.target,
            speed,
            dt,
        ) {
            self.state.velocity = velocity;
        }

        self.state.position += self.state.velocity * dt;

        let half = self.settings.half_footprint();
        let bounce = boundary::contain(&mut self.state.position, &mut self.state.velocity, &self.region, half);
        if self.settings.turn_model == TurnModel::Angular {
            // A bounce counts as arrival: one fresh target per wall hit.
            for _ in 0..bounce.count() {
                self.retarget(now);
            }
        }
    }

    /// Run the target selection policy at `now`.
    ///
    /// Orbit mode has no waypoints, so this is a no-op there. Otherwise the
    /// retarget deadline becomes `now + turn * 1000 + pause` and the shape
    /// rests until `now + pause`.
    pub fn retarget(&mut self, now: f64) {
        let Some(waypoint) = targeting::next_waypoint(&self.settings, &self.region, &mut self.rng) else {
            return;
        };
        self.retargets += 1;
        self.state.target = waypoint.target;
        self.state.turn_duration = waypoint.turn_duration;

        if self.settings.turn_model == TurnModel::Angular {
            if let Some(velocity) = steering::aim(self.state.position, waypoint.target, self.settings.speed) {
                self.state.velocity = velocity;
            }
        }

        let pause = self.settings.pause_ms.max(0.0);
        self.state.next_target_at = now + waypoint.turn_duration * 1000.0 + pause;
        self.state.pause_until = now + pause;

        tracing::debug!(
            "retarget #{} -> ({:.1}, {:.1}) for {:.2}s",
            self.retargets,
            waypoint.target.x,
            waypoint.target.y,
            waypoint.turn_duration
        );
    }

    /// Centre the shape in the region; reset the orbit angle, or give the
    /// curved model a random initial heading.
    pub fn init_position(&mut self) {
        self.state.position = self.region.center();
        if self.settings.axis_mode.is_orbit() {
            self.state.orbit_angle = 0.0;
        } else if self.settings.turn_model == TurnModel::Curved {
            let heading = self.rng.gen::<f64>() * core::f64::consts::TAU;
            self.state.velocity = Vec2::from_polar(self.settings.speed, heading);
        }
    }

    /// Replace the settings snapshot.
    ///
    /// The region is recomputed (clamping the position into it) and a
    /// change of axis mode re-centres the shape.
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.normalize();
        let axis_changed = settings.axis_mode != self.settings.axis_mode;
        self.settings = settings;
        self.update_region();
        if axis_changed {
            tracing::debug!("axis mode changed to {}", self.settings.axis_mode);
            self.init_position();
        }
    }

    /// Swap in `settings` wholesale and re-centre the shape, as a full
    /// session reset does.
    pub fn reset(&mut self, settings: Settings) {
        self.settings = settings.normalize();
        self.update_region();
        self.init_position();
    }

    /// React to a viewport resize.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.update_region();
    }

    fn update_region(&mut self) {
        self.region = PlayRegion::from_viewport(self.viewport, self.settings.play_area_pct);
        self.state.position = self.region.clamp_inset(self.state.position, self.settings.half_footprint());
    }

    /// Flip the pause flag. Resuming rebases the frame clock on `now` so the
    /// time spent paused is not integrated.
    pub fn toggle_pause(&mut self, now: f64) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.state.last_time = Some(now);
        }
        self.paused
    }

    /// (Re)start the frame loop. No-op while already running.
    pub fn start(&mut self, now: f64) -> Frame {
        if self.running {
            return self.frame();
        }
        self.running = true;
        self.state.last_time = None;
        self.step(now)
    }

    /// Stop the frame loop; steps become no-ops until [`start`](Self::start).
    pub fn stop(&mut self) {
        self.running = false;
    }
}
