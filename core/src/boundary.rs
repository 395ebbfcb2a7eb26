// Play region containment for waypoint travel.

use crate::geometry::{PlayRegion, Vec2};

/// Which walls were hit during one containment pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bounce {
    pub fn any(self) -> bool {
        self.x || self.y
    }

    /// Number of walls hit, at most one per axis
    pub fn count(self) -> usize {
        self.x as usize + self.y as usize
    }
}

/// Clamp `position` inside the region inset by `half` and reflect the
/// velocity component of every clamped axis (elastic bounce).
///
/// An axis narrower than the footprint has a single admissible point, its
/// midpoint, and the shape is held there.
pub fn contain(position: &mut Vec2, velocity: &mut Vec2, region: &PlayRegion, half: f64) -> Bounce {
    Bounce {
        x: contain_axis(&mut position.x, &mut velocity.x, region.inset_x(half)),
        y: contain_axis(&mut position.y, &mut velocity.y, region.inset_y(half)),
    }
}

fn contain_axis(position: &mut f64, velocity: &mut f64, (lo, hi): (f64, f64)) -> bool {
    if *position < lo {
        *position = lo;
        *velocity = velocity.abs();
        true
    } else if *position > hi {
        *position = hi;
        *velocity = -velocity.abs();
        true
    } else {
        false
    }
}
