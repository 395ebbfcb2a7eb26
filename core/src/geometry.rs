// Plane geometry for the motion engine: points/vectors in pixels and the
// centred play region the shape is confined to.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians, scaled by `len`
    #[inline]
    pub fn from_polar(len: f64, angle: f64) -> Self {
        Self::new(angle.cos() * len, angle.sin() * len)
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Heading in radians, in (-pi, pi]
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }
}

impl core::ops::Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl core::ops::Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Size of the host display surface (pixels)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Rectangle the shape may move in, centred in the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlayRegion {
    /// Centred region covering `pct` percent of the viewport on each axis.
    pub fn from_viewport(viewport: Viewport, pct: f64) -> Self {
        let ratio = pct / 100.0;
        let width = viewport.width * ratio;
        let height = viewport.height * ratio;
        Self {
            x: (viewport.width - width) / 2.0,
            y: (viewport.height - height) / 2.0,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inset interval `[lo, hi]` along x.
    pub fn inset_x(&self, half: f64) -> (f64, f64) {
        inset_span(self.x, self.width, half)
    }

    /// Inset interval `[lo, hi]` along y.
    pub fn inset_y(&self, half: f64) -> (f64, f64) {
        inset_span(self.y, self.height, half)
    }

    /// Clamp a point inside the region shrunk by `half` on every side.
    pub fn clamp_inset(&self, p: Vec2, half: f64) -> Vec2 {
        let (x_lo, x_hi) = self.inset_x(half);
        let (y_lo, y_hi) = self.inset_y(half);
        Vec2::new(x_lo.max(x_hi.min(p.x)), y_lo.max(y_hi.min(p.y)))
    }

    pub fn contains_inset(&self, p: Vec2, half: f64, tolerance: f64) -> bool {
        let (x_lo, x_hi) = self.inset_x(half);
        let (y_lo, y_hi) = self.inset_y(half);
        p.x >= x_lo - tolerance && p.x <= x_hi + tolerance && p.y >= y_lo - tolerance && p.y <= y_hi + tolerance
    }
}

/// Interval left for the shape's centre on one axis once `half` is taken
/// off both ends. An axis narrower than the footprint collapses to its
/// midpoint.
pub fn inset_span(origin: f64, extent: f64, half: f64) -> (f64, f64) {
    let lo = origin + half;
    let hi = origin + extent - half;
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = origin + extent / 2.0;
        (mid, mid)
    }
}
