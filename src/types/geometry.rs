//! Pose and extent types shared by the transform, rasterization and fusion stages.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Camera orientation in degrees.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Camera pose for one scan. Position is in millimetres, in the world frame.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: DVec3, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::default()
    }
}

/// Running maximum of |x| and |y| over every world-frame point seen so far.
///
/// Extents only grow: `include` and `union` never shrink either axis, so the
/// order in which points or scans are folded in does not matter.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub max_abs_x: f64,
    pub max_abs_y: f64,
}

impl Extent {
    pub const EMPTY: Self = Self {
        max_abs_x: 0.0,
        max_abs_y: 0.0,
    };

    pub fn new(max_abs_x: f64, max_abs_y: f64) -> Self {
        Self {
            max_abs_x: max_abs_x.abs(),
            max_abs_y: max_abs_y.abs(),
        }
    }

    /// Grow this extent to cover the point (in place). Non-finite coordinates are ignored.
    pub fn include(&mut self, p: DVec3) {
        let ax = p.x.abs();
        let ay = p.y.abs();
        if ax.is_finite() && ax > self.max_abs_x {
            self.max_abs_x = ax;
        }
        if ay.is_finite() && ay > self.max_abs_y {
            self.max_abs_y = ay;
        }
    }

    /// Axis-wise maximum of two extents.
    pub fn union(self, other: Self) -> Self {
        Self {
            max_abs_x: self.max_abs_x.max(other.max_abs_x),
            max_abs_y: self.max_abs_y.max(other.max_abs_y),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec3>) -> Self {
        let mut extent = Self::EMPTY;
        for p in points {
            extent.include(*p);
        }
        extent
    }
}
