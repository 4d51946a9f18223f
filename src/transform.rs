//! Camera pose to world-frame transform.
//!
//! A pose becomes a 4x4 homogeneous matrix. Applying it to a scan's
//! sensor-frame points yields world-frame points plus the scan's [`Extent`],
//! which the fusion driver folds across scans.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::types::{Extent, Pose};

/// Order in which the per-axis rotations are composed before translation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationOrder {
    /// `M = T * Rz * Ry * Rx`: points are rotated about X, then Y, then Z.
    #[default]
    TranslateZyx,
    /// `M = T * Rx * Ry * Rz`: points are rotated about Z, then Y, then X.
    TranslateXyz,
}

/// Per-deployment calibration of how a recorded pose maps to a transform.
///
/// Different rigs mount the sensor differently, e.g. a downward-looking
/// sensor needs `pitch_offset_deg: -90` so that sensor-forward becomes world-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConvention {
    pub order: RotationOrder,
    /// Added to the (possibly negated) pitch, in degrees.
    pub pitch_offset_deg: f64,
    pub negate_pitch: bool,
    pub negate_translation: bool,
}

impl Default for RotationConvention {
    fn default() -> Self {
        Self {
            order: RotationOrder::TranslateZyx,
            pitch_offset_deg: 0.0,
            negate_pitch: false,
            negate_translation: false,
        }
    }
}

impl RotationConvention {
    /// Pitch in degrees after sign and offset calibration.
    pub fn effective_pitch(&self, pitch: f64) -> f64 {
        let pitch = if self.negate_pitch { -pitch } else { pitch };
        pitch + self.pitch_offset_deg
    }

    pub fn effective_translation(&self, position: DVec3) -> DVec3 {
        if self.negate_translation {
            -position
        } else {
            position
        }
    }
}

/// World-frame points of one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedScan {
    pub pose: Pose,
    pub points: Vec<DVec3>,
    /// Extent of this scan alone.
    pub extent: Extent,
    /// Input points dropped because a coordinate was not finite.
    pub skipped: usize,
}

/// Affine transform built from a [`Pose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTransform {
    pose: Pose,
    matrix: DMat4,
}

impl PoseTransform {
    pub fn new(pose: Pose, convention: &RotationConvention) -> Self {
        let o = pose.orientation;
        let rx = DMat4::from_rotation_x(convention.effective_pitch(o.pitch).to_radians());
        let ry = DMat4::from_rotation_y(o.yaw.to_radians());
        let rz = DMat4::from_rotation_z(o.roll.to_radians());
        let t = DMat4::from_translation(convention.effective_translation(pose.position));

        let matrix = match convention.order {
            RotationOrder::TranslateZyx => t * rz * ry * rx,
            RotationOrder::TranslateXyz => t * rx * ry * rz,
        };

        Self { pose, matrix }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn matrix(&self) -> &DMat4 {
        &self.matrix
    }

    /// Multiply `(x, y, z, 1)` by the matrix and keep the first three components.
    /// No perspective division is performed.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        (self.matrix * p.extend(1.0)).truncate()
    }

    /// Transform a batch of sensor-frame points and compute their extent.
    pub fn apply(&self, points: &[DVec3]) -> TransformedScan {
        let mut extent = Extent::EMPTY;
        let mut world = Vec::with_capacity(points.len());
        let mut skipped = 0;

        for (i, p) in points.iter().enumerate() {
            if !p.is_finite() {
                log::warn!("skipping non-finite point #{i}: {p:?}");
                skipped += 1;
                continue;
            }
            let w = self.transform_point(*p);
            extent.include(w);
            world.push(w);
        }

        TransformedScan {
            pose: self.pose,
            points: world,
            extent,
            skipped,
        }
    }
}
