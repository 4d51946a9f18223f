//! Pinhole camera model used to lift depth pixels into sensor-frame points.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionModel {
    #[default]
    None,
    /// Coefficients map undistorted to distorted coordinates, so
    /// deprojection applies them directly.
    InverseBrownConrady,
    /// Coefficients map distorted to undistorted coordinates; deprojection
    /// inverts them iteratively.
    BrownConrady,
}

/// Depth sensor intrinsics. Coefficients are `[k1, k2, p1, p2, k3]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub width: u32,
    pub height: u32,
    pub fx: f64,
    pub fy: f64,
    pub ppx: f64,
    pub ppy: f64,
    #[serde(default)]
    pub model: DistortionModel,
    #[serde(default)]
    pub coeffs: [f64; 5],
}

const UNDISTORT_ITERATIONS: usize = 10;

impl Intrinsics {
    /// Ideal pinhole camera with the principal point in the image centre.
    pub fn pinhole(width: u32, height: u32, fx: f64, fy: f64) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            ppx: width as f64 / 2.0,
            ppy: height as f64 / 2.0,
            model: DistortionModel::None,
            coeffs: [0.0; 5],
        }
    }

    /// Sensor-frame point for `pixel` at `depth` (the point's z, same unit as the output).
    pub fn deproject(&self, pixel: DVec2, depth: f64) -> DVec3 {
        let mut x = (pixel.x - self.ppx) / self.fx;
        let mut y = (pixel.y - self.ppy) / self.fy;
        let [k1, k2, p1, p2, k3] = self.coeffs;

        match self.model {
            DistortionModel::None => {}
            DistortionModel::InverseBrownConrady => {
                let r2 = x * x + y * y;
                let f = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
                let ux = x * f + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
                let uy = y * f + 2.0 * p2 * x * y + p1 * (r2 + 2.0 * y * y);
                x = ux;
                y = uy;
            }
            DistortionModel::BrownConrady => {
                let (x0, y0) = (x, y);
                for _ in 0..UNDISTORT_ITERATIONS {
                    let r2 = x * x + y * y;
                    let icdist = 1.0 / (1.0 + ((k3 * r2 + k2) * r2 + k1) * r2);
                    let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
                    let dy = 2.0 * p2 * x * y + p1 * (r2 + 2.0 * y * y);
                    x = (x0 - dx) * icdist;
                    y = (y0 - dy) * icdist;
                }
            }
        }

        DVec3::new(depth * x, depth * y, depth)
    }

    /// Inverse of [`Intrinsics::deproject`] for the undistorted model.
    pub fn project(&self, point: DVec3) -> Option<DVec2> {
        if point.z <= 0.0 {
            return None;
        }
        Some(DVec2::new(
            point.x / point.z * self.fx + self.ppx,
            point.y / point.z * self.fy + self.ppy,
        ))
    }
}
