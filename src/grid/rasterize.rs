//! Deposit world-frame points into a height grid.
//!
//! A point lands in `col = center.x + floor(x / s)`, `row = center.y - floor(y / s)`
//! and contributes `round(z)`. When several points share a cell the highest
//! significant value wins: candidates with `|z| <= noise_floor`, or that
//! round to [`UNOBSERVED`], are ignored, and a cell is only written while it
//! is unobserved or the candidate is strictly greater than what it holds.

use glam::{DVec3, UVec2};

use crate::grid::traits::{ensure_same_shape, out_of_bounds};
use crate::grid::{AnyGrid, GridStorage, GridStore};
use crate::types::{FusionError, GridInfo, UNOBSERVED};

/// A point that fell outside the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroppedPoint {
    pub point: DVec3,
    /// Signed indices the point mapped to; `None` if a coordinate was not finite.
    pub cell: Option<(i64, i64)>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RasterReport {
    /// In-bounds points with a significant height.
    pub accepted: usize,
    /// Accepted points that changed their cell.
    pub written: usize,
    pub below_noise_floor: usize,
    pub out_of_bounds: Vec<DroppedPoint>,
}

impl RasterReport {
    pub fn dropped(&self) -> usize {
        self.out_of_bounds.len()
    }
}

/// Rasterizes point batches into grids of one fixed shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    info: GridInfo,
    noise_floor: f64,
}

impl Rasterizer {
    pub fn new(info: GridInfo, noise_floor: f64) -> Result<Self, FusionError> {
        if !noise_floor.is_finite() || noise_floor < 0.0 {
            return Err(FusionError::InvalidConfig(format!(
                "noise floor must be finite and non-negative, got {noise_floor}"
            )));
        }
        Ok(Self { info, noise_floor })
    }

    pub fn info(&self) -> &GridInfo {
        &self.info
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Rasterize into a freshly allocated grid.
    pub fn rasterize(
        &self,
        points: &[DVec3],
        storage: GridStorage,
    ) -> Result<(AnyGrid, RasterReport), FusionError> {
        let mut grid = AnyGrid::new(self.info, storage);
        let report = self.rasterize_into(&mut grid, points)?;
        Ok((grid, report))
    }

    /// Rasterize on top of whatever `grid` already holds.
    pub fn rasterize_into<G: GridStore>(
        &self,
        grid: &mut G,
        points: &[DVec3],
    ) -> Result<RasterReport, FusionError> {
        ensure_same_shape(&self.info, grid.info())?;

        let mut report = RasterReport::default();
        for p in points {
            let Some(cell) = self.info.world_to_cell(p.x, p.y) else {
                let mapped = self.info.cell_for(p.x, p.y);
                match mapped {
                    Some((row, col)) => log::warn!(
                        "point ({}, {}) out of grid bounds (row: {row} col: {col})",
                        p.x,
                        p.y
                    ),
                    None => log::warn!("point {p:?} has non-finite coordinates"),
                }
                report.out_of_bounds.push(DroppedPoint {
                    point: *p,
                    cell: mapped,
                });
                continue;
            };

            if candidate_height(p.z, self.noise_floor).is_none() {
                report.below_noise_floor += 1;
                continue;
            }

            report.accepted += 1;
            if deposit(grid, cell, p.z, self.noise_floor)? {
                report.written += 1;
            }
        }

        if !report.out_of_bounds.is_empty() {
            log::debug!(
                "{} of {} points fell outside the {}x{} grid",
                report.out_of_bounds.len(),
                points.len(),
                self.info.rows,
                self.info.cols
            );
        }
        Ok(report)
    }
}

/// Rasterize `points` into a new grid of shape `info`.
pub fn rasterize(
    points: &[DVec3],
    info: GridInfo,
    noise_floor: f64,
    storage: GridStorage,
) -> Result<(AnyGrid, RasterReport), FusionError> {
    Rasterizer::new(info, noise_floor)?.rasterize(points, storage)
}

/// Rounded cell value for `height`, or `None` when it is within the noise
/// floor or would round to the unobserved marker.
#[inline]
fn candidate_height(height: f64, noise_floor: f64) -> Option<i32> {
    if height.is_nan() || height.abs() <= noise_floor {
        return None;
    }
    let candidate = height.round() as i32;
    (candidate != UNOBSERVED).then_some(candidate)
}

/// Apply the conflict policy for one candidate height. Returns whether the
/// cell changed.
pub fn deposit<G: GridStore>(
    grid: &mut G,
    cell: UVec2,
    height: f64,
    noise_floor: f64,
) -> Result<bool, FusionError> {
    let Some(candidate) = candidate_height(height, noise_floor) else {
        return Ok(false);
    };
    let current = grid
        .get(cell)
        .ok_or_else(|| out_of_bounds(grid.info(), cell))?;

    if candidate != current && (current == UNOBSERVED || candidate > current) {
        grid.set(cell, candidate)?;
        return Ok(true);
    }
    Ok(false)
}
