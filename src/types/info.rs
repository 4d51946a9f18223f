//! Grid metadata.

use glam::{DVec2, UVec2};
use serde::{Deserialize, Serialize};

use crate::types::{Extent, FusionError};

/// How the world origin is placed inside the grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    /// Origin on the bottom row, centred horizontally. Only `y >= 0` is
    /// representable; the vertical extent is `maxAbsY`.
    #[default]
    HalfPlane,
    /// Origin in the middle of the grid; both signs of `y` are representable.
    Centered,
}

/// Shape of a fusion grid and the cell holding the world origin.
///
/// Cells are addressed with `UVec2` where `x` is the column and `y` is the
/// row. Row indices grow as world `y` decreases (image convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInfo {
    pub rows: u32,
    pub cols: u32,
    /// Cell that contains world `(0, 0)`.
    pub center: UVec2,
    /// Edge length of a cell, in the same unit as the points (millimetres).
    pub cell_size: f64,
}

impl Default for GridInfo {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            center: UVec2::ZERO,
            cell_size: 10.0,
        }
    }
}

impl GridInfo {
    pub fn new(rows: u32, cols: u32, center: UVec2, cell_size: f64) -> Result<Self, FusionError> {
        validate_cell_size(cell_size)?;
        if rows == 0 || cols == 0 {
            return Err(FusionError::InvalidConfig(format!(
                "grid must have at least one cell, got {rows}x{cols}"
            )));
        }
        if center.y >= rows || center.x >= cols {
            return Err(FusionError::OutOfBounds(format!(
                "center ({}, {}) outside {}x{} grid",
                center.y, center.x, rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            center,
            cell_size,
        })
    }

    /// Size a grid so that every point inside `extent` has a cell.
    pub fn from_extent(
        extent: Extent,
        cell_size: f64,
        layout: GridLayout,
    ) -> Result<Self, FusionError> {
        validate_cell_size(cell_size)?;

        let span_y = match layout {
            GridLayout::HalfPlane => extent.max_abs_y,
            GridLayout::Centered => 2.0 * extent.max_abs_y,
        };
        let n_rows = cells_spanning(span_y, cell_size)?;
        let n_cols = cells_spanning(2.0 * extent.max_abs_x, cell_size)?;

        // Centre at ceil(|x|max / s) so that both -maxAbsX and +maxAbsX map
        // inside `n_cols + 1` columns; likewise floor(|y|max / s) for rows.
        let center_col = cells_spanning(extent.max_abs_x, cell_size)?;
        let center_row = match layout {
            GridLayout::HalfPlane => n_rows,
            GridLayout::Centered => (extent.max_abs_y / cell_size).floor() as u32,
        };
        let center = UVec2::new(center_col, center_row);

        log::debug!(
            "sized {:?} grid {}x{} (center row {}, col {}) for extent {:?}",
            layout,
            n_rows + 1,
            n_cols + 1,
            center.y,
            center.x,
            extent
        );

        Self::new(n_rows + 1, n_cols + 1, center, cell_size)
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// `rows * cols`, without overflow on 32-bit targets.
    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, cell: UVec2) -> bool {
        cell.x < self.cols && cell.y < self.rows
    }

    /// Signed `(row, col)` for a world position, before bounds checking.
    /// Returns `None` for non-finite input.
    pub fn cell_for(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let col = self.center.x as i64 + (x / self.cell_size).floor() as i64;
        let row = self.center.y as i64 - (y / self.cell_size).floor() as i64;
        Some((row, col))
    }

    /// Cell for a world position, or `None` if it falls outside the grid.
    pub fn world_to_cell(&self, x: f64, y: f64) -> Option<UVec2> {
        let (row, col) = self.cell_for(x, y)?;
        if row < 0 || col < 0 || row >= self.rows as i64 || col >= self.cols as i64 {
            return None;
        }
        Some(UVec2::new(col as u32, row as u32))
    }

    /// World position of the centre of `cell`.
    pub fn cell_to_world(&self, cell: UVec2) -> DVec2 {
        let dx = cell.x as f64 - self.center.x as f64 + 0.5;
        let dy = self.center.y as f64 - cell.y as f64 + 0.5;
        DVec2::new(dx * self.cell_size, dy * self.cell_size)
    }

    /// `(rows, cols)`, handy for shape comparisons.
    #[inline]
    pub fn shape(&self) -> (u32, u32) {
        (self.rows, self.cols)
    }
}

fn validate_cell_size(cell_size: f64) -> Result<(), FusionError> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(FusionError::InvalidConfig(format!(
            "cell size must be finite and positive, got {cell_size}"
        )))
    }
}

fn cells_spanning(span: f64, cell_size: f64) -> Result<u32, FusionError> {
    let cells = (span / cell_size).ceil();
    // One cell is added on top of the span, so leave room for it.
    if !cells.is_finite() || cells < 0.0 || cells >= u32::MAX as f64 {
        return Err(FusionError::GridTooLarge(format!(
            "span {span} with cell size {cell_size} does not fit a grid"
        )));
    }
    Ok(cells as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_plane_sizing() {
        let info = GridInfo::from_extent(Extent::new(25.0, 31.0), 10.0, GridLayout::HalfPlane)
            .unwrap();
        // ceil(31/10) + 1 rows, ceil(50/10) + 1 cols
        assert_eq!(info.shape(), (5, 6));
        assert_eq!(info.center, UVec2::new(3, 4));
    }

    #[test]
    fn centered_sizing() {
        let info =
            GridInfo::from_extent(Extent::new(25.0, 31.0), 10.0, GridLayout::Centered).unwrap();
        assert_eq!(info.shape(), (8, 6));
        assert_eq!(info.center, UVec2::new(3, 3));
    }

    #[test]
    fn extent_corners_stay_inside_grid() {
        let extents = [
            Extent::new(25.0, 31.0),
            Extent::new(0.1, 0.1),
            Extent::new(10.0, 10.0),
            Extent::new(37.5, 12.25),
            Extent::new(999.9, 0.0),
        ];
        for extent in extents {
            for cell_size in [0.7, 3.0, 10.0, 40.0] {
                let (x, y) = (extent.max_abs_x, extent.max_abs_y);
                let info = GridInfo::from_extent(extent, cell_size, GridLayout::Centered).unwrap();
                for (px, py) in [(-x, -y), (-x, y), (x, -y), (x, y)] {
                    assert!(info.world_to_cell(px, py).is_some(), "{px},{py} in {info:?}");
                }
                let info = GridInfo::from_extent(extent, cell_size, GridLayout::HalfPlane).unwrap();
                for (px, py) in [(-x, 0.0), (-x, y), (x, 0.0), (x, y)] {
                    assert!(info.world_to_cell(px, py).is_some(), "{px},{py} in {info:?}");
                }
            }
        }
    }

    #[test]
    fn empty_extent_gives_single_cell() {
        for layout in [GridLayout::HalfPlane, GridLayout::Centered] {
            let info = GridInfo::from_extent(Extent::EMPTY, 7.5, layout).unwrap();
            assert_eq!(info.shape(), (1, 1));
            assert_eq!(info.center, UVec2::ZERO);
        }
    }

    #[test]
    fn center_always_inside_grid() {
        let extents = [
            Extent::new(0.1, 0.1),
            Extent::new(1.0, 999.0),
            Extent::new(1234.5, 0.0),
            Extent::new(3.0, 3.0),
        ];
        for extent in extents {
            for cell_size in [0.5, 1.0, 3.0, 10.0, 250.0] {
                for layout in [GridLayout::HalfPlane, GridLayout::Centered] {
                    let info = GridInfo::from_extent(extent, cell_size, layout).unwrap();
                    assert!(info.rows >= 1 && info.cols >= 1);
                    assert!(info.contains(info.center), "{info:?}");
                }
            }
        }
    }

    #[test]
    fn huge_extent_is_reported_not_truncated() {
        let err = GridInfo::from_extent(Extent::new(1e12, 0.0), 10.0, GridLayout::HalfPlane)
            .unwrap_err();
        assert!(matches!(err, FusionError::GridTooLarge(_)));

        let info = GridInfo::new(70_000, 70_000, UVec2::ZERO, 1.0).unwrap();
        assert_eq!(info.cell_count(), 4_900_000_000);
    }

    #[test]
    fn rejects_bad_cell_size() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(GridInfo::from_extent(Extent::new(1.0, 1.0), bad, GridLayout::HalfPlane).is_err());
        }
    }

    #[test]
    fn world_to_cell_indexing() {
        let info = GridInfo::new(5, 6, UVec2::new(2, 4), 10.0).unwrap();
        // Origin lands on the center cell.
        assert_eq!(info.world_to_cell(0.0, 0.0), Some(UVec2::new(2, 4)));
        // +x moves right, +y moves up (towards row 0).
        assert_eq!(info.world_to_cell(15.0, 25.0), Some(UVec2::new(3, 2)));
        // Negative x floors away from zero.
        assert_eq!(info.world_to_cell(-0.5, 0.0), Some(UVec2::new(1, 4)));
        // Negative y is below the bottom row in a half-plane grid.
        assert_eq!(info.world_to_cell(0.0, -1.0), None);
        assert_eq!(info.cell_for(0.0, -1.0), Some((5, 2)));
        assert_eq!(info.world_to_cell(f64::NAN, 0.0), None);
    }

    #[test]
    fn cell_to_world_to_cell() {
        let info = GridInfo::new(9, 9, UVec2::new(4, 4), 2.5).unwrap();
        for row in 0..9 {
            for col in 0..9 {
                let cell = UVec2::new(col, row);
                let w = info.cell_to_world(cell);
                assert_eq!(info.world_to_cell(w.x, w.y), Some(cell));
            }
        }
    }
}
