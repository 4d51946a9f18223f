use std::collections::BTreeMap;

use glam::UVec2;

use crate::grid::traits::{GridStore, out_of_bounds};
use crate::types::{FusionError, GridInfo, UNOBSERVED};

/// Map of populated cells keyed by `(row, col)`. Suited to large, mostly
/// empty outdoor grids: memory grows with the number of observed cells only.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseGrid {
    info: GridInfo,
    cells: BTreeMap<(u32, u32), i32>,
}

impl SparseGrid {
    pub fn new(info: GridInfo) -> Self {
        Self {
            info,
            cells: BTreeMap::new(),
        }
    }
}

impl GridStore for SparseGrid {
    fn info(&self) -> &GridInfo {
        &self.info
    }

    fn get(&self, cell: UVec2) -> Option<i32> {
        if !self.info.contains(cell) {
            return None;
        }
        Some(
            self.cells
                .get(&(cell.y, cell.x))
                .copied()
                .unwrap_or(UNOBSERVED),
        )
    }

    fn set(&mut self, cell: UVec2, value: i32) -> Result<(), FusionError> {
        if !self.info.contains(cell) {
            return Err(out_of_bounds(&self.info, cell));
        }
        if value == UNOBSERVED {
            self.cells.remove(&(cell.y, cell.x));
        } else {
            self.cells.insert((cell.y, cell.x), value);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.cells.clear();
    }

    fn populated(&self) -> impl Iterator<Item = (UVec2, i32)> + '_ {
        self.cells
            .iter()
            .map(|(&(row, col), &v)| (UVec2::new(col, row), v))
    }

    fn populated_count(&self) -> usize {
        self.cells.len()
    }
}
