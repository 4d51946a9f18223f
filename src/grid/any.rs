use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::grid::{DenseGrid, GridStore, SparseGrid};
use crate::types::{FusionError, GridInfo};

/// Which [`GridStore`] realization to allocate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStorage {
    #[default]
    Dense,
    Sparse,
}

/// A grid whose realization is picked at runtime from configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyGrid {
    Dense(DenseGrid),
    Sparse(SparseGrid),
}

impl AnyGrid {
    pub fn new(info: GridInfo, storage: GridStorage) -> Self {
        match storage {
            GridStorage::Dense => Self::Dense(DenseGrid::new(info)),
            GridStorage::Sparse => Self::Sparse(SparseGrid::new(info)),
        }
    }

    pub fn storage(&self) -> GridStorage {
        match self {
            Self::Dense(_) => GridStorage::Dense,
            Self::Sparse(_) => GridStorage::Sparse,
        }
    }

    /// An empty grid of the same shape and realization.
    pub fn empty_like(&self) -> Self {
        Self::new(*self.info(), self.storage())
    }
}

impl From<DenseGrid> for AnyGrid {
    fn from(grid: DenseGrid) -> Self {
        Self::Dense(grid)
    }
}

impl From<SparseGrid> for AnyGrid {
    fn from(grid: SparseGrid) -> Self {
        Self::Sparse(grid)
    }
}

impl GridStore for AnyGrid {
    fn info(&self) -> &GridInfo {
        match self {
            Self::Dense(g) => g.info(),
            Self::Sparse(g) => g.info(),
        }
    }

    fn get(&self, cell: UVec2) -> Option<i32> {
        match self {
            Self::Dense(g) => g.get(cell),
            Self::Sparse(g) => g.get(cell),
        }
    }

    fn set(&mut self, cell: UVec2, value: i32) -> Result<(), FusionError> {
        match self {
            Self::Dense(g) => g.set(cell, value),
            Self::Sparse(g) => g.set(cell, value),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Dense(g) => g.clear(),
            Self::Sparse(g) => g.clear(),
        }
    }

    fn populated(&self) -> impl Iterator<Item = (UVec2, i32)> + '_ {
        let iter: Box<dyn Iterator<Item = (UVec2, i32)> + '_> = match self {
            Self::Dense(g) => Box::new(g.populated()),
            Self::Sparse(g) => Box::new(g.populated()),
        };
        iter
    }

    fn populated_count(&self) -> usize {
        match self {
            Self::Dense(g) => g.populated_count(),
            Self::Sparse(g) => g.populated_count(),
        }
    }
}
