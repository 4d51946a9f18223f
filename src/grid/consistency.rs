//! Overlap-only disagreement between two height grids.
//!
//! Only cells observed in both grids count. With the default
//! [`Metric::Energy`] each overlap cell contributes `|a^2 - b^2|` and the
//! score is `sqrt(total) / n`, which is not a true RMS; [`Metric::Rms`]
//! gives the conventional one.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::grid::traits::ensure_same_shape;
use crate::grid::{AnyGrid, GridStorage, GridStore, Rasterizer};
use crate::types::{FusionError, UNOBSERVED};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `sqrt(sum |a^2 - b^2|) / n`
    #[default]
    Energy,
    /// `sqrt(sum (a - b)^2 / n)`
    Rms,
}

/// Accumulated disagreement over the overlap of two grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disagreement {
    pub metric: Metric,
    pub overlap_cells: usize,
    pub total: f64,
}

impl Disagreement {
    /// `None` when the grids share no observed cell.
    pub fn score(&self) -> Option<f64> {
        if self.overlap_cells == 0 {
            return None;
        }
        let n = self.overlap_cells as f64;
        Some(match self.metric {
            Metric::Energy => self.total.sqrt() / n,
            Metric::Rms => (self.total / n).sqrt(),
        })
    }

    pub fn accepts(&self, threshold: f64) -> bool {
        accept(self.score(), threshold)
    }
}

/// Scans with nothing in common are always accepted.
pub fn accept(score: Option<f64>, threshold: f64) -> bool {
    match score {
        Some(score) => score < threshold,
        None => true,
    }
}

/// Compare two grids of identical shape.
pub fn score<A: GridStore, B: GridStore>(
    a: &A,
    b: &B,
    metric: Metric,
) -> Result<Disagreement, FusionError> {
    ensure_same_shape(a.info(), b.info())?;

    let mut overlap_cells = 0;
    let mut total = 0.0;
    for (cell, va) in a.populated() {
        let vb = b.get(cell).unwrap_or(UNOBSERVED);
        if vb == UNOBSERVED {
            continue;
        }
        overlap_cells += 1;
        let (fa, fb) = (va as f64, vb as f64);
        total += match metric {
            Metric::Energy => (fa * fa - fb * fb).abs(),
            Metric::Rms => (fa - fb) * (fa - fb),
        };
    }

    Ok(Disagreement {
        metric,
        overlap_cells,
        total,
    })
}

/// Compare a grid against a batch of world-frame points by rasterizing the
/// points into a scratch grid of the same shape.
pub fn score_points<G: GridStore>(
    grid: &G,
    points: &[DVec3],
    rasterizer: &Rasterizer,
    metric: Metric,
) -> Result<Disagreement, FusionError> {
    let mut scratch = AnyGrid::new(*rasterizer.info(), GridStorage::Sparse);
    rasterizer.rasterize_into(&mut scratch, points)?;
    score(grid, &scratch, metric)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::UVec2;

    use super::*;
    use crate::grid::{DenseGrid, SparseGrid};
    use crate::types::GridInfo;

    fn info() -> GridInfo {
        GridInfo::new(2, 3, UVec2::new(1, 1), 10.0).unwrap()
    }

    fn grid(data: [i32; 6]) -> DenseGrid {
        DenseGrid::from_data(info(), data.to_vec()).unwrap()
    }

    #[test]
    fn grid_agrees_with_itself() {
        let g = grid([0, 4, -7, 12, 0, 3]);
        for metric in [Metric::Energy, Metric::Rms] {
            let d = score(&g, &g, metric).unwrap();
            assert_eq!(d.overlap_cells, 4);
            assert_eq!(d.score(), Some(0.0));
        }
    }

    #[test]
    fn only_overlap_cells_count() {
        let a = grid([10, 5, 0, 99, 0, 0]);
        let b = grid([13, 1, 42, 0, 0, 7]);

        let energy = score(&a, &b, Metric::Energy).unwrap();
        assert_eq!(energy.overlap_cells, 2);
        assert_relative_eq!(energy.total, 69.0 + 24.0);
        assert_relative_eq!(energy.score().unwrap(), 93.0_f64.sqrt() / 2.0);

        let rms = score(&a, &b, Metric::Rms).unwrap();
        assert_relative_eq!(rms.score().unwrap(), 12.5_f64.sqrt());
    }

    #[test]
    fn energy_metric_on_single_overlap() {
        let a = grid([0, 0, 0, 0, 500, 0]);
        let b = grid([0, 0, 0, 0, 520, 0]);
        let d = score(&a, &b, Metric::Energy).unwrap();
        assert_relative_eq!(d.score().unwrap(), 20400.0_f64.sqrt(), epsilon = 1e-9);
        assert!(!d.accepts(20.0));
        assert!(d.accepts(150.0));
    }

    #[test]
    fn no_overlap_is_accepted() {
        let a = grid([1, 0, 0, 0, 0, 0]);
        let b = grid([0, 2, 0, 0, 0, 0]);
        let d = score(&a, &b, Metric::Energy).unwrap();
        assert_eq!(d.overlap_cells, 0);
        assert_eq!(d.score(), None);
        assert!(d.accepts(0.0));
    }

    #[test]
    fn symmetric_over_realizations() {
        let a = grid([3, 0, 8, 1, 0, 2]);
        let mut b = SparseGrid::new(info());
        b.set(UVec2::new(0, 0), 6).unwrap();
        b.set(UVec2::new(2, 1), 4).unwrap();

        let ab = score(&a, &b, Metric::Energy).unwrap();
        let ba = score(&b, &a, Metric::Energy).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let a = grid([0; 6]);
        let b = DenseGrid::new(GridInfo::new(3, 3, UVec2::new(1, 1), 10.0).unwrap());
        assert!(matches!(
            score(&a, &b, Metric::Energy),
            Err(FusionError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn score_against_point_stream() {
        let a = grid([0, 0, 0, 0, 500, 0]);
        let rasterizer = Rasterizer::new(info(), 1.0).unwrap();
        // World origin maps to row 1, col 1.
        let d = score_points(&a, &[DVec3::new(2.0, 3.0, 520.0)], &rasterizer, Metric::Energy)
            .unwrap();
        assert_eq!(d.overlap_cells, 1);
        assert_relative_eq!(d.score().unwrap(), 20400.0_f64.sqrt(), epsilon = 1e-9);
    }
}
