//! Fold an accepted scan grid into the combined grid.
//!
//! **Assumption:** `combined` and `scan` share the same dimensions and origin
//! cell; this is checked and reported as [`FusionError::ShapeMismatch`].

use crate::grid::GridStore;
use crate::grid::traits::ensure_same_shape;
use crate::types::{FusionError, UNOBSERVED};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Cells of the combined grid that changed.
    pub written: usize,
}

/// Merges scan into combined by taking the maximum height; never writes
/// unobserved from the scan, so set cells can only be raised.
pub fn merge_max<C: GridStore, S: GridStore>(
    combined: &mut C,
    scan: &S,
) -> Result<MergeReport, FusionError> {
    ensure_same_shape(combined.info(), scan.info())?;

    let mut report = MergeReport::default();
    for (cell, src) in scan.populated() {
        let old = combined.get(cell).unwrap_or(UNOBSERVED);
        if old == UNOBSERVED || old < src {
            combined.set(cell, src)?;
            report.written += 1;
        }
    }
    Ok(report)
}
