use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::UVec2;

use crate::types::{FusionError, GridInfo, UNOBSERVED};

/// Shared interface of the dense and sparse height grids.
///
/// Cells are `UVec2 { x: col, y: row }`. A value of [`UNOBSERVED`] means no
/// point has been deposited in the cell.
pub trait GridStore {
    fn info(&self) -> &GridInfo;
    fn rows(&self) -> u32 {
        self.info().rows
    }
    fn cols(&self) -> u32 {
        self.info().cols
    }

    /// Get the cell with bounds checking.
    fn get(&self, cell: UVec2) -> Option<i32>;
    /// Set the cell with bounds checking.
    fn set(&mut self, cell: UVec2, value: i32) -> Result<(), FusionError>;
    /// Reset every cell to [`UNOBSERVED`].
    fn clear(&mut self);

    /// Non-zero cells in row-major order.
    fn populated(&self) -> impl Iterator<Item = (UVec2, i32)> + '_;

    fn populated_count(&self) -> usize {
        self.populated().count()
    }

    /// Row-major text dump: one row per line, comma-separated, zero for unobserved.
    fn write_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for row in 0..self.rows() {
            for col in 0..self.cols() {
                if col > 0 {
                    writer.write_all(b",")?;
                }
                let value = self.get(UVec2::new(col, row)).unwrap_or(UNOBSERVED);
                write!(writer, "{value}")?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn save_text(&self, path: impl AsRef<Path>) -> Result<(), FusionError> {
        let file = File::create(path)?;
        self.write_text(BufWriter::new(file))?;
        Ok(())
    }
}

/// Fail unless both grids have the same dimensions and origin cell.
pub fn ensure_same_shape(expected: &GridInfo, found: &GridInfo) -> Result<(), FusionError> {
    if expected.shape() != found.shape() || expected.center != found.center {
        return Err(FusionError::ShapeMismatch {
            expected: expected.shape(),
            found: found.shape(),
        });
    }
    Ok(())
}

pub(crate) fn out_of_bounds(info: &GridInfo, cell: UVec2) -> FusionError {
    FusionError::OutOfBounds(format!(
        "cell (row {}, col {}) out of bounds for grid {}x{}",
        cell.y, cell.x, info.rows, info.cols
    ))
}
