use glam::UVec2;

use crate::grid::traits::{GridStore, out_of_bounds};
use crate::types::{FusionError, GridInfo, UNOBSERVED};

/// Row-major `rows x cols` array. Suited to well-covered scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    info: GridInfo,
    data: Vec<i32>,
}

impl DenseGrid {
    pub fn new(info: GridInfo) -> Self {
        Self {
            data: vec![UNOBSERVED; info.len()],
            info,
        }
    }

    pub fn from_data(info: GridInfo, data: Vec<i32>) -> Result<Self, FusionError> {
        let expected_len = info.len();
        if data.len() != expected_len {
            return Err(FusionError::InvalidConfig(format!(
                "data length {} does not match grid size {}",
                data.len(),
                expected_len
            )));
        }

        Ok(Self { info, data })
    }

    pub fn data(&self) -> &[i32] {
        &self.data
    }

    fn index(&self, cell: UVec2) -> usize {
        (cell.y as usize) * (self.info.cols as usize) + (cell.x as usize)
    }
}

impl GridStore for DenseGrid {
    fn info(&self) -> &GridInfo {
        &self.info
    }

    fn get(&self, cell: UVec2) -> Option<i32> {
        if !self.info.contains(cell) {
            return None;
        }
        Some(self.data[self.index(cell)])
    }

    fn set(&mut self, cell: UVec2, value: i32) -> Result<(), FusionError> {
        if !self.info.contains(cell) {
            return Err(out_of_bounds(&self.info, cell));
        }
        let idx = self.index(cell);
        self.data[idx] = value;
        Ok(())
    }

    fn clear(&mut self) {
        self.data.fill(UNOBSERVED);
    }

    fn populated(&self) -> impl Iterator<Item = (UVec2, i32)> + '_ {
        let cols = self.info.cols as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != UNOBSERVED)
            .map(move |(idx, v)| (UVec2::new((idx % cols) as u32, (idx / cols) as u32), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(rows: u32, cols: u32) -> GridInfo {
        GridInfo::new(rows, cols, UVec2::ZERO, 1.0).unwrap()
    }

    #[test]
    fn get_set_bounds_checked() {
        let mut grid = DenseGrid::new(info(2, 3));
        grid.set(UVec2::new(2, 1), 7).unwrap();
        assert_eq!(grid.get(UVec2::new(2, 1)), Some(7));
        assert_eq!(grid.get(UVec2::new(0, 0)), Some(UNOBSERVED));
        assert_eq!(grid.get(UVec2::new(3, 0)), None);
        assert!(matches!(
            grid.set(UVec2::new(0, 2), 1),
            Err(FusionError::OutOfBounds(_))
        ));
    }

    #[test]
    fn from_data_checks_length() {
        assert!(DenseGrid::from_data(info(2, 2), vec![0; 3]).is_err());
        let grid = DenseGrid::from_data(info(2, 2), vec![0, 1, 0, 2]).unwrap();
        assert_eq!(grid.get(UVec2::new(1, 1)), Some(2));
    }

    #[test]
    fn populated_is_row_major_and_skips_zero() {
        let grid = DenseGrid::from_data(info(2, 3), vec![0, 5, 0, -2, 0, 9]).unwrap();
        let cells: Vec<_> = grid.populated().collect();
        assert_eq!(
            cells,
            vec![
                (UVec2::new(1, 0), 5),
                (UVec2::new(0, 1), -2),
                (UVec2::new(2, 1), 9)
            ]
        );
        assert_eq!(grid.populated_count(), 3);
    }

    #[test]
    fn text_dump() {
        let grid = DenseGrid::from_data(info(2, 3), vec![0, 5, 0, -2, 0, 9]).unwrap();
        assert_eq!(grid.to_text(), "0,5,0\n-2,0,9\n");
    }

    #[test]
    fn clear_resets_all_cells() {
        let mut grid = DenseGrid::from_data(info(1, 2), vec![3, 4]).unwrap();
        grid.clear();
        assert_eq!(grid.populated_count(), 0);
    }
}
