use crate::grid::GridStore;

/// Distribution of observed heights.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: i32,
    pub max: i32,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Width of a bin in height units.
    pub fn bin_width(&self) -> f64 {
        (self.max as f64 - self.min as f64 + 1.0) / self.counts.len() as f64
    }

    /// Inclusive lower edge of bin `i`.
    pub fn bin_start(&self, i: usize) -> f64 {
        self.min as f64 + i as f64 * self.bin_width()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Lowest and highest observed height, `None` for an empty grid.
pub fn height_range<G: GridStore>(grid: &G) -> Option<(i32, i32)> {
    grid.populated()
        .fold(None, |acc: Option<(i32, i32)>, (_, v)| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
}

/// Histogram of the non-zero cells of `grid`. `None` if there are no
/// observed cells or `bins` is zero.
pub fn height_histogram<G: GridStore>(grid: &G, bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }

    let (min, max) = height_range(grid)?;

    let mut hist = Histogram {
        min,
        max,
        counts: vec![0; bins],
    };
    let width = hist.bin_width();
    for (_, v) in grid.populated() {
        let idx = ((v as f64 - min as f64) / width).floor() as usize;
        hist.counts[idx.min(bins - 1)] += 1;
    }
    Some(hist)
}
