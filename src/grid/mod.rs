pub mod any;
pub mod consistency;
pub mod dense;
pub mod merge;
pub mod rasterize;
pub mod sparse;
pub mod stats;
pub mod traits;

pub use any::{AnyGrid, GridStorage};
pub use consistency::{Disagreement, Metric, accept, score, score_points};
pub use dense::DenseGrid;
pub use merge::{MergeReport, merge_max};
pub use rasterize::{DroppedPoint, RasterReport, Rasterizer, rasterize};
pub use sparse::SparseGrid;
pub use stats::{Histogram, height_histogram, height_range};
pub use traits::{GridStore, ensure_same_shape};
