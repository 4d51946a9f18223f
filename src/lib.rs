pub mod config;
pub mod depth;
pub mod fusion;
pub mod grid;
pub mod loaders;
pub mod transform;
pub mod types;
pub mod visualization;

pub use config::FusionConfig;
pub use fusion::{FusionReport, ScanFusion, ScanInput, ScanOutcome, ScanStatus};
pub use grid::{AnyGrid, DenseGrid, GridStorage, GridStore, Metric, Rasterizer, SparseGrid};
pub use transform::{PoseTransform, RotationConvention};
pub use types::{Extent, FusionError, GridInfo, Pose};
