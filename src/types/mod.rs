pub mod constants;
pub mod error;
pub mod geometry;
pub mod info;

pub use constants::*;
pub use error::FusionError;
pub use geometry::{Extent, Orientation, Pose};
pub use info::{GridInfo, GridLayout};
