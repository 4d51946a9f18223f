//! Helpers for the capture stage that feeds the fusion pipeline: averaging
//! raw depth frames and lifting depth pixels into sensor-frame points.

pub mod image;
pub mod intrinsics;

pub use image::{DepthAccumulator, DepthImage, WindowStats};
pub use intrinsics::{DistortionModel, Intrinsics};
