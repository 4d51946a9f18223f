use glam::UVec2;
use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::depth::DepthImage;
use crate::grid::{GridStore, height_range};
use crate::types::UNOBSERVED;

const UNOBSERVED_GRAY: u8 = 255;
const UNOBSERVED_RGB: Rgb<u8> = Rgb([255, 255, 255]);

/// Convert a height grid to a grayscale preview.
///
/// - **UNOBSERVED** cells become white.
/// - Observed heights are scaled linearly into `0..=254`, lowest height black.
///
/// Grid row 0 holds the largest world y, so rows map to image rows directly.
pub fn grid_to_gray_image<G: GridStore>(grid: &G) -> GrayImage {
    let range = height_range(grid).unwrap_or((UNOBSERVED, UNOBSERVED));
    let mut img = GrayImage::from_pixel(grid.cols(), grid.rows(), Luma([UNOBSERVED_GRAY]));
    for (cell, value) in grid.populated() {
        let px = (normalize(value, range) * 254.0).round() as u8;
        img.put_pixel(cell.x, cell.y, Luma([px]));
    }
    img
}

/// Convert a height grid to a jet colour-mapped preview, white where unobserved.
pub fn grid_to_color_image<G: GridStore>(grid: &G) -> RgbImage {
    let range = height_range(grid).unwrap_or((UNOBSERVED, UNOBSERVED));
    let mut img = RgbImage::from_pixel(grid.cols(), grid.rows(), UNOBSERVED_RGB);
    for (cell, value) in grid.populated() {
        img.put_pixel(cell.x, cell.y, jet(normalize(value, range)));
    }
    img
}

/// Jet colour map of a depth image over `0..=max_depth`. Invalid pixels stay black.
pub fn depth_to_color_image(depth: &DepthImage, max_depth: f32) -> RgbImage {
    let mut img = RgbImage::new(depth.width(), depth.height());
    if max_depth <= 0.0 {
        return img;
    }
    for y in 0..depth.height() {
        for x in 0..depth.width() {
            let d = depth.get(UVec2::new(x, y)).unwrap_or(0.0);
            if d > 0.0 && d.is_finite() {
                let t = (d / max_depth).clamp(0.0, 1.0) as f64;
                img.put_pixel(x, y, jet(t));
            }
        }
    }
    img
}

fn normalize(value: i32, (lo, hi): (i32, i32)) -> f64 {
    if hi <= lo {
        return 1.0;
    }
    (value as i64 - lo as i64) as f64 / (hi as i64 - lo as i64) as f64
}

/// Jet colour map, dark blue at `t = 0` to dark red at `t = 1`.
fn jet(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |offset: f64| {
        let v = (1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0);
        (v * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}
