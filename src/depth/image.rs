//! Depth images in millimetres and multi-frame averaging.

use std::io::{self, Write};

use glam::{DVec2, DVec3, UVec2};

use crate::depth::Intrinsics;
use crate::types::FusionError;

/// Row-major depth image in millimetres. Zero marks an invalid pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

/// Mean and standard deviation of the valid pixels in a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

impl DepthImage {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, FusionError> {
        let expected_len = (width as usize) * (height as usize);
        if data.len() != expected_len {
            return Err(FusionError::InvalidConfig(format!(
                "depth data length {} does not match image size {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, pixel: UVec2) -> Option<f32> {
        if pixel.x >= self.width || pixel.y >= self.height {
            return None;
        }
        Some(self.data[self.index(pixel)])
    }

    fn index(&self, pixel: UVec2) -> usize {
        (pixel.y as usize) * (self.width as usize) + (pixel.x as usize)
    }

    /// Sensor-frame points for every pixel with a positive depth.
    pub fn deproject(&self, intrinsics: &Intrinsics) -> Vec<DVec3> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let depth = self.data[self.index(UVec2::new(x, y))];
                if depth > 0.0 && depth.is_finite() {
                    let pixel = DVec2::new(x as f64, y as f64);
                    points.push(intrinsics.deproject(pixel, depth as f64));
                }
            }
        }
        points
    }

    /// Statistics over the half-open square window `[center - half_size,
    /// center + half_size)` on both axes, clipped to
    /// the image. Invalid pixels are excluded; `None` if none remain.
    pub fn window_stats(&self, center: UVec2, half_size: u32) -> Option<WindowStats> {
        let x0 = center.x.saturating_sub(half_size);
        let y0 = center.y.saturating_sub(half_size);
        let x1 = center.x.saturating_add(half_size).min(self.width);
        let y1 = center.y.saturating_add(half_size).min(self.height);

        let values: Vec<f64> = (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| UVec2::new(x, y)))
            .map(|p| self.data[self.index(p)] as f64)
            .filter(|d| *d > 0.0 && d.is_finite())
            .collect();
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
        Some(WindowStats {
            mean,
            std_dev: variance.sqrt(),
            samples: values.len(),
        })
    }

    /// CSV dump, one image row per line.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for row in self.data.chunks(self.width.max(1) as usize) {
            for (i, d) in row.iter().enumerate() {
                if i > 0 {
                    writer.write_all(b",")?;
                }
                write!(writer, "{d}")?;
            }
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

/// Averages several depth frames per pixel.
///
/// Frames arrive in metres; samples are converted to millimetres and
/// clamped to `max_depth_mm`. Negative samples are invalid and do not count.
#[derive(Debug, Clone)]
pub struct DepthAccumulator {
    width: u32,
    height: u32,
    max_depth_mm: f32,
    sum: Vec<f64>,
    count: Vec<u32>,
    frames: usize,
}

impl DepthAccumulator {
    pub fn new(width: u32, height: u32, max_depth_mm: f32) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            max_depth_mm,
            sum: vec![0.0; len],
            count: vec![0; len],
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn push_frame(&mut self, depth_m: &[f32]) -> Result<(), FusionError> {
        if depth_m.len() != self.sum.len() {
            return Err(FusionError::InvalidConfig(format!(
                "frame has {} samples, expected {}",
                depth_m.len(),
                self.sum.len()
            )));
        }

        for ((sum, count), &d) in self.sum.iter_mut().zip(&mut self.count).zip(depth_m) {
            if d.is_nan() || d < 0.0 {
                continue;
            }
            let mm = (d * 1000.0).min(self.max_depth_mm);
            *sum += mm as f64;
            *count += 1;
        }
        self.frames += 1;
        Ok(())
    }

    /// Per-pixel mean of the valid samples; pixels without any stay zero.
    pub fn mean(&self) -> DepthImage {
        let data = self
            .sum
            .iter()
            .zip(&self.count)
            .map(|(&s, &c)| if c > 0 { (s / c as f64) as f32 } else { 0.0 })
            .collect();
        DepthImage {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn new_checks_length() {
        assert!(DepthImage::new(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn deproject_skips_invalid_pixels() {
        let image = DepthImage::new(2, 2, vec![0.0, 1000.0, -5.0, 500.0]).unwrap();
        let intr = Intrinsics::pinhole(2, 2, 1.0, 1.0);
        let points = image.deproject(&intr);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], DVec3::new(0.0, -1000.0, 1000.0));
        assert_eq!(points[1], DVec3::new(0.0, 0.0, 500.0));
    }

    #[test]
    fn window_statistics() {
        #[rustfmt::skip]
        let image = DepthImage::new(3, 3, vec![
            0.0, 0.0, 0.0,
            0.0, 100.0, 200.0,
            0.0, 300.0, 0.0,
        ]).unwrap();
        // Windows are half-open: [center - half, center + half).
        let single = image.window_stats(UVec2::new(1, 1), 1).unwrap();
        assert_eq!(single.samples, 1);
        assert_relative_eq!(single.mean, 100.0);
        assert_relative_eq!(single.std_dev, 0.0);

        let corner = image.window_stats(UVec2::new(2, 2), 1).unwrap();
        assert_eq!(corner.samples, 3);
        assert_relative_eq!(corner.mean, 200.0);
        assert_relative_eq!(corner.std_dev, (20000.0_f64 / 3.0).sqrt(), epsilon = 1e-9);

        let all = image.window_stats(UVec2::new(1, 1), 5).unwrap();
        assert_eq!(all.samples, 3);

        assert_eq!(image.window_stats(UVec2::new(0, 0), 1), None);
    }

    #[test]
    fn accumulator_averages_and_clamps() {
        let mut acc = DepthAccumulator::new(3, 1, 4000.0);
        acc.push_frame(&[1.0, 5.0, -1.0]).unwrap();
        acc.push_frame(&[2.0, 5.0, -1.0]).unwrap();
        assert!(acc.push_frame(&[1.0]).is_err());
        assert_eq!(acc.frames(), 2);

        let mean = acc.mean();
        assert_eq!(mean.data(), &[1500.0, 4000.0, 0.0]);
    }

    #[test]
    fn csv_dump() {
        let image = DepthImage::new(2, 2, vec![1.0, 2.5, 0.0, 4.0]).unwrap();
        let mut buf = Vec::new();
        image.write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1,2.5\n0,4\n");
    }
}
