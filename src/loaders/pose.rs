//! Pose records.
//!
//! A pose is two lines: `position.x,position.y,position.z` (millimetres)
//! followed by `pitch,yaw,roll` (degrees). A pose file holds one such pair
//! per scan, in scan order; blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DVec3;

use crate::types::{FusionError, MAX_ANGLE_DEG, Orientation, Pose};

/// Parse one comma-separated `a,b,c` record of finite numbers.
pub(crate) fn parse_triplet(line: &str) -> Result<[f64; 3], String> {
    let mut values = [0.0; 3];
    let mut count = 0;
    for field in line.split(',') {
        if count == 3 {
            return Err(format!("expected 3 fields, found more in {line:?}"));
        }
        let field = field.trim();
        let value: f64 = field
            .parse()
            .map_err(|_| format!("invalid number {field:?}"))?;
        if !value.is_finite() {
            return Err(format!("non-finite value {field:?}"));
        }
        values[count] = value;
        count += 1;
    }
    if count != 3 {
        return Err(format!("expected 3 fields, found {count}"));
    }
    Ok(values)
}

/// Parse a pose from its two text lines. `first_line` is the line number of
/// `position` in the input, used for error reporting.
pub(crate) fn parse_pose_at(
    position: &str,
    orientation: &str,
    first_line: usize,
) -> Result<Pose, FusionError> {
    let [x, y, z] = parse_triplet(position).map_err(|message| FusionError::Parse {
        line: first_line,
        message: format!("pose position: {message}"),
    })?;
    let angles = parse_triplet(orientation).map_err(|message| FusionError::Parse {
        line: first_line + 1,
        message: format!("pose orientation: {message}"),
    })?;
    if let Some(angle) = angles.iter().find(|a| a.abs() > MAX_ANGLE_DEG) {
        return Err(FusionError::Parse {
            line: first_line + 1,
            message: format!("angle {angle} outside [-{MAX_ANGLE_DEG}, {MAX_ANGLE_DEG}]"),
        });
    }
    let [pitch, yaw, roll] = angles;
    Ok(Pose::new(
        DVec3::new(x, y, z),
        Orientation::new(pitch, yaw, roll),
    ))
}

/// Parse a pose from a position line and an orientation line.
pub fn parse_pose(position: &str, orientation: &str) -> Result<Pose, FusionError> {
    parse_pose_at(position, orientation, 1)
}

pub fn read_poses<R: BufRead>(reader: R) -> Result<Vec<Pose>, FusionError> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((i + 1, line));
        }
    }

    if lines.len() % 2 != 0 {
        let line = lines[lines.len() - 1].0;
        return Err(FusionError::Parse {
            line,
            message: "pose is missing its orientation line".to_string(),
        });
    }

    lines
        .chunks_exact(2)
        .map(|pair| parse_pose_at(&pair[0].1, &pair[1].1, pair[0].0))
        .collect()
}

pub fn load_pose_file(path: impl AsRef<Path>) -> Result<Vec<Pose>, FusionError> {
    let file = File::open(path)?;
    read_poses(BufReader::new(file))
}

/// Pose of scan `index` in a pose file.
pub fn pose_at(path: impl AsRef<Path>, index: usize) -> Result<Pose, FusionError> {
    let poses = load_pose_file(path)?;
    let count = poses.len();
    poses.into_iter().nth(index).ok_or_else(|| {
        FusionError::OutOfBounds(format!("pose {index} requested, file has {count}"))
    })
}
