//! Point-list files: one `x,y,z` record (millimetres) per line, no header,
//! optionally preceded by the two-line pose of the scan that produced them.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use glam::DVec3;

use crate::loaders::pose::{parse_pose_at, parse_triplet};
use crate::types::{FusionError, Pose};

/// Whether a point-list file starts with a pose record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PoseHeader {
    #[default]
    Absent,
    Present,
}

/// A record that was skipped while reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointList {
    pub pose: Option<Pose>,
    pub points: Vec<DVec3>,
    pub skipped: Vec<SkippedLine>,
}

/// Read a point list. Malformed point records are logged and skipped; a
/// malformed pose header fails the whole file.
pub fn read_point_list<R: BufRead>(reader: R, header: PoseHeader) -> Result<PointList, FusionError> {
    let mut list = PointList::default();
    let mut header_lines: Vec<(usize, String)> = Vec::with_capacity(2);

    for (i, bytes) in reader.split(b'\n').enumerate() {
        let line_no = i + 1;
        let bytes = bytes?;
        let header_pending = header == PoseHeader::Present && list.pose.is_none();
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(err) if header_pending => {
                return Err(FusionError::Parse {
                    line: line_no,
                    message: format!("pose header is not valid UTF-8: {err}"),
                });
            }
            Err(err) => {
                let reason = format!("not valid UTF-8: {err}");
                log::warn!("skipping line {line_no}: {reason}");
                list.skipped.push(SkippedLine {
                    line: line_no,
                    reason,
                });
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if header_pending {
            header_lines.push((line_no, trimmed.to_string()));
            if let [(first, position), (_, orientation)] = header_lines.as_slice() {
                list.pose = Some(parse_pose_at(position, orientation, *first)?);
            }
            continue;
        }

        match parse_triplet(trimmed) {
            Ok([x, y, z]) => list.points.push(DVec3::new(x, y, z)),
            Err(reason) => {
                log::warn!("skipping line {line_no}: {reason}");
                list.skipped.push(SkippedLine {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    if header == PoseHeader::Present && list.pose.is_none() {
        return Err(FusionError::Parse {
            line: header_lines.last().map_or(0, |(n, _)| *n),
            message: "file ended before the pose header was complete".to_string(),
        });
    }

    Ok(list)
}

pub fn load_point_list(path: impl AsRef<Path>, header: PoseHeader) -> Result<PointList, FusionError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let list = read_point_list(BufReader::new(file), header)?;
    log::debug!(
        "loaded {} points from {} ({} skipped)",
        list.points.len(),
        path.display(),
        list.skipped.len()
    );
    Ok(list)
}

/// Write points, preceded by the pose header when `pose` is given.
pub fn write_point_list<W: Write>(
    mut writer: W,
    pose: Option<&Pose>,
    points: &[DVec3],
) -> io::Result<()> {
    if let Some(pose) = pose {
        let p = pose.position;
        let o = pose.orientation;
        writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
        writeln!(writer, "{},{},{}", o.pitch, o.yaw, o.roll)?;
    }
    for p in points {
        writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
    }
    writer.flush()
}

pub fn save_point_list(
    path: impl AsRef<Path>,
    pose: Option<&Pose>,
    points: &[DVec3],
) -> Result<(), FusionError> {
    let file = File::create(path)?;
    write_point_list(BufWriter::new(file), pose, points)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::types::Orientation;

    #[test]
    fn reads_bare_points_and_skips_malformed() {
        let text = "1,2,3\n\n4,5\nfoo,1,2\n-1.5, 0 ,2e3\n";
        let list = read_point_list(Cursor::new(text), PoseHeader::Absent).unwrap();
        assert_eq!(list.pose, None);
        assert_eq!(
            list.points,
            vec![DVec3::new(1.0, 2.0, 3.0), DVec3::new(-1.5, 0.0, 2000.0)]
        );
        let lines: Vec<_> = list.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn invalid_utf8_record_is_skipped() {
        let bytes: &[u8] = b"0,0,100\n\xff\xfe,1,2\n10,0,200\n";
        let list = read_point_list(Cursor::new(bytes), PoseHeader::Absent).unwrap();
        assert_eq!(
            list.points,
            vec![DVec3::new(0.0, 0.0, 100.0), DVec3::new(10.0, 0.0, 200.0)]
        );
        assert_eq!(list.skipped.len(), 1);
        assert_eq!(list.skipped[0].line, 2);

        let err = read_point_list(Cursor::new(b"\xff\n0,0,0\n".as_slice()), PoseHeader::Present)
            .unwrap_err();
        assert!(matches!(err, FusionError::Parse { line: 1, .. }));
    }

    #[test]
    fn reads_pose_header() {
        let text = "10,20,30\n0,90,0\n1,1,1\n";
        let list = read_point_list(Cursor::new(text), PoseHeader::Present).unwrap();
        let pose = list.pose.unwrap();
        assert_eq!(pose.position, DVec3::new(10.0, 20.0, 30.0));
        assert_eq!(pose.orientation, Orientation::new(0.0, 90.0, 0.0));
        assert_eq!(list.points, vec![DVec3::ONE]);
    }

    #[test]
    fn bad_header_fails_the_file() {
        let err = read_point_list(Cursor::new("1,2\n0,0,0\n"), PoseHeader::Present).unwrap_err();
        assert!(matches!(err, FusionError::Parse { line: 1, .. }));

        let err = read_point_list(Cursor::new("1,2,3\n"), PoseHeader::Present).unwrap_err();
        assert!(matches!(err, FusionError::Parse { line: 1, .. }));
    }

    #[test]
    fn write_then_read_preserves_values() {
        let pose = Pose::new(DVec3::new(0.0, 0.0, 110.0), Orientation::new(-90.0, 0.0, 0.0));
        let points = vec![DVec3::new(0.1, -2.25, 512.0), DVec3::new(1e-3, 7.0, -3.5)];

        let mut buf = Vec::new();
        write_point_list(&mut buf, Some(&pose), &points).unwrap();
        let list = read_point_list(Cursor::new(buf), PoseHeader::Present).unwrap();

        assert_eq!(list.pose, Some(pose));
        assert_eq!(list.points, points);
        assert!(list.skipped.is_empty());
    }
}
