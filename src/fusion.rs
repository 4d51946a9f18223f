//! Multi-scan fusion driver.
//!
//! Scans are transformed into the world frame as they are added, and their
//! extents are folded into one running [`Extent`]. Grid size depends on the
//! final extent, so rasterization and merging are deferred to
//! [`ScanFusion::finish`]: every scan is rasterized at the final size, then
//! scans are checked against the combined grid in insertion order and merged
//! only when they agree with it.

use std::fmt;
use std::path::Path;

use glam::DVec3;

use crate::config::FusionConfig;
use crate::grid::{
    AnyGrid, Disagreement, GridStore, RasterReport, Rasterizer, accept, merge_max, score,
};
use crate::loaders::{PoseHeader, load_point_list, load_pose_file};
use crate::transform::{PoseTransform, TransformedScan};
use crate::types::{Extent, FusionError, GridInfo, Pose};

/// One scan as delivered by the capture stage: sensor-frame points and the pose they were taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInput {
    pub label: String,
    pub pose: Pose,
    pub points: Vec<DVec3>,
}

impl ScanInput {
    pub fn new(label: impl Into<String>, pose: Pose, points: Vec<DVec3>) -> Self {
        Self {
            label: label.into(),
            pose,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanStatus {
    Merged {
        disagreement: Disagreement,
        /// Combined-grid cells this scan raised or filled.
        written: usize,
    },
    Rejected {
        disagreement: Disagreement,
    },
    /// The scan never reached fusion (unreadable input, bad pose header...).
    Failed {
        reason: String,
    },
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged {
                disagreement,
                written,
            } => match disagreement.score() {
                Some(s) => write!(f, "merged (score {s:.3}, {written} cells written)"),
                None => write!(f, "merged (no overlap, {written} cells written)"),
            },
            Self::Rejected { disagreement } => match disagreement.score() {
                Some(s) => write!(f, "rejected (score {s:.3})"),
                None => write!(f, "rejected"),
            },
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub label: String,
    pub status: ScanStatus,
    /// The scan's own grid, kept for merged and rejected scans alike.
    pub grid: Option<AnyGrid>,
    pub raster: Option<RasterReport>,
    /// Input points dropped before rasterization (non-finite coordinates).
    pub skipped_points: usize,
}

impl ScanOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self.status, ScanStatus::Merged { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.status, ScanStatus::Rejected { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ScanStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionReport {
    pub info: GridInfo,
    pub extent: Extent,
    pub combined: AnyGrid,
    pub scans: Vec<ScanOutcome>,
}

impl FusionReport {
    pub fn merged(&self) -> impl Iterator<Item = &ScanOutcome> {
        self.scans.iter().filter(|s| s.is_merged())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ScanOutcome> {
        self.scans.iter().filter(|s| s.is_rejected())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ScanOutcome> {
        self.scans.iter().filter(|s| s.is_failed())
    }
}

#[derive(Debug)]
enum PendingScan {
    Ready(TransformedScan),
    Failed(String),
}

/// Accumulates scans for one fusion run.
#[derive(Debug)]
pub struct ScanFusion {
    config: FusionConfig,
    extent: Extent,
    scans: Vec<(String, PendingScan)>,
}

impl ScanFusion {
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        config.validate()?;
        Ok(Self {
            config,
            extent: Extent::EMPTY,
            scans: Vec::new(),
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Extent over every scan added so far.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Transform a scan into the world frame and fold its extent in.
    /// Returns the scan's own extent, or `None` if the scan would grow the
    /// grid past what can be allocated; such a scan is recorded as failed
    /// and leaves the running extent untouched.
    pub fn add_scan(&mut self, scan: ScanInput) -> Option<Extent> {
        let transform = PoseTransform::new(scan.pose, &self.config.rotation);
        let world = transform.apply(&scan.points);
        let extent = world.extent;
        let running = self.extent.union(extent);
        if let Err(err) = self.check_grid_size(running) {
            self.add_failed(scan.label, err);
            return None;
        }

        self.extent = running;
        log::debug!(
            "scan {:?}: {} points, extent {:?}, running extent {:?}",
            scan.label,
            world.points.len(),
            extent,
            self.extent
        );
        self.scans.push((scan.label, PendingScan::Ready(world)));
        Some(extent)
    }

    fn check_grid_size(&self, extent: Extent) -> Result<(), FusionError> {
        let info = GridInfo::from_extent(extent, self.config.cell_size, self.config.layout)?;
        if info.cell_count() > self.config.max_grid_cells {
            return Err(FusionError::GridTooLarge(format!(
                "extent {:?} needs a {}x{} grid, limit is {} cells",
                extent, info.rows, info.cols, self.config.max_grid_cells
            )));
        }
        Ok(())
    }

    /// Record a scan that could not be produced; it is reported but never fused.
    pub fn add_failed(&mut self, label: impl Into<String>, reason: impl fmt::Display) {
        let label = label.into();
        let reason = reason.to_string();
        log::warn!("scan {label:?} failed: {reason}");
        self.scans.push((label, PendingScan::Failed(reason)));
    }

    /// Load a point-list file and add it as a scan. Without an explicit
    /// `pose` the file must carry a pose header. Unreadable files are recorded
    /// as failed scans; returns whether the scan was added successfully.
    pub fn add_point_list_file(&mut self, path: impl AsRef<Path>, pose: Option<Pose>) -> bool {
        let path = path.as_ref();
        let label = path.display().to_string();
        let header = match pose {
            Some(_) => PoseHeader::Absent,
            None => PoseHeader::Present,
        };

        match load_point_list(path, header) {
            Ok(list) => match pose.or(list.pose) {
                Some(pose) => self
                    .add_scan(ScanInput::new(label, pose, list.points))
                    .is_some(),
                None => {
                    self.add_failed(label, "no pose for scan");
                    false
                }
            },
            Err(err) => {
                self.add_failed(label, err);
                false
            }
        }
    }

    /// Load several point-list files whose poses come from one pose file,
    /// the i-th pose belonging to the i-th file. The pose file is read once;
    /// if it cannot be read, or holds too few poses, the affected scans are
    /// recorded as failed. Returns how many scans were added.
    pub fn add_point_list_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        pose_file: impl AsRef<Path>,
    ) -> usize {
        let pose_file = pose_file.as_ref();
        let poses = match load_pose_file(pose_file) {
            Ok(poses) => poses,
            Err(err) => {
                log::error!("cannot read pose file {}: {err}", pose_file.display());
                for path in paths {
                    self.add_failed(path.as_ref().display().to_string(), "pose file unreadable");
                }
                return 0;
            }
        };

        let mut added = 0;
        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            match poses.get(i) {
                Some(pose) => {
                    if self.add_point_list_file(path, Some(*pose)) {
                        added += 1;
                    }
                }
                None => self.add_failed(
                    path.display().to_string(),
                    format!("pose file has {} poses, none for scan {}", poses.len(), i + 1),
                ),
            }
        }
        added
    }

    /// Size the grid from the final extent, rasterize every scan and merge
    /// the ones consistent with the combined grid, in insertion order.
    pub fn finish(self) -> Result<FusionReport, FusionError> {
        let config = self.config;
        let info = GridInfo::from_extent(self.extent, config.cell_size, config.layout)?;
        let rasterizer = Rasterizer::new(info, config.noise_floor)?;
        let mut combined = AnyGrid::new(info, config.storage);

        log::info!(
            "fusing {} scans into a {}x{} grid ({:?}, cell size {})",
            self.scans.len(),
            info.rows,
            info.cols,
            config.storage,
            config.cell_size
        );

        let mut outcomes = Vec::with_capacity(self.scans.len());
        for (label, pending) in self.scans {
            let world = match pending {
                PendingScan::Ready(world) => world,
                PendingScan::Failed(reason) => {
                    outcomes.push(ScanOutcome {
                        label,
                        status: ScanStatus::Failed { reason },
                        grid: None,
                        raster: None,
                        skipped_points: 0,
                    });
                    continue;
                }
            };

            let (grid, raster) = rasterizer.rasterize(&world.points, config.storage)?;
            let disagreement = score(&combined, &grid, config.metric)?;

            let status = if accept(disagreement.score(), config.acceptance_threshold) {
                let merge = merge_max(&mut combined, &grid)?;
                ScanStatus::Merged {
                    disagreement,
                    written: merge.written,
                }
            } else {
                ScanStatus::Rejected { disagreement }
            };
            log::info!(
                "scan {label:?}: {status} ({} cells, {} dropped)",
                grid.populated_count(),
                raster.dropped()
            );

            outcomes.push(ScanOutcome {
                label,
                status,
                grid: Some(grid),
                raster: Some(raster),
                skipped_points: world.skipped,
            });
        }

        Ok(FusionReport {
            info,
            extent: self.extent,
            combined,
            scans: outcomes,
        })
    }
}
