use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use scan_fusion::grid::GridStore;
use scan_fusion::visualization::{grid_to_color_image, grid_to_gray_image};
use scan_fusion::{FusionConfig, ScanFusion};

/// Fuse point-list scans into one height map.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML fusion config; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the grid dumps.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Pose file with one position/orientation pair per input, in order.
    /// Without it every input must start with its own pose header.
    #[arg(long)]
    poses: Option<PathBuf>,

    /// Also write PNG previews next to the CSV dumps.
    #[arg(long)]
    png: bool,

    /// Point-list files, one per scan.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => FusionConfig::load(path)?,
        None => FusionConfig::default(),
    };

    let mut fusion = ScanFusion::new(config)?;
    match &args.poses {
        Some(pose_file) => {
            fusion.add_point_list_files(args.inputs.as_slice(), pose_file);
        }
        None => {
            for input in &args.inputs {
                fusion.add_point_list_file(input, None);
            }
        }
    }

    let report = fusion.finish()?;
    fs::create_dir_all(&args.output)?;

    report.combined.save_text(args.output.join("combined.csv"))?;
    if args.png {
        grid_to_gray_image(&report.combined).save(args.output.join("combined.png"))?;
        grid_to_color_image(&report.combined).save(args.output.join("combined_color.png"))?;
    }

    for (i, scan) in report.scans.iter().enumerate() {
        let n = i + 1;
        println!("scan {n} ({}): {}", scan.label, scan.status);
        let Some(grid) = &scan.grid else {
            continue;
        };
        grid.save_text(args.output.join(format!("scan_{n}.csv")))?;
        if args.png {
            grid_to_color_image(grid).save(args.output.join(format!("scan_{n}.png")))?;
        }
    }

    log::info!(
        "{}x{} grid: {} merged, {} rejected, {} failed, {} cells populated; wrote {}",
        report.info.rows,
        report.info.cols,
        report.merged().count(),
        report.rejected().count(),
        report.failed().count(),
        report.combined.populated_count(),
        args.output.display()
    );

    Ok(())
}
