pub mod point_list;
pub mod pose;

pub use point_list::{
    PointList, PoseHeader, SkippedLine, load_point_list, read_point_list, save_point_list,
    write_point_list,
};
pub use pose::{load_pose_file, parse_pose, pose_at, read_poses};
