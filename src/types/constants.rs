/// Cell value for a cell that no point has landed in.
pub const UNOBSERVED: i32 = 0;

pub const DEFAULT_CELL_SIZE: f64 = 10.0;
pub const DEFAULT_NOISE_FLOOR: f64 = 1.0;
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 20.0;
/// 100 MB of dense `i32` cells.
pub const DEFAULT_MAX_GRID_CELLS: u64 = 25_000_000;

/// Largest orientation angle magnitude (degrees) accepted from a pose record.
pub const MAX_ANGLE_DEG: f64 = 360.0;
