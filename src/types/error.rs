use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("grid too large: {0}")]
    GridTooLarge(String),
    #[error("grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}
