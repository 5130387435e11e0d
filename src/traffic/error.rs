use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("traffic matrix row {row} has {len} entries, expected {expected}")]
    NotSquare { row: usize, len: usize, expected: usize },

    #[error("traffic entry ({src}, {dst}) = {value} must be finite and non-negative")]
    InvalidEntry { src: usize, dst: usize, value: f64 },

    #[error("traffic matrix covers {actual} switches, topology has {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("traffic matrix has zero total demand")]
    EmptyTraffic,

    #[error("invalid traffic generator parameter: {0}")]
    InvalidParameter(String),
}
