use crate::GradientChannel;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{channel:?} gradient exceeds the {limit} limit: {value} > {max}")]
    GradientLimit {
        channel: GradientChannel,
        limit: &'static str,
        value: f64,
        max: f64,
    },
    #[error("trapezoid cannot be built: {0}")]
    InvalidTrapezoid(String),
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("invalid block: {0}")]
    InvalidBlock(String),
    #[error("{which} is negative ({value} s), the fixed events do not fit into the timing")]
    NegativeDelay { which: &'static str, value: f64 },
    #[error("spiral design failed: {0}")]
    TrajectoryDesign(String),
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("written sequence could not be read back: {0}")]
    Verify(String),
}

pub type Result<T> = std::result::Result<T, Error>;
