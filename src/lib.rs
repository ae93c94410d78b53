//! Builds MRI pulse sequences and writes them as Pulseq files. The crate
//! contains everything from the scanner limits over single events (RF pulses,
//! trapezoids, arbitrary gradients, ADCs) up to a complete 2D multi-shot
//! variable density spiral sequence.
//!
//! All quantities use Pulseq units: gradients in `Hz / m`, RF amplitudes in
//! `Hz`, times in seconds.

mod error;
mod sequence;
mod system;
mod types;
mod util;

pub mod design;
pub mod spiral;
pub mod verify;

pub use error::{Error, Result};
pub use sequence::{Block, Sequence};
pub use system::{GradUnit, SlewUnit, SystemConfig, SystemLimits, GAMMA_1H};
pub use types::*;
