//! Event constructors. Every function checks its result against the
//! `SystemLimits` it is given and returns an error instead of an event that
//! the scanner could not play out.

mod adc;
mod arbitrary;
mod sinc;
mod trap;
mod vds;

pub use adc::{make_adc, make_delay};
pub use arbitrary::make_arbitrary_grad;
pub use sinc::{make_sinc_pulse, SincPulse};
pub use trap::{make_trapezoid, TrapRequest};
pub use vds::{vds_2d, Trajectory};
