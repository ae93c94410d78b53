//! 2D multi-shot variable density spiral: excitation of one slice, slice
//! rephaser, wait for TE, spiral readout, spoiler, wait for TR. Repeated for
//! every slice and shot.

mod assemble;
mod config;
mod plan;

pub use assemble::{assemble, group_order, BLOCKS_PER_GROUP};
pub use config::{AdcSizing, LoopOrder, SpiralConfig};
pub use plan::{slice_positions, Readout, SpiralPlan, Timing};

use crate::{Result, Sequence};

/// Designs all events and assembles the complete sequence, ready to write.
pub fn build(config: &SpiralConfig) -> Result<(SpiralPlan, Sequence)> {
    let plan = SpiralPlan::new(config)?;

    let mut seq = Sequence::new(plan.system);
    seq.set_definition("Name", "spiral");
    seq.set_definition(
        "FOV",
        format!("{} {} {}", config.fov, config.fov, config.slice_thickness),
    );
    seq.set_definition("MatrixSize", format!("{} {}", config.nx, config.ny));

    assemble(&plan, &mut seq, config.loop_order)?;
    Ok((plan, seq))
}
