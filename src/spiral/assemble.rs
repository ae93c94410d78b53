use super::{LoopOrder, SpiralPlan};
use crate::{Event, Result, Rf, Sequence};

/// Blocks appended per slice and shot.
pub const BLOCKS_PER_GROUP: usize = 6;

/// `(slice, shot)` pairs in playout order.
pub fn group_order(n_slices: usize, n_shots: usize, order: LoopOrder) -> Vec<(usize, usize)> {
    match order {
        LoopOrder::SliceMajor => (0..n_slices)
            .flat_map(|slice| (0..n_shots).map(move |shot| (slice, shot)))
            .collect(),
        LoopOrder::ShotMajor => (0..n_shots)
            .flat_map(|shot| (0..n_slices).map(move |slice| (slice, shot)))
            .collect(),
    }
}

/// Appends one group per slice and shot to `seq` and returns the number of
/// groups. On error, the blocks appended so far stay in the sequence.
pub fn assemble(plan: &SpiralPlan, seq: &mut Sequence, order: LoopOrder) -> Result<usize> {
    let slice_rf: Vec<Rf> = (0..plan.n_slices()).map(|s| plan.slice_rf(s)).collect();
    let groups = group_order(plan.n_slices(), plan.n_shots(), order);

    for &(slice, shot) in &groups {
        append_group(plan, seq, &slice_rf[slice], shot)?;
    }

    log::info!(
        "{} slices x {} shots: {} groups, {} blocks",
        plan.n_slices(),
        plan.n_shots(),
        groups.len(),
        seq.len()
    );
    Ok(groups.len())
}

fn append_group(plan: &SpiralPlan, seq: &mut Sequence, rf: &Rf, shot: usize) -> Result<()> {
    let readout = &plan.readouts[shot];

    seq.add_block([Event::from(rf.clone()), plan.gz.clone().into()])?;
    seq.add_block([Event::from(plan.gz_reph.clone())])?;
    seq.add_block([Event::from(plan.te_delay)])?;
    seq.add_block([
        Event::from(readout.gx.clone()),
        readout.gy.clone().into(),
        readout.adc.clone().into(),
    ])?;
    seq.add_block([Event::from(plan.gz_spoil.clone())])?;
    seq.add_block([Event::from(plan.tr_delay)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spiral::SpiralConfig;
    use crate::GradientChannel;
    use assert2::{check, let_assert};

    fn assembled(order: LoopOrder) -> (SpiralPlan, Sequence) {
        let_assert!(Ok(plan) = SpiralPlan::new(&SpiralConfig::default()));
        let mut seq = Sequence::new(plan.system);
        let_assert!(Ok(48) = assemble(&plan, &mut seq, order));
        (plan, seq)
    }

    #[test]
    fn default_scenario_block_layout() {
        let (plan, seq) = assembled(LoopOrder::SliceMajor);
        check!(seq.len() == 48 * BLOCKS_PER_GROUP);

        for group in seq.blocks().chunks(BLOCKS_PER_GROUP) {
            check!(group[0].rf.is_some());
            check!(group[0].gz.as_ref() == Some(&plan.gz));
            check!(group[1].gz.as_ref() == Some(&plan.gz_reph));
            check!(group[1].rf.is_none());
            check!(group[2].is_delay());
            check!(group[3].gradient(GradientChannel::X).is_some());
            check!(group[3].gradient(GradientChannel::Y).is_some());
            check!(group[3].gz.is_none());
            check!(group[3].adc.as_ref() == Some(&plan.readouts[0].adc));
            check!(group[4].gz.as_ref() == Some(&plan.gz_spoil));
            check!(group[5].is_delay());
        }
    }

    #[test]
    fn slice_major_frequency_offsets() {
        let (plan, seq) = assembled(LoopOrder::SliceMajor);
        for (g, group) in seq.blocks().chunks(BLOCKS_PER_GROUP).enumerate() {
            let (slice, shot) = (g / 16, g % 16);
            let_assert!(Some(rf) = &group[0].rf);
            check!(rf.freq_offset == plan.gz.amplitude() * plan.slice_positions[slice]);
            check!(group[3].gx.as_ref() == Some(&plan.readouts[shot].gx));
        }
    }

    #[test]
    fn loop_order_only_permutes_groups() {
        let (_, slice_major) = assembled(LoopOrder::SliceMajor);
        let (_, shot_major) = assembled(LoopOrder::ShotMajor);
        check!(slice_major.len() == shot_major.len());
        check!((slice_major.duration() - shot_major.duration()).abs() < 1e-9);

        let a: Vec<_> = slice_major.blocks().chunks(BLOCKS_PER_GROUP).collect();
        let b: Vec<_> = shot_major.blocks().chunks(BLOCKS_PER_GROUP).collect();
        for slice in 0..3 {
            for shot in 0..16 {
                check!(a[slice * 16 + shot] == b[shot * 3 + slice]);
            }
        }
    }

    #[test]
    fn group_orders() {
        check!(group_order(2, 3, LoopOrder::SliceMajor) == [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        check!(group_order(2, 3, LoopOrder::ShotMajor) == [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)]);
        check!(group_order(0, 3, LoopOrder::SliceMajor).is_empty());
    }
}
