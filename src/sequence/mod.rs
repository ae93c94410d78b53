use std::fmt::Display;

use crate::util::ceil_to_raster;
use crate::{calc_duration, Adc, Error, Event, Gradient, GradientChannel, Result, Rf, SystemLimits};

mod library;
mod shape;
mod write;

/// One time slot of the sequence. Holds at most one event per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rf: Option<Rf>,
    pub gx: Option<Gradient>,
    pub gy: Option<Gradient>,
    pub gz: Option<Gradient>,
    pub adc: Option<Adc>,
    /// Aligned to the block duration raster. Unit: `s`
    pub duration: f64,
}

impl Block {
    fn from_events(events: Vec<Event>, system: &SystemLimits) -> Result<Self> {
        if events.is_empty() {
            return Err(Error::InvalidBlock("block without events".to_owned()));
        }

        let duration = ceil_to_raster(calc_duration(&events), system.block_duration_raster);
        let mut block = Block {
            rf: None,
            gx: None,
            gy: None,
            gz: None,
            adc: None,
            duration,
        };

        for event in events {
            match event {
                Event::Rf(rf) => {
                    if block.rf.replace(rf).is_some() {
                        return Err(Error::InvalidBlock("more than one RF event".to_owned()));
                    }
                }
                Event::Gradient(grad) => {
                    let channel = grad.channel();
                    let slot = match channel {
                        GradientChannel::X => &mut block.gx,
                        GradientChannel::Y => &mut block.gy,
                        GradientChannel::Z => &mut block.gz,
                    };
                    if slot.replace(grad).is_some() {
                        return Err(Error::InvalidBlock(format!(
                            "more than one gradient on channel {channel:?}"
                        )));
                    }
                }
                Event::Adc(adc) => {
                    if block.adc.replace(adc).is_some() {
                        return Err(Error::InvalidBlock("more than one ADC event".to_owned()));
                    }
                }
                // Only contributes to the duration
                Event::Delay(_) => {}
            }
        }

        Ok(block)
    }

    pub fn gradient(&self, channel: GradientChannel) -> Option<&Gradient> {
        match channel {
            GradientChannel::X => self.gx.as_ref(),
            GradientChannel::Y => self.gy.as_ref(),
            GradientChannel::Z => self.gz.as_ref(),
        }
    }

    /// True for blocks that only wait.
    pub fn is_delay(&self) -> bool {
        self.rf.is_none()
            && self.gx.is_none()
            && self.gy.is_none()
            && self.gz.is_none()
            && self.adc.is_none()
    }
}

/// Append-only list of blocks, serialized to a Pulseq file at the end.
#[derive(Debug)]
pub struct Sequence {
    system: SystemLimits,
    blocks: Vec<Block>,
    definitions: Vec<(String, String)>,
}

impl Sequence {
    pub fn new(system: SystemLimits) -> Self {
        Self {
            system,
            blocks: Vec::new(),
            definitions: Vec::new(),
        }
    }

    pub fn system(&self) -> &SystemLimits {
        &self.system
    }

    /// Add or replace a user definition written to the `[DEFINITIONS]` section.
    pub fn set_definition(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.definitions.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.definitions.push((key.to_owned(), value)),
        }
    }

    pub fn definitions(&self) -> &[(String, String)] {
        &self.definitions
    }

    /// Append a block made of the given events. Fails without modifying the
    /// sequence if the events do not form a valid block.
    pub fn add_block<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        let block = Block::from_events(events.into_iter().collect(), &self.system)?;
        self.blocks.push(block);
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total playout time. Unit: `s`
    pub fn duration(&self) -> f64 {
        self.blocks.iter().map(|b| b.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{make_adc, make_delay, make_trapezoid, TrapRequest};
    use crate::SystemConfig;
    use assert2::{check, let_assert};

    fn trap(channel: GradientChannel) -> Gradient {
        let system = SystemConfig::default().limits();
        let request = TrapRequest::Area {
            area: 100.0,
            duration: Some(1e-3),
        };
        make_trapezoid(channel, request, &system).unwrap()
    }

    #[test]
    fn block_duration_is_longest_event() {
        let system = SystemConfig::default().limits();
        let mut seq = Sequence::new(system);
        let adc = make_adc(256, 1e-5, &system).unwrap();
        let_assert!(Ok(()) = seq.add_block([Event::from(trap(GradientChannel::X)), adc.into()]));
        check!((seq.blocks()[0].duration - 2.56e-3).abs() < 1e-12);
        check!(seq.blocks()[0].gradient(GradientChannel::X).is_some());
        check!(seq.blocks()[0].gradient(GradientChannel::Z).is_none());
    }

    #[test]
    fn delays_round_up_to_block_raster() {
        let system = SystemConfig::default().limits();
        let mut seq = Sequence::new(system);
        seq.add_block([Event::from(make_delay(1.234e-3).unwrap())]).unwrap();
        seq.add_block([Event::from(make_delay(1e-3).unwrap())]).unwrap();
        check!(seq.blocks()[0].is_delay());
        check!((seq.blocks()[0].duration - 1.24e-3).abs() < 1e-12);
        check!((seq.duration() - 2.24e-3).abs() < 1e-12);
    }

    #[test]
    fn rejects_two_gradients_on_one_channel() {
        let system = SystemConfig::default().limits();
        let mut seq = Sequence::new(system);
        let result = seq.add_block([Event::from(trap(GradientChannel::Z)), trap(GradientChannel::Z).into()]);
        let_assert!(Err(Error::InvalidBlock(_)) = result);
        let_assert!(Err(Error::InvalidBlock(_)) = seq.add_block(Vec::new()));
        check!(seq.is_empty());
    }

    #[test]
    fn definitions_are_replaced() {
        let mut seq = Sequence::new(SystemConfig::default().limits());
        seq.set_definition("Name", "first");
        seq.set_definition("Name", "spiral");
        check!(seq.definitions() == [("Name".to_owned(), "spiral".to_owned())]);
    }
}
