//! Reads written sequences back with the `pulseq-rs` parser, so that a file
//! which loads here also loads in every tool built on it.

use std::path::Path;

use crate::{Error, Result};

/// What a parsed sequence file contains.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqSummary {
    pub blocks: usize,
    /// Unit: `s`
    pub duration: f64,
    pub rf_blocks: usize,
    /// Sample count of every ADC, in block order
    pub adc_samples: Vec<usize>,
}

impl SeqSummary {
    fn new(seq: &pulseq_rs::Sequence) -> Self {
        Self {
            blocks: seq.blocks.len(),
            duration: seq.blocks.iter().map(|b| b.duration as f64).sum(),
            rf_blocks: seq.blocks.iter().filter(|b| b.rf.is_some()).count(),
            adc_samples: seq
                .blocks
                .iter()
                .filter_map(|b| b.adc.as_ref().map(|adc| adc.num as usize))
                .collect(),
        }
    }
}

pub fn verify_source(source: &str) -> Result<SeqSummary> {
    let seq = pulseq_rs::Sequence::from_source(source).map_err(|err| Error::Verify(format!("{err:?}")))?;
    Ok(SeqSummary::new(&seq))
}

pub fn verify_file<P: AsRef<Path>>(path: P) -> Result<SeqSummary> {
    let source = std::fs::read_to_string(path.as_ref())?;
    let summary = verify_source(&source)?;
    log::info!(
        "{}: {} blocks, {:.3} s, {} ADCs",
        path.as_ref().display(),
        summary.blocks,
        summary.duration,
        summary.adc_samples.len()
    );
    Ok(summary)
}
