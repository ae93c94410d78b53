use std::f64::consts::TAU;
use std::fmt::Display;
use std::path::Path;

use super::library::Library;
use super::shape::compress_shape;
use super::{Block, Sequence};
use crate::util::raster_ticks;
use crate::{Adc, Gradient, Result, Rf};

// Trapezoids and arbitrary gradients share one ID space, the first column
// of a gradient row says which section it belongs to.
const TRAP: f64 = 0.0;
const ARBITRARY: f64 = 1.0;

fn us(t: f64) -> f64 {
    (t * 1e6).round()
}

fn ns(t: f64) -> f64 {
    (t * 1e9).round()
}

#[derive(Default)]
struct Libraries {
    shapes: Library,
    rf: Library,
    grad: Library,
    adc: Library,
}

impl Libraries {
    fn register_rf(&mut self, rf: &Rf) -> usize {
        let amplitude = rf.amplitude();
        let norm = if amplitude > 0.0 { amplitude } else { 1.0 };
        let mag = rf.signal.iter().map(|s| s.norm() / norm).collect();
        let phase = rf
            .signal
            .iter()
            .map(|s| {
                let p = (s.arg() / TAU).rem_euclid(1.0);
                if p >= 1.0 {
                    0.0
                } else {
                    p
                }
            })
            .collect();
        let mag_id = self.shapes.find_or_insert(mag);
        let phase_id = self.shapes.find_or_insert(phase);

        self.rf.find_or_insert(vec![
            amplitude,
            mag_id as f64,
            phase_id as f64,
            us(rf.delay),
            rf.freq_offset,
            rf.phase_offset,
        ])
    }

    fn register_grad(&mut self, grad: &Gradient) -> usize {
        match grad {
            Gradient::Trap {
                amplitude,
                rise,
                flat,
                fall,
                delay,
                ..
            } => self.grad.find_or_insert(vec![
                TRAP,
                *amplitude,
                us(*rise),
                us(*flat),
                us(*fall),
                us(*delay),
            ]),
            Gradient::Arbitrary {
                waveform, delay, ..
            } => {
                let amplitude = grad.amplitude();
                let norm = if amplitude != 0.0 { amplitude } else { 1.0 };
                let shape_id = self
                    .shapes
                    .find_or_insert(waveform.iter().map(|g| g / norm).collect());
                self.grad
                    .find_or_insert(vec![ARBITRARY, amplitude, shape_id as f64, us(*delay)])
            }
        }
    }

    fn register_adc(&mut self, adc: &Adc) -> usize {
        self.adc.find_or_insert(vec![
            adc.num_samples as f64,
            ns(adc.dwell),
            us(adc.delay),
            adc.freq_offset,
            adc.phase_offset,
        ])
    }

    fn register_block(&mut self, block: &Block) -> [usize; 5] {
        let mut grad = |g: &Option<Gradient>| g.as_ref().map_or(0, |g| self.register_grad(g));
        let ids = [grad(&block.gx), grad(&block.gy), grad(&block.gz)];
        [
            block.rf.as_ref().map_or(0, |rf| self.register_rf(rf)),
            ids[0],
            ids[1],
            ids[2],
            block.adc.as_ref().map_or(0, |adc| self.register_adc(adc)),
        ]
    }
}

fn join(row: &[f64]) -> String {
    row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" ")
}

/// Pulseq 1.4 text rendition of a sequence.
struct PulseqFile<'a>(&'a Sequence);

impl Display for PulseqFile<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seq = self.0;
        let system = &seq.system;

        let mut libs = Libraries::default();
        let block_ids: Vec<[usize; 5]> = seq.blocks.iter().map(|b| libs.register_block(b)).collect();

        writeln!(f, "# Pulseq sequence file")?;
        writeln!(f, "# Created by {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
        writeln!(f)?;
        writeln!(f, "[VERSION]\nmajor 1\nminor 4\nrevision 0\n")?;

        writeln!(f, "[DEFINITIONS]")?;
        writeln!(f, "AdcRasterTime {}", system.adc_raster_time)?;
        writeln!(f, "BlockDurationRaster {}", system.block_duration_raster)?;
        writeln!(f, "GradientRasterTime {}", system.grad_raster_time)?;
        writeln!(f, "RadiofrequencyRasterTime {}", system.rf_raster_time)?;
        writeln!(f, "TotalDuration {}", seq.duration())?;
        for (key, value) in &seq.definitions {
            writeln!(f, "{key} {value}")?;
        }
        writeln!(f)?;

        writeln!(f, "# Format of blocks:\n# NUM DUR RF GX GY GZ ADC EXT")?;
        writeln!(f, "[BLOCKS]")?;
        for (i, (block, ids)) in seq.blocks.iter().zip(&block_ids).enumerate() {
            let ticks = raster_ticks(block.duration, system.block_duration_raster);
            let [rf, gx, gy, gz, adc] = ids;
            writeln!(f, "{} {ticks} {rf} {gx} {gy} {gz} {adc} 0", i + 1)?;
        }
        writeln!(f)?;

        if !libs.rf.is_empty() {
            writeln!(f, "# Format of RF events:")?;
            writeln!(f, "# id amplitude mag_id phase_id time_shape_id delay freq phase")?;
            writeln!(f, "# ..        Hz   ....     ....          ....    us   Hz   rad")?;
            writeln!(f, "[RF]")?;
            for (id, row) in libs.rf.iter() {
                let [amp, mag, phase, delay, freq, ph] = row else { continue };
                writeln!(f, "{id} {amp} {mag} {phase} 0 {delay} {freq} {ph}")?;
            }
            writeln!(f)?;
        }

        let arbitrary: Vec<_> = libs.grad.iter().filter(|(_, row)| row[0] == ARBITRARY).collect();
        if !arbitrary.is_empty() {
            writeln!(f, "# Format of arbitrary gradients:")?;
            writeln!(f, "# id amplitude amp_shape_id time_shape_id delay")?;
            writeln!(f, "# ..      Hz/m       ..         ..          us")?;
            writeln!(f, "[GRADIENTS]")?;
            for (id, row) in arbitrary {
                writeln!(f, "{id} {} {} 0 {}", row[1], row[2], row[3])?;
            }
            writeln!(f)?;
        }

        let traps: Vec<_> = libs.grad.iter().filter(|(_, row)| row[0] == TRAP).collect();
        if !traps.is_empty() {
            writeln!(f, "# Format of trapezoid gradients:")?;
            writeln!(f, "# id amplitude rise flat fall delay")?;
            writeln!(f, "# ..      Hz/m   us   us   us    us")?;
            writeln!(f, "[TRAP]")?;
            for (id, row) in traps {
                writeln!(f, "{id} {}", join(&row[1..]))?;
            }
            writeln!(f)?;
        }

        if !libs.adc.is_empty() {
            writeln!(f, "# Format of ADC events:")?;
            writeln!(f, "# id num dwell delay freq phase")?;
            writeln!(f, "# ..  ..    ns    us   Hz   rad")?;
            writeln!(f, "[ADC]")?;
            for (id, row) in libs.adc.iter() {
                writeln!(f, "{id} {}", join(row))?;
            }
            writeln!(f)?;
        }

        if !libs.shapes.is_empty() {
            writeln!(f, "# Sequence Shapes")?;
            writeln!(f, "[SHAPES]")?;
            writeln!(f)?;
            for (id, samples) in libs.shapes.iter() {
                let shape = compress_shape(samples);
                writeln!(f, "shape_id {id}")?;
                writeln!(f, "num_samples {}", shape.num_samples)?;
                for word in &shape.data {
                    writeln!(f, "{word}")?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

impl Sequence {
    /// The sequence in the Pulseq 1.4 text format. Identical events and
    /// shapes are stored once and referenced by ID. The file ends with the
    /// MD5 hash of everything before the `[SIGNATURE]` section.
    pub fn to_pulseq_string(&self) -> String {
        let mut text = PulseqFile(self).to_string();
        let hash = md5::compute(text.as_bytes());
        text.push_str("\n[SIGNATURE]\n");
        text.push_str("# This is the hash of the Pulseq file, calculated right before the [SIGNATURE] section was added\n");
        text.push_str("Type md5\n");
        text.push_str(&format!("Hash {hash:x}\n"));
        text
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_pulseq_string())?;
        log::info!(
            "wrote {} blocks ({:.3} s) to {}",
            self.blocks.len(),
            self.duration(),
            path.display()
        );
        Ok(())
    }
}
