use num_complex::Complex64;

use super::GradientChannel;
use crate::util::{integrate_free, integrate_trap, Magnetization, Rotation};

/// RF pulse, sampled on the RF raster. Sample `i` is played out during
/// `[delay + i * raster, delay + (i + 1) * raster]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rf {
    /// Complex B1 shape. Unit: `Hz`
    pub signal: Vec<Complex64>,
    /// Unit: `s`
    pub raster: f64,
    /// Unit: `s`
    pub delay: f64,
    /// Unit: `Hz`
    pub freq_offset: f64,
    /// Unit: `rad`
    pub phase_offset: f64,
    /// Unit: `s`
    pub dead_time: f64,
    /// Unit: `s`
    pub ringdown_time: f64,
}

impl Rf {
    pub fn shape_duration(&self) -> f64 {
        self.signal.len() as f64 * self.raster
    }

    pub fn duration(&self) -> f64 {
        self.delay + self.shape_duration() + self.ringdown_time
    }

    /// Peak B1 amplitude. Unit: `Hz`
    pub fn amplitude(&self) -> f64 {
        self.signal.iter().map(|s| s.norm()).fold(0.0, f64::max)
    }

    /// Copy of this pulse played at another frequency offset. Used to move
    /// one excitation template to different slice positions.
    pub fn with_freq_offset(&self, freq_offset: f64) -> Self {
        Self {
            freq_offset,
            ..self.clone()
        }
    }

    /// Flip angle reached by rotating a relaxed magnetization through all
    /// samples of the pulse. Off-resonance is ignored. Unit: `rad`
    pub fn flip_angle(&self) -> f64 {
        let mut m = Magnetization::relaxed();
        for sample in &self.signal {
            m *= Rotation::new(
                sample.norm() * self.raster * std::f64::consts::TAU,
                self.phase_offset + sample.arg(),
            );
        }
        m.angle()
    }
}

/// Gradient event on a single channel. Amplitudes are in `Hz / m`.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Trap {
        channel: GradientChannel,
        amplitude: f64,
        rise: f64,
        flat: f64,
        fall: f64,
        delay: f64,
    },
    /// Waveform sampled at the centres of the gradient raster.
    Arbitrary {
        channel: GradientChannel,
        waveform: Vec<f64>,
        raster: f64,
        delay: f64,
    },
}

impl Gradient {
    pub fn channel(&self) -> GradientChannel {
        match self {
            Gradient::Trap { channel, .. } | Gradient::Arbitrary { channel, .. } => *channel,
        }
    }

    pub fn delay(&self) -> f64 {
        match self {
            Gradient::Trap { delay, .. } | Gradient::Arbitrary { delay, .. } => *delay,
        }
    }

    pub fn with_delay(self, delay: f64) -> Self {
        match self {
            Gradient::Trap {
                channel,
                amplitude,
                rise,
                flat,
                fall,
                ..
            } => Gradient::Trap {
                channel,
                amplitude,
                rise,
                flat,
                fall,
                delay,
            },
            Gradient::Arbitrary {
                channel,
                waveform,
                raster,
                ..
            } => Gradient::Arbitrary {
                channel,
                waveform,
                raster,
                delay,
            },
        }
    }

    /// Duration of the waveform itself, without the delay.
    pub fn shape_duration(&self) -> f64 {
        match self {
            Gradient::Trap {
                rise, flat, fall, ..
            } => rise + flat + fall,
            Gradient::Arbitrary {
                waveform, raster, ..
            } => waveform.len() as f64 * raster,
        }
    }

    pub fn duration(&self) -> f64 {
        self.delay() + self.shape_duration()
    }

    /// Trapezoids: the signed flat-top amplitude. Arbitrary waveforms: the
    /// sample with the largest magnitude, sign included.
    pub fn amplitude(&self) -> f64 {
        match self {
            Gradient::Trap { amplitude, .. } => *amplitude,
            Gradient::Arbitrary { waveform, .. } => waveform
                .iter()
                .copied()
                .fold(0.0, |peak: f64, x| if x.abs() > peak.abs() { x } else { peak }),
        }
    }

    /// Gradient moment between `t_start` and `t_end`, both relative to the
    /// start of the containing block. Unit: `1 / m`
    pub fn integrate(&self, t_start: f64, t_end: f64) -> f64 {
        match self {
            Gradient::Trap {
                amplitude,
                rise,
                flat,
                fall,
                delay,
                ..
            } => amplitude * integrate_trap(t_start - delay, t_end - delay, *rise, *flat, *fall),
            Gradient::Arbitrary {
                waveform,
                raster,
                delay,
                ..
            } => integrate_free(t_start - delay, t_end - delay, waveform, *raster),
        }
    }

    /// Total gradient moment. Unit: `1 / m`
    pub fn area(&self) -> f64 {
        self.integrate(f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// Readout window. Samples are taken at the centres of `dwell` intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct Adc {
    pub num_samples: usize,
    /// Unit: `s`
    pub dwell: f64,
    /// Unit: `s`
    pub delay: f64,
    /// Unit: `Hz`
    pub freq_offset: f64,
    /// Unit: `rad`
    pub phase_offset: f64,
    /// Unit: `s`
    pub dead_time: f64,
}

impl Adc {
    pub fn duration(&self) -> f64 {
        self.delay + self.num_samples as f64 * self.dwell + self.dead_time
    }
}

/// Pure wait, only stretches the block it is placed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay {
    /// Unit: `s`
    pub duration: f64,
}
