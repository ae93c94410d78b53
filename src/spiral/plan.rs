use ndarray::{Array1, Array2};

use super::{AdcSizing, SpiralConfig};
use crate::design::{
    make_adc, make_arbitrary_grad, make_delay, make_sinc_pulse, make_trapezoid, vds_2d, SincPulse,
    Trajectory, TrapRequest,
};
use crate::{Adc, Delay, Error, Gradient, GradientChannel, Result, Rf, SystemLimits};

/// Waits inserted after the slice rephaser and after the spoiler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Unit: `s`
    pub delay_te: f64,
    /// Unit: `s`
    pub delay_tr: f64,
}

impl Timing {
    /// TE is measured from the RF centre, TR covers one full group. The
    /// readout is the one of the first shot; other shots of different length
    /// would shift their TR.
    pub fn compute(
        te: f64,
        tr: f64,
        rf: &Rf,
        gz_reph: &Gradient,
        readout: &Gradient,
        gz_spoil: &Gradient,
    ) -> Result<Self> {
        let delay_te = te - gz_reph.duration() - rf.duration() / 2.0;
        let delay_tr =
            tr - gz_reph.duration() - rf.duration() - readout.duration() - gz_spoil.duration();

        if delay_te < 0.0 {
            return Err(Error::NegativeDelay {
                which: "delay_te",
                value: delay_te,
            });
        }
        if delay_tr < 0.0 {
            return Err(Error::NegativeDelay {
                which: "delay_tr",
                value: delay_tr,
            });
        }

        Ok(Self { delay_te, delay_tr })
    }
}

/// Gradients and ADC of one spiral interleave.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub gx: Gradient,
    pub gy: Gradient,
    pub adc: Adc,
}

/// `n_slices + 1` equidistant positions over the slab. Only the first
/// `n_slices` are excited. Unit: `m`
pub fn slice_positions(n_slices: usize, slice_thickness: f64) -> Array1<f64> {
    let slab = n_slices as f64 * slice_thickness;
    Array1::linspace(-slab / 2.0, slab / 2.0, n_slices + 1)
}

/// Every event the sequence is made of, built once before assembly.
#[derive(Debug, Clone)]
pub struct SpiralPlan {
    pub system: SystemLimits,
    pub trajectory: Trajectory,
    /// Scaled k-space trajectory, split into channels (samples x shots)
    pub kx: Array2<f64>,
    pub ky: Array2<f64>,
    /// Excitation at the slab centre, see [`SpiralPlan::slice_rf`].
    pub rf: Rf,
    pub gz: Gradient,
    pub gz_reph: Gradient,
    pub gz_spoil: Gradient,
    pub readouts: Vec<Readout>,
    pub timing: Timing,
    pub te_delay: Delay,
    pub tr_delay: Delay,
    pub slice_positions: Array1<f64>,
}

impl SpiralPlan {
    pub fn new(config: &SpiralConfig) -> Result<Self> {
        let system = config.system.limits();

        let trajectory = vds_2d(config.fov, config.nx, config.n_shots, config.alpha, &system)?;
        let (kx, ky) = trajectory.split_kspace(config.trajectory_scale);

        let pulse = SincPulse {
            flip_angle: config.flip_angle.to_radians(),
            duration: config.rf_duration,
            slice_thickness: config.slice_thickness,
            apodization: config.apodization,
            time_bw_product: config.time_bw_product,
            freq_offset: 0.0,
            phase_offset: 0.0,
        };
        let (rf, gz, _) = make_sinc_pulse(&pulse, &system)?;

        let gz_reph = make_trapezoid(
            GradientChannel::Z,
            TrapRequest::Area {
                area: -gz.area() / 2.0,
                duration: Some(config.rephase_duration),
            },
            &system,
        )?;
        let gz_spoil = make_trapezoid(
            GradientChannel::Z,
            TrapRequest::Area {
                area: 2.0 * gz.area(),
                duration: Some(3.0 * config.pre_time),
            },
            &system,
        )?;

        let readouts = make_readouts(&trajectory, config.adc_sizing, &system)?;
        let timing = Timing::compute(
            config.te,
            config.tr,
            &rf,
            &gz_reph,
            &readouts[0].gx,
            &gz_spoil,
        )?;
        log::info!(
            "TE delay {:.3} ms, TR delay {:.3} ms",
            timing.delay_te * 1e3,
            timing.delay_tr * 1e3
        );

        Ok(Self {
            system,
            trajectory,
            kx,
            ky,
            te_delay: make_delay(timing.delay_te)?,
            tr_delay: make_delay(timing.delay_tr)?,
            rf,
            gz,
            gz_reph,
            gz_spoil,
            readouts,
            timing,
            slice_positions: slice_positions(config.n_slices, config.slice_thickness),
        })
    }

    pub fn n_slices(&self) -> usize {
        self.slice_positions.len() - 1
    }

    pub fn n_shots(&self) -> usize {
        self.readouts.len()
    }

    /// Excitation of `slice`: the template moved by the slice select
    /// gradient to the slice position.
    pub fn slice_rf(&self, slice: usize) -> Rf {
        self.rf
            .with_freq_offset(self.gz.amplitude() * self.slice_positions[slice])
    }
}

fn make_readouts(
    trajectory: &Trajectory,
    sizing: AdcSizing,
    system: &SystemLimits,
) -> Result<Vec<Readout>> {
    let waveforms: Vec<(Vec<f64>, Vec<f64>)> = (0..trajectory.n_shots())
        .map(|shot| trajectory.shot_waveforms(shot))
        .collect();
    let longest = waveforms.iter().map(|(gx, _)| gx.len()).max().unwrap_or(0);

    let mut readouts = Vec::with_capacity(waveforms.len());
    for (gx, gy) in waveforms {
        let num_samples = match sizing {
            AdcSizing::ReuseMax => longest,
            AdcSizing::PerShot => gx.len(),
        };
        readouts.push(Readout {
            gx: make_arbitrary_grad(GradientChannel::X, gx, system)?,
            gy: make_arbitrary_grad(GradientChannel::Y, gy, system)?,
            adc: make_adc(num_samples, system.grad_raster_time, system)?,
        });
    }
    Ok(readouts)
}
