use num_complex::Complex64;
use std::f64::consts::{PI, TAU};

use super::{make_trapezoid, TrapRequest};
use crate::util::ceil_to_raster;
use crate::{Error, Gradient, GradientChannel, Result, Rf, SystemLimits};

/// Parameters of a slice selective, apodized sinc excitation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SincPulse {
    /// Unit: `rad`
    pub flip_angle: f64,
    /// Unit: `s`
    pub duration: f64,
    /// Unit: `m`
    pub slice_thickness: f64,
    /// 0 is a plain sinc, 0.5 a Hanning window, 0.46 a Hamming window
    pub apodization: f64,
    pub time_bw_product: f64,
    /// Unit: `Hz`
    pub freq_offset: f64,
    /// Unit: `rad`
    pub phase_offset: f64,
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Builds the RF pulse, its slice select gradient and the matching slice
/// rephaser (which undoes the dephasing accumulated after the pulse centre).
pub fn make_sinc_pulse(pulse: &SincPulse, system: &SystemLimits) -> Result<(Rf, Gradient, Gradient)> {
    if pulse.duration <= 0.0 || pulse.slice_thickness <= 0.0 || pulse.time_bw_product <= 0.0 {
        return Err(Error::InvalidEvent(format!(
            "sinc pulse needs a positive duration, slice thickness and time-bandwidth product: {pulse:?}"
        )));
    }

    let dwell = system.rf_raster_time;
    let n_samples = (pulse.duration / dwell).round() as usize;
    if n_samples == 0 {
        return Err(Error::InvalidEvent(format!(
            "sinc pulse of {} s is shorter than the RF raster",
            pulse.duration
        )));
    }
    let bw = pulse.time_bw_product / pulse.duration;
    let a = pulse.apodization;

    let mut signal: Vec<f64> = (0..n_samples)
        .map(|i| {
            let t = (i as f64 + 0.5) * dwell - 0.5 * pulse.duration;
            let window = 1.0 - a + a * (TAU * t / pulse.duration).cos();
            window * sinc(bw * t)
        })
        .collect();
    let flip: f64 = signal.iter().sum::<f64>() * dwell * TAU;
    for s in &mut signal {
        *s *= pulse.flip_angle / flip;
    }

    let amplitude = bw / pulse.slice_thickness;
    let flat_area = amplitude * pulse.duration;
    let gz = make_trapezoid(
        GradientChannel::Z,
        TrapRequest::FlatArea {
            flat_area,
            flat_time: pulse.duration,
        },
        system,
    )?;
    // Rephase the second half of the flat top and the ramp down
    let gzr_area = -0.5 * flat_area - 0.5 * (gz.area() - flat_area);
    let gzr = make_trapezoid(
        GradientChannel::Z,
        TrapRequest::Area {
            area: gzr_area,
            duration: None,
        },
        system,
    )?;

    // The pulse has to start on the flat top and not before the dead time
    let rise = match gz {
        Gradient::Trap { rise, .. } => rise,
        Gradient::Arbitrary { .. } => 0.0,
    };
    let mut rf_delay = system.rf_dead_time;
    let mut gz_delay = 0.0;
    if rf_delay > rise {
        gz_delay = ceil_to_raster(rf_delay - rise, system.grad_raster_time);
    }
    if rf_delay < rise + gz_delay {
        rf_delay = rise + gz_delay;
    }

    let rf = Rf {
        signal: signal.into_iter().map(|s| Complex64::new(s, 0.0)).collect(),
        raster: dwell,
        delay: rf_delay,
        freq_offset: pulse.freq_offset,
        phase_offset: pulse.phase_offset,
        dead_time: system.rf_dead_time,
        ringdown_time: system.rf_ringdown_time,
    };

    Ok((rf, gz.with_delay(gz_delay), gzr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemConfig;
    use assert2::{check, let_assert};

    fn pulse() -> SincPulse {
        SincPulse {
            flip_angle: 15f64.to_radians(),
            duration: 1.5e-3,
            slice_thickness: 5e-3,
            apodization: 0.5,
            time_bw_product: 4.0,
            freq_offset: 0.0,
            phase_offset: 0.0,
        }
    }

    #[test]
    fn flip_angle_matches_request() {
        let system = SystemConfig::default().limits();
        for _ in 0..20 {
            let flip_angle = rand::random::<f64>() * std::f64::consts::PI;
            let_assert!(Ok((rf, _, _)) = make_sinc_pulse(&SincPulse { flip_angle, ..pulse() }, &system));
            check!((rf.flip_angle() - flip_angle).abs() < 1e-9);
        }
    }

    #[test]
    fn pulse_starts_on_flat_top() {
        let system = SystemConfig::default().limits();
        let_assert!(Ok((rf, gz, _)) = make_sinc_pulse(&pulse(), &system));
        // bandwidth / thickness = (4 / 1.5 ms) / 5 mm
        check!((gz.amplitude() - 4.0 / 1.5e-3 / 5e-3).abs() < 1e-6);
        let_assert!(Gradient::Trap { rise, delay, .. } = gz);
        check!((rf.delay - (rise + delay)).abs() < 1e-15);
        check!(rf.signal.len() == 1500);
    }

    #[test]
    fn rephaser_refocuses_slice() {
        let system = SystemConfig::default().limits();
        let_assert!(Ok((rf, gz, gzr)) = make_sinc_pulse(&pulse(), &system));
        let centre = rf.delay + 0.5 * rf.shape_duration();
        let dephasing = gz.integrate(centre, gz.duration());
        check!((dephasing + gzr.area()).abs() < 1e-6 * dephasing.abs());
    }

    #[test]
    fn dead_time_delays_both_events() {
        let mut config = SystemConfig::default();
        config.rf_dead_time = 2e-4;
        let system = config.limits();
        let_assert!(Ok((rf, gz, _)) = make_sinc_pulse(&pulse(), &system));
        check!(rf.delay >= system.rf_dead_time);
        check!((gz.delay() - 1e-4).abs() < 1e-12);
    }
}
