use crate::{Error, Gradient, GradientChannel, Result, SystemLimits};

/// Gradient following `waveform` (Hz/m, one sample per gradient raster).
/// Fails if the waveform exceeds the amplitude or slew rate limit.
pub fn make_arbitrary_grad(
    channel: GradientChannel,
    waveform: Vec<f64>,
    system: &SystemLimits,
) -> Result<Gradient> {
    if waveform.is_empty() {
        return Err(Error::InvalidEvent(format!(
            "arbitrary {channel:?} gradient without samples"
        )));
    }
    let raster = system.grad_raster_time;

    let peak = waveform.iter().map(|g| g.abs()).fold(0.0, f64::max);
    if peak > system.max_grad {
        return Err(Error::GradientLimit {
            channel,
            limit: "amplitude",
            value: peak,
            max: system.max_grad,
        });
    }

    let slew = waveform
        .windows(2)
        .map(|w| (w[1] - w[0]).abs() / raster)
        .fold(0.0, f64::max);
    if slew > system.max_slew {
        return Err(Error::GradientLimit {
            channel,
            limit: "slew rate",
            value: slew,
            max: system.max_slew,
        });
    }

    Ok(Gradient::Arbitrary {
        channel,
        waveform,
        raster,
        delay: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemConfig;
    use assert2::{check, let_assert};

    #[test]
    fn accepts_slow_ramp() {
        let system = SystemConfig::default().limits();
        let step = 0.5 * system.max_slew * system.grad_raster_time;
        // 40 steps of half the slew limit stay below the amplitude limit
        let waveform: Vec<f64> = (0..40).map(|i| i as f64 * step).collect();
        check!(waveform[39] < system.max_grad);
        let_assert!(Ok(g) = make_arbitrary_grad(GradientChannel::X, waveform, &system));
        check!(g.channel() == GradientChannel::X);
        check!((g.duration() - 40.0 * system.grad_raster_time).abs() < 1e-15);
    }

    #[test]
    fn rejects_slew_violation() {
        let system = SystemConfig::default().limits();
        let jump = 2.0 * system.max_slew * system.grad_raster_time;
        let result = make_arbitrary_grad(GradientChannel::Y, vec![0.0, jump], &system);
        let_assert!(Err(Error::GradientLimit { limit: "slew rate", channel: GradientChannel::Y, .. }) = result);
    }

    #[test]
    fn rejects_amplitude_violation() {
        let system = SystemConfig::default().limits();
        let result = make_arbitrary_grad(GradientChannel::X, vec![1.5 * system.max_grad], &system);
        let_assert!(Err(Error::GradientLimit { limit: "amplitude", .. }) = result);
        let_assert!(Err(Error::InvalidEvent(_)) = make_arbitrary_grad(GradientChannel::X, Vec::new(), &system));
    }
}
