use crate::{Adc, Delay, Error, Result, SystemLimits};

/// Readout of `num_samples` samples spaced by `dwell`. The ADC dead time of
/// the system is applied as minimum delay.
pub fn make_adc(num_samples: usize, dwell: f64, system: &SystemLimits) -> Result<Adc> {
    if num_samples == 0 || dwell <= 0.0 {
        return Err(Error::InvalidEvent(format!(
            "ADC needs samples and a positive dwell time, got {num_samples} x {dwell} s"
        )));
    }
    Ok(Adc {
        num_samples,
        dwell,
        delay: system.adc_dead_time,
        freq_offset: 0.0,
        phase_offset: 0.0,
        dead_time: system.adc_dead_time,
    })
}

pub fn make_delay(duration: f64) -> Result<Delay> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::NegativeDelay {
            which: "delay",
            value: duration,
        });
    }
    Ok(Delay { duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemConfig;
    use assert2::{check, let_assert};

    #[test]
    fn adc_duration() {
        let system = SystemConfig::default().limits();
        let_assert!(Ok(adc) = make_adc(1000, 1e-5, &system));
        check!((adc.duration() - 1e-2).abs() < 1e-15);
        check!(make_adc(0, 1e-5, &system).is_err());
    }

    #[test]
    fn delays_must_not_be_negative() {
        let_assert!(Ok(delay) = make_delay(3.2e-3));
        check!(delay.duration == 3.2e-3);
        let_assert!(Err(Error::NegativeDelay { .. }) = make_delay(-1e-6));
        check!(make_delay(f64::NAN).is_err());
    }
}
