use crate::util::ceil_to_raster;
use crate::{Error, Gradient, GradientChannel, Result, SystemLimits};

/// What a trapezoid has to achieve. Ramps are always as short as the slew
/// rate allows, rounded up to the gradient raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrapRequest {
    /// Total area in `1 / m`. Without a duration, the shortest trapezoid is
    /// built; otherwise the lowest amplitude that fits into `duration`.
    Area { area: f64, duration: Option<f64> },
    /// Area of the flat top only, played out over exactly `flat_time`.
    FlatArea { flat_area: f64, flat_time: f64 },
}

pub fn make_trapezoid(
    channel: GradientChannel,
    request: TrapRequest,
    system: &SystemLimits,
) -> Result<Gradient> {
    let raster = system.grad_raster_time;
    let ramp = |amplitude: f64| ceil_to_raster(amplitude.abs() / system.max_slew, raster).max(raster);

    let (amplitude, rise, flat) = match request {
        TrapRequest::Area {
            area,
            duration: Some(duration),
        } => {
            // Solve area = amp * (duration - amp / slew) for the smallest amp
            let d_c = 1.0 / system.max_slew;
            let discriminant = duration * duration - 4.0 * area.abs() * d_c;
            if discriminant < 0.0 {
                return Err(Error::InvalidTrapezoid(format!(
                    "area {area} 1/m does not fit into {duration} s"
                )));
            }
            let rise = ramp((duration - discriminant.sqrt()) / (2.0 * d_c));
            let flat = duration - 2.0 * rise;
            if flat < -1e-12 {
                return Err(Error::InvalidTrapezoid(format!(
                    "ramps of {rise} s do not fit into {duration} s"
                )));
            }
            let flat = flat.max(0.0);
            (area / (rise + flat), rise, flat)
        }
        TrapRequest::Area {
            area,
            duration: None,
        } => {
            // Triangle first, widen the flat top if that is too high
            let rise = ceil_to_raster((area.abs() / system.max_slew).sqrt(), raster).max(raster);
            let amplitude = area / rise;
            if amplitude.abs() <= system.max_grad {
                (amplitude, rise, 0.0)
            } else {
                let t_eff = ceil_to_raster(area.abs() / system.max_grad, raster);
                let amplitude = area / t_eff;
                let rise = ramp(amplitude);
                (amplitude, rise, (t_eff - rise).max(0.0))
            }
        }
        TrapRequest::FlatArea {
            flat_area,
            flat_time,
        } => {
            if flat_time <= 0.0 {
                return Err(Error::InvalidTrapezoid(format!(
                    "flat time must be positive, got {flat_time} s"
                )));
            }
            let amplitude = flat_area / flat_time;
            (amplitude, ramp(amplitude), flat_time)
        }
    };

    if amplitude.abs() > system.max_grad {
        return Err(Error::GradientLimit {
            channel,
            limit: "amplitude",
            value: amplitude.abs(),
            max: system.max_grad,
        });
    }

    Ok(Gradient::Trap {
        channel,
        amplitude,
        rise,
        flat,
        fall: rise,
        delay: 0.0,
    })
}
