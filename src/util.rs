use std::ops::MulAssign;

// Tolerance used when snapping times onto a raster, so that values like
// 320.00000000000006 raster periods do not round up to 321.
const RASTER_EPS: f64 = 1e-9;

/// Round `t` up to the next multiple of `raster`.
pub fn ceil_to_raster(t: f64, raster: f64) -> f64 {
    (t / raster - RASTER_EPS).ceil() * raster
}

/// Number of raster periods closest to `t`.
pub fn raster_ticks(t: f64, raster: f64) -> i64 {
    (t / raster).round() as i64
}

/// Magnetization vector used to measure the flip angle of RF shapes.
/// Accumulates in double precision, rotations are applied sample by sample.
pub struct Magnetization([f64; 3]);

impl Magnetization {
    pub fn relaxed() -> Self {
        Self([0.0, 0.0, 1.0])
    }

    /// Angle between the magnetization and the z axis. Unit: `rad`
    pub fn angle(&self) -> f64 {
        let [x, y, z] = self.0;
        f64::atan2((x * x + y * y).sqrt(), z)
    }
}

/// Rotation by `angle` around the transverse axis `(cos(phase), sin(phase), 0)`.
pub struct Rotation([[f64; 3]; 3]);

impl Rotation {
    pub fn new(angle: f64, phase: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let (ny, nx) = phase.sin_cos();
        let t = 1.0 - c;
        // Rodrigues' formula with n = (nx, ny, 0)
        Self([
            [c + t * nx * nx, t * nx * ny, s * ny],
            [t * nx * ny, c + t * ny * ny, -s * nx],
            [-s * ny, s * nx, c],
        ])
    }
}

impl MulAssign<Rotation> for Magnetization {
    fn mul_assign(&mut self, rhs: Rotation) {
        let m = self.0;
        let r = rhs.0;
        self.0 = [
            r[0][0] * m[0] + r[0][1] * m[1] + r[0][2] * m[2],
            r[1][0] * m[0] + r[1][1] * m[1] + r[1][2] * m[2],
            r[2][0] * m[0] + r[2][1] * m[1] + r[2][2] * m[2],
        ];
    }
}

/// Integral of a unit-amplitude trapezoid over `[t_start, t_end]`, with the
/// trapezoid starting at `t = 0`.
pub fn integrate_trap(t_start: f64, t_end: f64, rise: f64, flat: f64, fall: f64) -> f64 {
    let integral = |t: f64| {
        if t <= rise {
            0.5 * t * t / rise
        } else if t <= rise + flat {
            0.5 * rise + (t - rise)
        } else {
            let rev_t = rise + flat + fall - t;
            0.5 * rise + flat + 0.5 * (fall - rev_t * rev_t / fall)
        }
    };
    let t_max = rise + flat + fall;
    integral(t_end.clamp(0.0, t_max)) - integral(t_start.clamp(0.0, t_max))
}

/// Integral of a piecewise constant waveform (one value per `dwell`, starting
/// at `t = 0`) over `[t_start, t_end]`.
pub fn integrate_free(t_start: f64, t_end: f64, waveform: &[f64], dwell: f64) -> f64 {
    let mut integrated = 0.0;

    for (i, value) in waveform.iter().enumerate() {
        let t = i as f64 * dwell;
        if t + dwell <= t_start {
            continue;
        }
        if t_end <= t {
            break;
        }

        // Only clamp the edge samples: clamping every sample accumulates
        // rounding errors over long waveforms.
        let dur = if t_start <= t && t + dwell <= t_end {
            dwell
        } else {
            (t + dwell).clamp(t_start, t_end) - t.clamp(t_start, t_end)
        };

        integrated += value * dur;
    }

    integrated
}
