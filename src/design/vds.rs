use ndarray::{Array2, ArrayView1};
use num_complex::Complex64;
use std::f64::consts::TAU;

use crate::{Error, Result, SystemLimits};

// The analytic design only approximates the slew rate, so the sampled
// waveform is checked and the design repeated with tightened limits.
const MAX_PASSES: usize = 16;
const TIGHTEN: f64 = 0.995;
const HEADROOM: f64 = 1.0 - 1e-9;

/// Interleaved spiral: `kspace` has one more row than `gradient` because
/// k-space is sampled at the raster edges and the gradient at the centres.
/// Columns are shots.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// Unit: `1 / m`
    pub kspace: Array2<Complex64>,
    /// Real part is the x, imaginary part the y gradient. Unit: `Hz / m`
    pub gradient: Array2<Complex64>,
    /// Radius of the covered k-space disc (`N / 2 FOV`). Unit: `1 / m`
    pub density: f64,
}

impl Trajectory {
    pub fn n_shots(&self) -> usize {
        self.gradient.ncols()
    }

    pub fn n_samples(&self) -> usize {
        self.gradient.nrows()
    }

    pub fn shot(&self, shot: usize) -> ArrayView1<'_, Complex64> {
        self.gradient.column(shot)
    }

    /// x and y gradient waveforms of one shot.
    pub fn shot_waveforms(&self, shot: usize) -> (Vec<f64>, Vec<f64>) {
        let column = self.shot(shot);
        (
            column.iter().map(|g| g.re).collect(),
            column.iter().map(|g| g.im).collect(),
        )
    }

    /// k-space split into x and y arrays, multiplied by `scale`.
    pub fn split_kspace(&self, scale: f64) -> (Array2<f64>, Array2<f64>) {
        (
            self.kspace.mapv(|k| k.re * scale),
            self.kspace.mapv(|k| k.im * scale),
        )
    }
}

/// `k(t) = lambda * tau(t)^alpha * exp(i * omega * tau(t))`, where `tau` runs
/// from 0 to 1, first slew rate limited and, if the gradient amplitude limit
/// is reached, amplitude limited afterwards.
struct AnalyticSpiral {
    lambda: f64,
    omega: f64,
    alpha: f64,
    t_es: f64,
    t_ea: f64,
    t_s2a: f64,
    tau_trans: f64,
    amplitude_limited: bool,
    t_end: f64,
}

impl AnalyticSpiral {
    fn new(lambda: f64, omega: f64, alpha: f64, max_grad: f64, max_slew: f64) -> Self {
        let t_ea = lambda * omega / (max_grad * (alpha + 1.0));
        let t_es = (lambda * omega * omega / max_slew).sqrt() / (alpha / 2.0 + 1.0);
        let t_s2a = (t_es.powf((alpha + 1.0) / (alpha / 2.0 + 1.0)) * (alpha / 2.0 + 1.0)
            / (t_ea * (alpha + 1.0)))
            .powf(1.0 + 2.0 / alpha);

        let amplitude_limited = t_s2a < t_es;
        let (tau_trans, t_end) = if amplitude_limited {
            let tau_trans = (t_s2a / t_es).powf(1.0 / (alpha / 2.0 + 1.0));
            (tau_trans, t_s2a + t_ea * (1.0 - tau_trans.powf(alpha + 1.0)))
        } else {
            (1.0, t_es)
        };

        Self {
            lambda,
            omega,
            alpha,
            t_es,
            t_ea,
            t_s2a,
            tau_trans,
            amplitude_limited,
            t_end,
        }
    }

    fn tau(&self, t: f64) -> f64 {
        let tau = if self.amplitude_limited && t > self.t_s2a {
            ((t - self.t_s2a) / self.t_ea + self.tau_trans.powf(self.alpha + 1.0))
                .powf(1.0 / (self.alpha + 1.0))
        } else {
            (t / self.t_es).powf(1.0 / (self.alpha / 2.0 + 1.0))
        };
        tau.min(1.0)
    }

    fn k(&self, t: f64) -> Complex64 {
        let tau = self.tau(t);
        Complex64::from_polar(self.lambda * tau.powf(self.alpha), self.omega * tau)
    }
}

/// Variable density spiral with `n_shots` interleaves covering a `n x n`
/// matrix over `fov`. `alpha` > 1 oversamples the k-space centre.
pub fn vds_2d(
    fov: f64,
    n: usize,
    n_shots: usize,
    alpha: f64,
    system: &SystemLimits,
) -> Result<Trajectory> {
    if fov <= 0.0 || n == 0 || n_shots == 0 || n_shots >= n || alpha <= 0.0 {
        return Err(Error::TrajectoryDesign(format!(
            "need fov > 0, 0 < n_shots < n and alpha > 0, got fov={fov}, n={n}, n_shots={n_shots}, alpha={alpha}"
        )));
    }

    let lambda = n as f64 / (2.0 * fov);
    let n_turns = 1.0 / (1.0 - (1.0 - n_shots as f64 / n as f64).powf(1.0 / alpha));
    let omega = TAU * n_turns;
    let raster = system.grad_raster_time;

    let mut max_grad = system.max_grad;
    let mut max_slew = system.max_slew;
    for pass in 1..=MAX_PASSES {
        let spiral = AnalyticSpiral::new(lambda, omega, alpha, max_grad, max_slew);
        let n_samples = (spiral.t_end / raster).ceil().max(1.0) as usize;
        // Played out on the raster, but sampled so the last point hits the end
        let step = spiral.t_end / n_samples as f64;
        let k: Vec<Complex64> = (0..=n_samples).map(|i| spiral.k(i as f64 * step)).collect();
        let g: Vec<Complex64> = k.windows(2).map(|w| (w[1] - w[0]) / raster).collect();

        let peak_grad = g.iter().map(|g| g.norm()).fold(0.0, f64::max);
        let peak_slew = g
            .windows(2)
            .map(|w| (w[1] - w[0]).norm() / raster)
            .fold(0.0, f64::max);

        if peak_grad <= system.max_grad * HEADROOM && peak_slew <= system.max_slew * HEADROOM {
            log::info!(
                "spiral: {n_turns:.1} turns, {n_samples} samples ({:.3} ms) per shot, {pass} design pass(es)",
                n_samples as f64 * raster * 1e3
            );
            return Ok(interleave(&k, &g, n_shots, lambda));
        }

        log::debug!(
            "spiral pass {pass}: peak gradient {peak_grad:.0} Hz/m, peak slew {peak_slew:.4e} Hz/m/s"
        );
        if peak_grad > system.max_grad * HEADROOM {
            max_grad *= system.max_grad / peak_grad * TIGHTEN;
        }
        if peak_slew > system.max_slew * HEADROOM {
            max_slew *= system.max_slew / peak_slew * TIGHTEN;
        }
    }

    Err(Error::TrajectoryDesign(format!(
        "waveform still exceeds the system limits after {MAX_PASSES} passes"
    )))
}

fn interleave(k: &[Complex64], g: &[Complex64], n_shots: usize, density: f64) -> Trajectory {
    let rotations: Vec<Complex64> = (0..n_shots)
        .map(|s| Complex64::from_polar(1.0, TAU * s as f64 / n_shots as f64))
        .collect();

    Trajectory {
        kspace: Array2::from_shape_fn((k.len(), n_shots), |(i, s)| k[i] * rotations[s]),
        gradient: Array2::from_shape_fn((g.len(), n_shots), |(i, s)| g[i] * rotations[s]),
        density,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemConfig;
    use assert2::{check, let_assert};

    fn default_spiral() -> (Trajectory, SystemLimits) {
        let system = SystemConfig::default().limits();
        let_assert!(Ok(traj) = vds_2d(0.256, 128, 16, 9.0, &system));
        (traj, system)
    }

    #[test]
    fn shape_and_coverage() {
        let (traj, _) = default_spiral();
        check!(traj.n_shots() == 16);
        check!(traj.kspace.nrows() == traj.n_samples() + 1);
        check!((traj.density - 250.0).abs() < 1e-9);

        // Starts in the centre and ends on the k-space edge
        check!(traj.kspace[[0, 0]].norm() == 0.0);
        let k_end = traj.kspace[[traj.n_samples(), 3]].norm();
        check!((k_end - traj.density).abs() < 1e-9);
    }

    #[test]
    fn gradient_integrates_to_kspace() {
        let (traj, system) = default_spiral();
        for shot in [0, 7, 15] {
            let sum: Complex64 = traj.shot(shot).iter().sum::<Complex64>() * system.grad_raster_time;
            let k_end = traj.kspace[[traj.n_samples(), shot]];
            check!((sum - k_end).norm() < 1e-6);
        }
    }

    #[test]
    fn waveforms_respect_limits() {
        let (traj, system) = default_spiral();
        for shot in 0..traj.n_shots() {
            let (gx, gy) = traj.shot_waveforms(shot);
            for w in [gx, gy] {
                check!(w.iter().all(|g| g.abs() <= system.max_grad));
                check!(w
                    .windows(2)
                    .all(|d| (d[1] - d[0]).abs() / system.grad_raster_time <= system.max_slew));
            }
        }
    }

    #[test]
    fn shots_are_rotated_copies() {
        let (traj, _) = default_spiral();
        let rot = Complex64::from_polar(1.0, TAU * 5.0 / 16.0);
        for i in (0..traj.n_samples()).step_by(97) {
            check!((traj.gradient[[i, 0]] * rot - traj.gradient[[i, 5]]).norm() < 1e-6);
        }
    }

    #[test]
    fn split_kspace_scales() {
        let (traj, _) = default_spiral();
        let (kx, ky) = traj.split_kspace(1e-3);
        let i = traj.n_samples() / 2;
        check!((kx[[i, 2]] - traj.kspace[[i, 2]].re * 1e-3).abs() < 1e-15);
        check!((ky[[i, 2]] - traj.kspace[[i, 2]].im * 1e-3).abs() < 1e-15);
    }

    #[test]
    fn invalid_parameters() {
        let system = SystemConfig::default().limits();
        let_assert!(Err(Error::TrajectoryDesign(_)) = vds_2d(0.256, 16, 16, 9.0, &system));
        let_assert!(Err(Error::TrajectoryDesign(_)) = vds_2d(0.0, 128, 16, 9.0, &system));
    }
}
