use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Result, SystemConfig};

/// How many samples the readout ADC takes. `vds_2d` gives every shot the
/// same number of samples, so both policies build identical ADCs for its
/// trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AdcSizing {
    /// One ADC as long as the longest shot, used for every shot. Shots with
    /// shorter waveforms keep sampling after their gradients have ended.
    #[default]
    ReuseMax,
    /// Every shot samples exactly as long as its own waveform.
    PerShot,
}

/// Nesting of the slice and shot loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LoopOrder {
    /// All shots of a slice before moving to the next slice.
    #[default]
    SliceMajor,
    /// Every slice for one shot before moving to the next shot.
    ShotMajor,
}

/// Protocol of the 2D spiral sequence. Every field has a default, a TOML
/// file only needs to contain the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    /// Unit: `m`
    pub fov: f64,
    pub nx: usize,
    /// Only recorded in the file definitions, the spiral is designed for `nx`.
    pub ny: usize,
    /// Unit: `m`
    pub slice_thickness: f64,
    /// Unit: `s`
    pub tr: f64,
    /// Unit: `s`
    pub te: f64,
    pub n_shots: usize,
    /// Density exponent of the spiral, 1 is uniform.
    pub alpha: f64,
    pub n_slices: usize,
    /// Unit: `deg`
    pub flip_angle: f64,
    /// Unit: `s`
    pub rf_duration: f64,
    pub apodization: f64,
    pub time_bw_product: f64,
    /// Unit: `s`
    pub rephase_duration: f64,
    /// The spoiler is played out over three times this. Unit: `s`
    pub pre_time: f64,
    /// Applied to the exported k-space trajectory.
    pub trajectory_scale: f64,
    pub adc_sizing: AdcSizing,
    pub loop_order: LoopOrder,
    pub output: PathBuf,
    pub system: SystemConfig,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            fov: 256e-3,
            nx: 128,
            ny: 256,
            slice_thickness: 5e-3,
            tr: 25e-3,
            te: 5e-3,
            n_shots: 16,
            alpha: 9.0,
            n_slices: 3,
            flip_angle: 15.0,
            rf_duration: 1.5e-3,
            apodization: 0.5,
            time_bw_product: 4.0,
            rephase_duration: 1e-3,
            pre_time: 8e-4,
            trajectory_scale: 1e-3,
            adc_sizing: AdcSizing::default(),
            loop_order: LoopOrder::default(),
            output: PathBuf::from("spiral_2d_256_9_3_16_python.seq"),
            system: SystemConfig::default(),
        }
    }
}

impl SpiralConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded protocol from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, GradUnit};
    use assert2::{check, let_assert};

    #[test]
    fn partial_toml_keeps_defaults() {
        let text = r#"
            n_shots = 8
            te = 6e-3
            adc_sizing = "per-shot"
            loop_order = "shot-major"

            [system]
            max_grad = 40.0
        "#;
        let_assert!(Ok(config) = SpiralConfig::from_toml_str(text));
        check!(config.n_shots == 8);
        check!(config.te == 6e-3);
        check!(config.adc_sizing == AdcSizing::PerShot);
        check!(config.loop_order == LoopOrder::ShotMajor);
        check!(config.system.max_grad == 40.0);
        check!(config.system.grad_unit == GradUnit::MilliTeslaPerM);
        check!(config.nx == 128);
        check!(config.output == PathBuf::from("spiral_2d_256_9_3_16_python.seq"));
    }

    #[test]
    fn empty_toml_is_default() {
        let_assert!(Ok(config) = SpiralConfig::from_toml_str(""));
        check!(config == SpiralConfig::default());
    }

    #[test]
    fn bad_values_are_reported() {
        let_assert!(Err(Error::Config(_)) = SpiralConfig::from_toml_str("n_shots = \"many\""));
        let_assert!(Err(Error::Config(_)) = SpiralConfig::from_toml_str("loop_order = \"random\""));
        let_assert!(Err(Error::Io(_)) = SpiralConfig::load("/nonexistent/protocol.toml"));
    }
}
