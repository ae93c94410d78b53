//! Scanner hardware limits. All limits are stored in Pulseq units, which have
//! the gyromagnetic ratio baked in: gradients in `Hz / m`, slew rates in
//! `Hz / m / s`, times in seconds.

use serde::Deserialize;

/// Gyromagnetic ratio of 1H. Unit: `Hz / T`
pub const GAMMA_1H: f64 = 42_576_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GradUnit {
    #[serde(rename = "Hz/m")]
    HzPerM,
    #[default]
    #[serde(rename = "mT/m")]
    MilliTeslaPerM,
    #[serde(rename = "T/m")]
    TeslaPerM,
}

impl GradUnit {
    /// Factor converting a value in this unit to `Hz / m`
    pub fn si_factor(self, gamma: f64) -> f64 {
        match self {
            GradUnit::HzPerM => 1.0,
            GradUnit::MilliTeslaPerM => 1e-3 * gamma,
            GradUnit::TeslaPerM => gamma,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SlewUnit {
    #[serde(rename = "Hz/m/s")]
    HzPerMPerS,
    #[serde(rename = "mT/m/ms")]
    MilliTeslaPerMPerMs,
    #[default]
    #[serde(rename = "T/m/s")]
    TeslaPerMPerS,
}

impl SlewUnit {
    /// Factor converting a value in this unit to `Hz / m / s`
    pub fn si_factor(self, gamma: f64) -> f64 {
        match self {
            SlewUnit::HzPerMPerS => 1.0,
            // 1 mT/m/ms == 1 T/m/s
            SlewUnit::MilliTeslaPerMPerMs | SlewUnit::TeslaPerMPerS => gamma,
        }
    }
}

/// Hardware limits every event constructor checks against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemLimits {
    /// Unit: `Hz / m`
    pub max_grad: f64,
    /// Unit: `Hz / m / s`
    pub max_slew: f64,
    pub grad_raster_time: f64,
    pub rf_raster_time: f64,
    pub adc_raster_time: f64,
    pub block_duration_raster: f64,
    pub rf_dead_time: f64,
    pub rf_ringdown_time: f64,
    pub adc_dead_time: f64,
    /// Unit: `Hz / T`
    pub gamma: f64,
}

/// Human-facing description of the scanner, deserialized from the `[system]`
/// table of a protocol file. Missing keys keep the defaults, which describe a
/// 32 mT/m, 130 T/m/s gradient system on a 10 µs raster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub max_grad: f64,
    pub grad_unit: GradUnit,
    pub max_slew: f64,
    pub slew_unit: SlewUnit,
    pub grad_raster_time: f64,
    pub rf_raster_time: f64,
    pub adc_raster_time: f64,
    pub block_duration_raster: f64,
    pub rf_dead_time: f64,
    pub rf_ringdown_time: f64,
    pub adc_dead_time: f64,
    pub gamma: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_grad: 32.0,
            grad_unit: GradUnit::MilliTeslaPerM,
            max_slew: 130.0,
            slew_unit: SlewUnit::TeslaPerMPerS,
            grad_raster_time: 10e-6,
            rf_raster_time: 1e-6,
            adc_raster_time: 100e-9,
            block_duration_raster: 10e-6,
            rf_dead_time: 0.0,
            rf_ringdown_time: 0.0,
            adc_dead_time: 0.0,
            gamma: GAMMA_1H,
        }
    }
}

impl SystemConfig {
    pub fn limits(&self) -> SystemLimits {
        SystemLimits {
            max_grad: self.max_grad * self.grad_unit.si_factor(self.gamma),
            max_slew: self.max_slew * self.slew_unit.si_factor(self.gamma),
            grad_raster_time: self.grad_raster_time,
            rf_raster_time: self.rf_raster_time,
            adc_raster_time: self.adc_raster_time,
            block_duration_raster: self.block_duration_raster,
            rf_dead_time: self.rf_dead_time,
            rf_ringdown_time: self.rf_ringdown_time,
            adc_dead_time: self.adc_dead_time,
            gamma: self.gamma,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn default_limits_in_pulseq_units() {
        let limits = SystemConfig::default().limits();
        check!((limits.max_grad - 32e-3 * GAMMA_1H).abs() < 1e-6);
        check!((limits.max_slew - 130.0 * GAMMA_1H).abs() < 1e-3);
        check!(limits.grad_raster_time == 10e-6);
    }

    #[test]
    fn slew_units_agree() {
        let per_ms = SlewUnit::MilliTeslaPerMPerMs.si_factor(GAMMA_1H);
        let per_s = SlewUnit::TeslaPerMPerS.si_factor(GAMMA_1H);
        check!(per_ms == per_s);
        check!(GradUnit::HzPerM.si_factor(GAMMA_1H) == 1.0);
        let tesla = GradUnit::TeslaPerM.si_factor(GAMMA_1H);
        let milli = GradUnit::MilliTeslaPerM.si_factor(GAMMA_1H);
        check!((tesla - 1e3 * milli).abs() < 1e-6);
    }
}
