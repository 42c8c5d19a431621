//! Declarative project configuration supplied by the caller.
//!
//! All structs deserialize from partial JSON: missing fields take the
//! `Default` values below.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::pattern::NormalizationMode;
use crate::units::{ensure_non_negative, ensure_positive, wavelength_m, EPSILON};

// ── Per-axis array geometry ──────────────────────────────────────────────────

/// Array geometry shared by both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    /// Number of elements, ≥ 1.
    pub count: usize,
    /// Element spacing in metres. 0 means "one wavelength" when count > 1.
    pub spacing_m: f64,
    /// Phase increment per element index, degrees.
    pub progressive_phase_deg: f64,
    /// Geometric amplitude ratio per element index. 1.0 = uniform; 0 is
    /// treated as uniform.
    pub amplitude_taper: f64,
    pub normalization: NormalizationMode,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            count: 1,
            spacing_m: 0.0,
            progressive_phase_deg: 0.0,
            amplitude_taper: 1.0,
            normalization: NormalizationMode::Peak,
        }
    }
}

impl ArrayConfig {
    /// Spacing actually used: the configured value, or one wavelength when
    /// unspecified for a multi-element array.
    pub fn effective_spacing_m(&self, wavelength_m: f64) -> f64 {
        let spacing = self.spacing_m.max(0.0);
        if self.count > 1 && spacing <= EPSILON {
            wavelength_m
        } else {
            spacing
        }
    }

    /// Taper ratio with the "0 means uniform" convention applied.
    pub fn effective_taper(&self) -> f64 {
        if self.amplitude_taper == 0.0 {
            1.0
        } else {
            self.amplitude_taper
        }
    }

    /// Amplitude weight of element `index`: `taper^index`.
    pub fn weight(&self, index: usize) -> f64 {
        self.effective_taper().powi(index as i32)
    }

    fn validate(&self, axis: &str) -> Result<()> {
        if self.count == 0 {
            return Err(RfError::invalid(format!("{axis} element count must be at least 1")));
        }
        ensure_non_negative(self.spacing_m, &format!("{axis} spacing"))?;
        if !self.progressive_phase_deg.is_finite() || !self.amplitude_taper.is_finite() {
            return Err(RfError::invalid(format!("{axis} phase and taper must be finite")));
        }
        Ok(())
    }
}

/// How horizontal elements are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ArrayLayout {
    /// Broadside line of elements sharing one boresight.
    Linear,
    /// Ring of panels, each rotated by `index · step_deg`.
    Circular { step_deg: f64 },
}

/// Horizontal axis: array geometry plus the panel rotation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalArrayConfig {
    #[serde(flatten)]
    pub array: ArrayConfig,
    /// 0 = linear array; > 0 = circular array rotated by this step.
    pub angular_step_deg: f64,
}

impl HorizontalArrayConfig {
    pub fn layout(&self) -> ArrayLayout {
        if self.angular_step_deg.abs() < 1e-6 {
            ArrayLayout::Linear
        } else {
            ArrayLayout::Circular { step_deg: self.angular_step_deg }
        }
    }
}

/// Vertical axis: array geometry plus electrical tilt. The configured
/// progressive phase is ignored; it is derived from the tilt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalArrayConfig {
    #[serde(flatten)]
    pub array: ArrayConfig,
    /// Electrical down-tilt in degrees. The main beam is steered to the
    /// grid angle θ = tilt, i.e. `tilt` degrees below the horizon.
    pub tilt_deg: f64,
}

/// Progressive phase (degrees) that realises `tilt_deg` on a vertical
/// array with element `spacing_m` at `frequency_mhz`:
///
///   β = −2π · d · sin(tilt) / λ
pub fn vertical_progressive_phase_deg(frequency_mhz: f64, spacing_m: f64, tilt_deg: f64) -> f64 {
    let lambda = wavelength_m(frequency_mhz.max(EPSILON) * 1e6);
    (-2.0 * std::f64::consts::PI * spacing_m * tilt_deg.to_radians().sin() / lambda).to_degrees()
}

// ── Project ──────────────────────────────────────────────────────────────────

/// Everything the composition and ERP pipeline needs for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub frequency_mhz: f64,
    pub tx_power_w: f64,
    pub feeder_loss_db: f64,
    pub nominal_element_gain_dbd: f64,
    pub horizontal: HorizontalArrayConfig,
    pub vertical: VerticalArrayConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            frequency_mhz: 100.0,
            tx_power_w: 1000.0,
            feeder_loss_db: 0.0,
            nominal_element_gain_dbd: 0.0,
            horizontal: HorizontalArrayConfig::default(),
            vertical: VerticalArrayConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Check the data-model invariants.
    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.frequency_mhz, "frequency")?;
        ensure_positive(self.tx_power_w, "transmit power")?;
        ensure_non_negative(self.feeder_loss_db, "feeder loss")?;
        if !self.nominal_element_gain_dbd.is_finite() {
            return Err(RfError::invalid("nominal element gain must be finite"));
        }
        self.horizontal.array.validate("horizontal")?;
        self.vertical.array.validate("vertical")?;
        if !self.horizontal.angular_step_deg.is_finite() || !self.vertical.tilt_deg.is_finite() {
            return Err(RfError::invalid("angular step and tilt must be finite"));
        }
        Ok(())
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_mhz * 1e6
    }

    pub fn wavelength_m(&self) -> f64 {
        wavelength_m(self.frequency_hz())
    }

    /// Hash of the canonical JSON form, for callers caching an ERP table
    /// per configuration. Stable within one build of the crate only.
    pub fn fingerprint(&self) -> Result<u64> {
        let json = serde_json::to_string(self)
            .map_err(|e| RfError::invalid(format!("unserialisable configuration: {e}")))?;
        let mut hasher = DefaultHasher::new();
        json.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: ProjectConfig = serde_json::from_str(
            r#"{"frequency_mhz": 98.1,
                "horizontal": {"count": 4, "angular_step_deg": 90, "normalization": "max"},
                "vertical": {"count": 8, "tilt_deg": 1.5, "spacing_m": 2.8}}"#,
        )
        .unwrap();
        assert_eq!(cfg.horizontal.array.count, 4);
        assert_eq!(cfg.horizontal.array.amplitude_taper, 1.0);
        assert_eq!(cfg.horizontal.layout(), ArrayLayout::Circular { step_deg: 90.0 });
        assert_eq!(cfg.vertical.array.spacing_m, 2.8);
        assert_eq!(cfg.tx_power_w, 1000.0);
        cfg.validate().unwrap();
    }

    #[test]
    fn spacing_defaults_to_one_wavelength() {
        let a = ArrayConfig { count: 4, ..Default::default() };
        assert_abs_diff_eq!(a.effective_spacing_m(3.0), 3.0);
        let single = ArrayConfig::default();
        assert_abs_diff_eq!(single.effective_spacing_m(3.0), 0.0);
        let explicit = ArrayConfig { count: 4, spacing_m: 1.2, ..Default::default() };
        assert_abs_diff_eq!(explicit.effective_spacing_m(3.0), 1.2);
    }

    #[test]
    fn zero_taper_is_uniform() {
        let a = ArrayConfig { count: 3, amplitude_taper: 0.0, ..Default::default() };
        assert_eq!(a.weight(2), 1.0);
        let b = ArrayConfig { count: 3, amplitude_taper: 0.5, ..Default::default() };
        assert_eq!(b.weight(2), 0.25);
    }

    #[test]
    fn validation_rejects_bad_inputs() {
        let mut cfg = ProjectConfig::default();
        cfg.frequency_mhz = 0.0;
        assert!(cfg.validate().is_err());
        let mut cfg = ProjectConfig::default();
        cfg.feeder_loss_db = -1.0;
        assert!(cfg.validate().is_err());
        let mut cfg = ProjectConfig::default();
        cfg.vertical.array.count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn positive_tilt_gives_negative_phase() {
        // Half-wavelength spacing at 100 MHz, 10° tilt: β = −180·sin(10°).
        let lambda = C_OVER_100MHZ;
        let beta = vertical_progressive_phase_deg(100.0, lambda / 2.0, 10.0);
        assert_abs_diff_eq!(beta, -180.0 * 10f64.to_radians().sin(), epsilon = 1e-9);
        assert_abs_diff_eq!(vertical_progressive_phase_deg(100.0, 1.0, 0.0), 0.0);
    }

    const C_OVER_100MHZ: f64 = crate::units::C / 100e6;

    #[test]
    fn fingerprint_tracks_changes() {
        let a = ProjectConfig::default();
        let mut b = a.clone();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        b.vertical.tilt_deg = 2.0;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }
}
