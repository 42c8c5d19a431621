//! Rectangular waveguide cutoff and propagation.
//!
//!   f_c(m, n) = c/2 · √((m/a)² + (n/b)²)
//!   β         = 2πf/c · √(1 − (f_c/f)²)        f > f_c
//!   λ_g       = 2π / β

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{Result, RfError};
use crate::units::{ensure_positive, C};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum WaveguideMode {
    #[strum(serialize = "TE")]
    #[serde(rename = "TE")]
    Te,
    #[strum(serialize = "TM")]
    #[serde(rename = "TM")]
    Tm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffResult {
    /// Mode label such as `TE10`.
    pub mode: String,
    pub cutoff_hz: f64,
    pub cutoff_ghz: f64,
    /// False when no operating frequency was given.
    pub propagates: bool,
    /// Empty when no operating frequency was given.
    pub guidance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationResult {
    pub frequency_hz: f64,
    pub cutoff_hz: f64,
    pub wavelength_free_space_m: f64,
    /// `None` at or below cutoff.
    pub guide_wavelength_m: Option<f64>,
    pub phase_constant_rad_m: Option<f64>,
}

fn validate_mode(mode: WaveguideMode, m: u32, n: u32) -> Result<()> {
    match mode {
        WaveguideMode::Te if m == 0 && n == 0 => {
            Err(RfError::invalid("TE modes cannot have m = n = 0"))
        }
        WaveguideMode::Tm if m == 0 || n == 0 => Err(RfError::invalid("TM modes need m, n >= 1")),
        _ => Ok(()),
    }
}

/// Cutoff frequency of mode (m, n) in an `a × b` guide.
pub fn cutoff_frequency_hz(mode: WaveguideMode, m: u32, n: u32, a_m: f64, b_m: f64) -> Result<f64> {
    validate_mode(mode, m, n)?;
    let a = ensure_positive(a_m, "a")?;
    let b = ensure_positive(b_m, "b")?;
    let kx = f64::from(m) / a;
    let ky = f64::from(n) / b;
    Ok(C / 2.0 * (kx * kx + ky * ky).sqrt())
}

pub fn cutoff_summary(
    mode: WaveguideMode,
    m: u32,
    n: u32,
    a_m: f64,
    b_m: f64,
    frequency_hz: Option<f64>,
) -> Result<CutoffResult> {
    let fc = cutoff_frequency_hz(mode, m, n, a_m, b_m)?;
    let (propagates, guidance) = match frequency_hz {
        Some(f) if f > fc => (true, "Above cutoff: the mode propagates."),
        Some(_) => (false, "At or below cutoff: the mode is evanescent."),
        None => (false, ""),
    };
    Ok(CutoffResult {
        mode: format!("{mode}{m}{n}"),
        cutoff_hz: fc,
        cutoff_ghz: fc / 1e9,
        propagates,
        guidance: guidance.to_string(),
    })
}

pub fn propagation_parameters(frequency_hz: f64, cutoff_hz: f64) -> Result<PropagationResult> {
    let f = ensure_positive(frequency_hz, "frequency")?;
    let fc = ensure_positive(cutoff_hz, "cutoff frequency")?;
    let (guide_wavelength_m, phase_constant_rad_m) = if f > fc {
        let ratio = (1.0 - (fc / f).powi(2)).sqrt();
        let beta = 2.0 * PI * f / C * ratio;
        (Some(2.0 * PI / beta), Some(beta))
    } else {
        (None, None)
    };
    Ok(PropagationResult {
        frequency_hz: f,
        cutoff_hz: fc,
        wavelength_free_space_m: C / f,
        guide_wavelength_m,
        phase_constant_rad_m,
    })
}
