//! Electrical ↔ physical length of a transmission line.
//!
//! The propagation velocity comes from a velocity factor (v = vf·c) or,
//! when none is given, from the effective permittivity (v = c/√ε_eff).

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::units::{ensure_positive, C};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransmissionLineResult {
    pub frequency_hz: f64,
    pub physical_length_m: f64,
    pub propagation_velocity_m_s: f64,
    pub guided_wavelength_m: f64,
    /// Electrical length wrapped to [0, 360).
    pub phase_deg: f64,
    pub beta_rad_m: f64,
}

fn resolve_velocity(velocity_factor: Option<f64>, eps_eff: Option<f64>) -> Result<f64> {
    match (velocity_factor, eps_eff) {
        (Some(vf), _) => {
            let vf = ensure_positive(vf, "velocity factor")?;
            if vf > 1.0 {
                return Err(RfError::invalid(format!("velocity factor must be <= 1 (got {vf})")));
            }
            Ok(vf * C)
        }
        (None, Some(eps)) => Ok(C / ensure_positive(eps, "ε_eff")?.sqrt()),
        (None, None) => Err(RfError::invalid(
            "either a velocity factor or an effective permittivity is required",
        )),
    }
}

/// Phase accumulated over `physical_length_m` at `frequency_hz`.
pub fn electrical_length(
    frequency_hz: f64,
    physical_length_m: f64,
    velocity_factor: Option<f64>,
    eps_eff: Option<f64>,
) -> Result<TransmissionLineResult> {
    let f = ensure_positive(frequency_hz, "frequency")?;
    let length = ensure_positive(physical_length_m, "length")?;
    let v = resolve_velocity(velocity_factor, eps_eff)?;
    let wavelength = v / f;
    let beta = TAU / wavelength;
    Ok(TransmissionLineResult {
        frequency_hz: f,
        physical_length_m: length,
        propagation_velocity_m_s: v,
        guided_wavelength_m: wavelength,
        phase_deg: (beta * length).to_degrees().rem_euclid(360.0),
        beta_rad_m: beta,
    })
}

/// Shortest line giving `phase_deg` of delay. The phase is first wrapped
/// to one turn, so 450° and 90° give the same length.
pub fn length_from_phase(
    frequency_hz: f64,
    phase_deg: f64,
    velocity_factor: Option<f64>,
    eps_eff: Option<f64>,
) -> Result<TransmissionLineResult> {
    let f = ensure_positive(frequency_hz, "frequency")?;
    let v = resolve_velocity(velocity_factor, eps_eff)?;
    let wavelength = v / f;
    let beta = TAU / wavelength;
    let phase_rad = phase_deg.to_radians().rem_euclid(TAU);
    Ok(TransmissionLineResult {
        frequency_hz: f,
        physical_length_m: phase_rad / beta,
        propagation_velocity_m_s: v,
        guided_wavelength_m: wavelength,
        phase_deg: phase_deg.rem_euclid(360.0),
        beta_rad_m: beta,
    })
}
