//! Reflection-coefficient, VSWR and return-loss conversions.
//!
//!   |Γ|  = (VSWR − 1) / (VSWR + 1)
//!   VSWR = (1 + |Γ|) / (1 − |Γ|)
//!   RL   = −20·log10|Γ|
//!   ML   = −10·log10(1 − |Γ|²)

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::units::ensure_positive;

/// Upper clamp applied to |Γ| before taking the mismatch loss.
const GAMMA_CEILING: f64 = 0.999_999;

/// Full description of one reflection coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SParameterResult {
    pub magnitude_linear: f64,
    pub magnitude_db: f64,
    pub phase_deg: f64,
    pub gamma: Complex64,
    pub gamma_mag: f64,
    /// Mismatch loss, dB. Infinite for |Γ| ≥ 1.
    pub reflection_loss_db: f64,
    /// 0 for |Γ| ≥ 1.
    pub return_loss_db: f64,
    /// Infinite for |Γ| ≥ 1.
    pub vswr: f64,
    pub rho: f64,
}

// ── Scalar conversions ────────────────────────────────────────────────────────

pub fn magnitude_db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

pub fn magnitude_linear_to_db(magnitude: f64) -> Result<f64> {
    Ok(20.0 * ensure_positive(magnitude, "|S|")?.log10())
}

pub fn power_db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub fn power_linear_to_db(linear: f64) -> Result<f64> {
    Ok(10.0 * ensure_positive(linear, "power")?.log10())
}

fn check_gamma(gamma_mag: f64) -> Result<f64> {
    if (0.0..1.0).contains(&gamma_mag) {
        Ok(gamma_mag)
    } else {
        Err(RfError::invalid(format!("|Γ| must lie in [0, 1) (got {gamma_mag})")))
    }
}

pub fn gamma_from_vswr(vswr: f64) -> Result<f64> {
    let vswr = ensure_positive(vswr, "VSWR")?;
    if vswr < 1.0 {
        return Err(RfError::invalid(format!("VSWR must be >= 1 (got {vswr})")));
    }
    Ok((vswr - 1.0) / (vswr + 1.0))
}

pub fn vswr_from_gamma(gamma_mag: f64) -> Result<f64> {
    let g = check_gamma(gamma_mag)?;
    Ok((1.0 + g) / (1.0 - g))
}

/// Requires 0 < |Γ| < 1; a perfect match has no finite return loss.
pub fn return_loss_from_gamma(gamma_mag: f64) -> Result<f64> {
    if !(gamma_mag > 0.0 && gamma_mag < 1.0) {
        return Err(RfError::invalid(format!("|Γ| must lie in (0, 1) (got {gamma_mag})")));
    }
    Ok(-20.0 * gamma_mag.log10())
}

pub fn gamma_from_return_loss(return_loss_db: f64) -> Result<f64> {
    if !(return_loss_db > 0.0) {
        return Err(RfError::invalid(format!(
            "return loss must be positive dB (got {return_loss_db})"
        )));
    }
    Ok(10f64.powf(-return_loss_db / 20.0))
}

pub fn vswr_from_return_loss(return_loss_db: f64) -> Result<f64> {
    vswr_from_gamma(gamma_from_return_loss(return_loss_db)?)
}

pub fn return_loss_from_vswr(vswr: f64) -> Result<f64> {
    return_loss_from_gamma(gamma_from_vswr(vswr)?)
}

pub fn mismatch_loss_db(gamma_mag: f64) -> Result<f64> {
    let g = check_gamma(gamma_mag)?;
    Ok(-10.0 * (1.0 - g * g).log10())
}

/// Wrap a phase to [−180, 180).
pub fn normalized_phase(angle_deg: f64) -> f64 {
    let mut a = angle_deg % 360.0;
    if a >= 180.0 {
        a -= 360.0;
    }
    if a < -180.0 {
        a += 360.0;
    }
    a
}

// ── Complex reflection coefficient ────────────────────────────────────────────

/// Describe Γ = magnitude·e^(j·phase). Magnitudes ≥ 1 are accepted and
/// report infinite VSWR and mismatch loss with zero return loss.
pub fn sparameter_from_linear_phase(
    magnitude_linear: f64,
    phase_deg: f64,
) -> Result<SParameterResult> {
    let magnitude_linear = ensure_positive(magnitude_linear, "|S|")?;
    let gamma = Complex64::from_polar(magnitude_linear, phase_deg.to_radians());
    let gamma_mag = gamma.norm();
    let (vswr, return_loss_db, reflection_loss_db) = if gamma_mag < 1.0 {
        (
            vswr_from_gamma(gamma_mag)?,
            return_loss_from_gamma(gamma_mag)?,
            mismatch_loss_db(gamma_mag.min(GAMMA_CEILING))?,
        )
    } else {
        (f64::INFINITY, 0.0, f64::INFINITY)
    };
    Ok(SParameterResult {
        magnitude_linear,
        magnitude_db: magnitude_linear_to_db(magnitude_linear)?,
        phase_deg,
        gamma,
        gamma_mag,
        reflection_loss_db,
        return_loss_db,
        vswr,
        rho: gamma_mag,
    })
}

pub fn sparameter_from_db_phase(magnitude_db: f64, phase_deg: f64) -> Result<SParameterResult> {
    sparameter_from_linear_phase(magnitude_db_to_linear(magnitude_db), phase_deg)
}

/// VSWR must be > 1: a perfect match has no dB magnitude.
pub fn sparameter_from_vswr(vswr: f64, phase_deg: f64) -> Result<SParameterResult> {
    sparameter_from_linear_phase(gamma_from_vswr(vswr)?, phase_deg)
}

// ── Reflection summary ────────────────────────────────────────────────────────

/// One known quantity describing a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReflectionInput {
    Vswr(f64),
    ReturnLoss(f64),
    Gamma(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReflectionSummary {
    pub vswr: f64,
    pub gamma: f64,
    /// Infinite for a perfect match.
    pub return_loss_db: f64,
    pub mismatch_loss_db: f64,
}

/// Derive every reflection quantity from whichever one is known.
pub fn reflection_summary(input: ReflectionInput) -> Result<ReflectionSummary> {
    let (vswr, gamma) = match input {
        ReflectionInput::Vswr(v) => (v, gamma_from_vswr(v)?),
        ReflectionInput::ReturnLoss(rl) => {
            let g = gamma_from_return_loss(rl)?;
            (vswr_from_gamma(g)?, g)
        }
        ReflectionInput::Gamma(g) => (vswr_from_gamma(g)?, g),
    };
    let return_loss_db = match input {
        ReflectionInput::ReturnLoss(rl) => rl,
        _ if gamma > 0.0 => return_loss_from_gamma(gamma)?,
        _ => f64::INFINITY,
    };
    Ok(ReflectionSummary {
        vswr,
        gamma,
        return_loss_db,
        mismatch_loss_db: mismatch_loss_db(gamma.min(GAMMA_CEILING))?,
    })
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn linear_phase_to_db() {
        let r = sparameter_from_linear_phase(0.5, -45.0).unwrap();
        assert_relative_eq!(r.magnitude_db, -6.0206, max_relative = 1e-4);
        assert_relative_eq!(r.vswr, 3.0, max_relative = 1e-6);
        assert_relative_eq!(r.return_loss_db, 6.0206, max_relative = 1e-4);
        assert_relative_eq!(r.reflection_loss_db, 1.2494, max_relative = 1e-4);
        assert_abs_diff_eq!(r.gamma.re, 0.5 * (-45f64).to_radians().cos(), epsilon = 1e-12);
        assert!(r.gamma.im < 0.0);
    }

    #[test]
    fn total_reflection_saturates() {
        let r = sparameter_from_linear_phase(1.0, 0.0).unwrap();
        assert!(r.vswr.is_infinite());
        assert_eq!(r.return_loss_db, 0.0);
        assert!(r.reflection_loss_db.is_infinite());
        assert!(sparameter_from_linear_phase(0.0, 0.0).is_err());
    }

    #[test]
    fn vswr_return_loss_round_trip() {
        let gamma = gamma_from_vswr(1.2).unwrap();
        assert_relative_eq!(gamma, 0.090909, max_relative = 1e-5);
        assert_relative_eq!(return_loss_from_vswr(1.2).unwrap(), 20.8278, max_relative = 1e-4);
        assert_relative_eq!(vswr_from_gamma(gamma).unwrap(), 1.2, max_relative = 1e-6);
        assert_relative_eq!(vswr_from_return_loss(20.8278).unwrap(), 1.2, max_relative = 1e-4);
    }

    #[test]
    fn db_linear_amplitude_and_power() {
        let lin = magnitude_db_to_linear(-3.0);
        assert_relative_eq!(lin, 0.7079457, max_relative = 1e-6);
        assert_relative_eq!(magnitude_linear_to_db(lin).unwrap(), -3.0, max_relative = 1e-9);
        assert_relative_eq!(power_db_to_linear(3.0), 1.99526, max_relative = 1e-5);
        assert_relative_eq!(power_linear_to_db(100.0).unwrap(), 20.0);
        assert!(power_linear_to_db(0.0).is_err());
    }

    #[test]
    fn domain_checks() {
        assert!(gamma_from_vswr(0.9).is_err());
        assert!(vswr_from_gamma(1.0).is_err());
        assert!(vswr_from_gamma(-0.1).is_err());
        assert!(return_loss_from_gamma(0.0).is_err());
        assert!(gamma_from_return_loss(0.0).is_err());
        assert!(mismatch_loss_db(1.0).is_err());
        assert_eq!(vswr_from_gamma(0.0).unwrap(), 1.0);
    }

    #[test]
    fn phase_wraps_to_half_open_interval() {
        assert_eq!(normalized_phase(180.0), -180.0);
        assert_eq!(normalized_phase(-180.0), -180.0);
        assert_eq!(normalized_phase(270.0), -90.0);
        assert_eq!(normalized_phase(-270.0), 90.0);
        assert_eq!(normalized_phase(725.0), 5.0);
    }

    #[test]
    fn summary_from_each_input_kind() {
        let v = reflection_summary(ReflectionInput::Vswr(3.0)).unwrap();
        assert_relative_eq!(v.gamma, 0.5);
        assert_relative_eq!(v.return_loss_db, 6.0206, max_relative = 1e-4);

        let rl = reflection_summary(ReflectionInput::ReturnLoss(6.0206)).unwrap();
        assert_relative_eq!(rl.vswr, 3.0, max_relative = 1e-4);
        assert_eq!(rl.return_loss_db, 6.0206);

        let matched = reflection_summary(ReflectionInput::Gamma(0.0)).unwrap();
        assert_eq!(matched.vswr, 1.0);
        assert!(matched.return_loss_db.is_infinite());
        assert_eq!(matched.mismatch_loss_db, 0.0);

        let unity = reflection_summary(ReflectionInput::Vswr(1.0)).unwrap();
        assert!(unity.return_loss_db.is_infinite());

        assert!(reflection_summary(ReflectionInput::Gamma(1.0)).is_err());
    }
}
