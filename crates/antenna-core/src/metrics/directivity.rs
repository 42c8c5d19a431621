//! Directivity approximations.
use super::argmax;
use crate::units::EPSILON;

/// Full-sphere solid angle in square degrees, rounded as used by the
/// beamwidth-product gain rule of thumb.
const SQ_DEG_SPHERE: f64 = 41_253.0;

/// 2-D cut directivity: the angular span divided by the trapezoidal
/// integral of normalized power over that span (both in radians).
///
/// This is the directivity of the cut alone, not a 3-D directivity.
pub fn directivity_2d_cut(angles_deg: &[f64], values: &[f64]) -> f64 {
    if angles_deg.len() < 2 || values.len() != angles_deg.len() {
        return f64::NAN;
    }
    let Some(peak) = argmax(values).map(|i| values[i]) else {
        return f64::NAN;
    };
    if peak <= EPSILON {
        return f64::NAN;
    }
    let power: Vec<f64> = values.iter().map(|v| (v / peak).powi(2)).collect();
    let rad: Vec<f64> = angles_deg.iter().map(|a| a.to_radians()).collect();
    let integral: f64 = rad
        .windows(2)
        .zip(power.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum();
    let span = rad[rad.len() - 1] - rad[0];
    if integral <= EPSILON || span <= EPSILON {
        return f64::NAN;
    }
    span / integral
}

/// Gain estimate (dBi) from the horizontal and vertical half-power
/// beamwidths: `10·log10(41253 / (θ_h · θ_v))`.
pub fn estimate_gain_dbi(h_hpbw_deg: f64, v_hpbw_deg: f64) -> f64 {
    if !(h_hpbw_deg.is_finite() && v_hpbw_deg.is_finite() && h_hpbw_deg > 0.0 && v_hpbw_deg > 0.0) {
        return f64::NAN;
    }
    10.0 * (SQ_DEG_SPHERE / (h_hpbw_deg * v_hpbw_deg)).log10()
}
