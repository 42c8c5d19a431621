//! Half-power beamwidth, first null and peak direction.
use super::{argmax, normalized_by_peak};
use crate::units::EPSILON;

/// Linear interpolation of the angle where the level crosses `level`
/// between samples `(v0, a0)` and `(v1, a1)`.
fn crossing(level: f64, v0: f64, a0: f64, v1: f64, a1: f64) -> f64 {
    let (lo_v, lo_a, hi_v, hi_a) = if v0 <= v1 { (v0, a0, v1, a1) } else { (v1, a1, v0, a0) };
    if (hi_v - lo_v).abs() < f64::EPSILON {
        return lo_a;
    }
    lo_a + (level - lo_v) / (hi_v - lo_v) * (hi_a - lo_a)
}

/// Half-power (−3 dB) beamwidth in degrees.
///
/// Walks outward from the peak on both sides until the normalized amplitude
/// drops below 1/√2, interpolating the exact crossing. NaN with fewer than
/// three samples or when either side never crosses.
pub fn hpbw_deg(angles_deg: &[f64], values: &[f64]) -> f64 {
    if angles_deg.len() < 3 || values.len() != angles_deg.len() {
        return f64::NAN;
    }
    let norm = normalized_by_peak(values);
    let threshold = 0.5f64.sqrt();
    let Some(peak) = argmax(&norm) else {
        return f64::NAN;
    };

    let left = (1..=peak)
        .rev()
        .find(|&i| norm[i] >= threshold && norm[i - 1] < threshold)
        .map(|i| crossing(threshold, norm[i - 1], angles_deg[i - 1], norm[i], angles_deg[i]));
    let right = (peak..norm.len() - 1)
        .find(|&i| norm[i] >= threshold && norm[i + 1] < threshold)
        .map(|i| crossing(threshold, norm[i], angles_deg[i], norm[i + 1], angles_deg[i + 1]));

    match (left, right) {
        (Some(l), Some(r)) => r - l,
        _ => f64::NAN,
    }
}

/// First angle past the peak where the amplitude falls to ≤ 5 % of peak.
pub fn first_null_deg(angles_deg: &[f64], values: &[f64]) -> f64 {
    if angles_deg.len() < 3 || values.len() != angles_deg.len() {
        return f64::NAN;
    }
    let Some(peak) = argmax(values) else {
        return f64::NAN;
    };
    let max = values[peak];
    if max <= EPSILON {
        return f64::NAN;
    }
    let threshold = 0.05 * max;
    values[peak + 1..]
        .iter()
        .position(|&v| v <= threshold)
        .map_or(f64::NAN, |off| angles_deg[peak + 1 + off])
}

/// Angle of the (first) maximum.
pub fn peak_angle_deg(angles_deg: &[f64], values: &[f64]) -> f64 {
    argmax(values)
        .and_then(|i| angles_deg.get(i).copied())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn hpbw_of_raised_cosine_lobe_matches_analytic_value() {
        // a(θ) = cos²(θ/2): half power where cos²(θ/2) = 1/√2.
        let angles: Vec<f64> = (-1800..=1800).map(|t| t as f64 / 10.0).collect();
        let values: Vec<f64> = angles
            .iter()
            .map(|a| (a.to_radians() / 2.0).cos().powi(2))
            .collect();
        let half = 2.0 * (0.5f64.sqrt().sqrt()).acos().to_degrees();
        let expected = 2.0 * half;
        assert_abs_diff_eq!(hpbw_deg(&angles, &values), expected, epsilon = 1e-3);
    }

    #[test]
    fn hpbw_is_scale_invariant_and_nan_without_crossing() {
        let angles = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let lobe = [0.1, 0.8, 1.0, 0.8, 0.1];
        let scaled: Vec<f64> = lobe.iter().map(|v| v * 7.0).collect();
        assert_abs_diff_eq!(hpbw_deg(&angles, &lobe), hpbw_deg(&angles, &scaled), epsilon = 1e-12);
        assert!(hpbw_deg(&angles, &[1.0; 5]).is_nan());
        assert!(hpbw_deg(&angles[..2], &lobe[..2]).is_nan());
    }

    #[test]
    fn first_null_after_peak() {
        let angles = [0.0, 10.0, 20.0, 30.0, 40.0];
        let values = [1.0, 0.5, 0.04, 0.2, 0.0];
        assert_eq!(first_null_deg(&angles, &values), 20.0);
        assert!(first_null_deg(&angles, &[1.0, 0.9, 0.8, 0.7, 0.6]).is_nan());
        assert!(first_null_deg(&angles, &[0.0; 5]).is_nan());
    }

    #[test]
    fn peak_angle() {
        assert_eq!(peak_angle_deg(&[-10.0, 0.0, 10.0], &[0.2, 0.1, 0.9]), 10.0);
        assert!(peak_angle_deg(&[], &[]).is_nan());
    }
}
