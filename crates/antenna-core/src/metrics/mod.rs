//! Figures of merit for any angle/amplitude series.
//!
//! Every metric normalizes the series by its own peak first. Values that
//! cannot be computed for a geometry come back as NaN, never as an error.
pub mod beamwidth;
pub mod directivity;
pub mod front_to_back;
pub mod lobes;
pub mod summary;

use crate::units::EPSILON;

pub use beamwidth::{first_null_deg, hpbw_deg, peak_angle_deg};
pub use directivity::{directivity_2d_cut, estimate_gain_dbi};
pub use front_to_back::{front_to_back_db, DEFAULT_BACK_WINDOW_DEG};
pub use lobes::{ripple_p2p_db, sidelobe_level_db, DEFAULT_LOBE_THRESHOLD_DB};
pub use summary::{PatternMetrics, ProjectMetrics};

/// Index of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Divide by the maximum when it is positive; otherwise return a copy.
pub(crate) fn normalized_by_peak(values: &[f64]) -> Vec<f64> {
    let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak > 0.0 {
        values.iter().map(|v| v / peak).collect()
    } else {
        values.to_vec()
    }
}

/// Amplitude ratio to dB, floored at EPSILON.
#[inline]
pub fn lin_to_db(value: f64) -> f64 {
    20.0 * value.max(EPSILON).log10()
}

/// Amplitude ratio to a positive attenuation in dB. Non-positive input
/// saturates at 100 dB; values above unity give 0 dB.
#[inline]
pub fn lin_to_att_db(value: f64) -> f64 {
    if value <= 0.0 {
        return 100.0;
    }
    let att = -20.0 * value.log10();
    // Unity gives -0.0; keep it out of formatted output.
    if att > 0.0 {
        att
    } else {
        0.0
    }
}

/// Main-lobe span `[left, right]` around `peak`: the widest run of samples
/// whose dB level stays ≥ `threshold_db`.
pub(crate) fn main_lobe_span(db_vals: &[f64], peak: usize, threshold_db: f64) -> (usize, usize) {
    let mut left = peak;
    while left > 0 && db_vals[left - 1] >= threshold_db {
        left -= 1;
    }
    let mut right = peak;
    while right + 1 < db_vals.len() && db_vals[right + 1] >= threshold_db {
        right += 1;
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_conversion_saturates() {
        assert_eq!(lin_to_att_db(0.0), 100.0);
        assert_eq!(lin_to_att_db(-1.0), 100.0);
        assert_eq!(lin_to_att_db(2.0), 0.0);
        assert!((lin_to_att_db(0.5) - 6.0206).abs() < 1e-4);
    }

    #[test]
    fn argmax_first_of_equal_peaks() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn lobe_span_walks_outward() {
        let db = [-20.0, -5.0, -1.0, 0.0, -3.0, -7.0, -2.0];
        assert_eq!(main_lobe_span(&db, 3, -6.0), (1, 4));
    }
}
