//! Magnitude normalization for composite patterns.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::units::EPSILON;

/// Policy for scaling a composite magnitude array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Divide by the maximum.
    #[default]
    #[serde(alias = "max")]
    #[strum(to_string = "peak", serialize = "max")]
    Peak,
    /// Divide by the first element.
    First,
    /// Divide by the total.
    Sum,
}

/// Normalize `values` by the divisor selected by `mode`.
///
/// When the divisor is below [`EPSILON`] in magnitude the input is returned
/// unchanged, so an all-zero array never turns into NaN or ∞.
pub fn normalize(values: &[f64], mode: NormalizationMode) -> Vec<f64> {
    let divisor = match mode {
        NormalizationMode::Peak => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        NormalizationMode::First => values.first().copied().unwrap_or(0.0),
        NormalizationMode::Sum => values.iter().sum(),
    };
    if !divisor.is_finite() || divisor.abs() < EPSILON {
        return values.to_vec();
    }
    values.iter().map(|v| v / divisor).collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn peak_normalizes_max_to_one() {
        let out = normalize(&[0.5, 2.0, 1.0], NormalizationMode::Peak);
        let max = out.iter().copied().fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(max, 1.0);
        assert_abs_diff_eq!(out[0], 0.25);
    }

    #[test]
    fn first_and_sum_modes() {
        let first = normalize(&[2.0, 4.0, 1.0], NormalizationMode::First);
        assert_eq!(first, vec![1.0, 2.0, 0.5]);
        let sum = normalize(&[1.0, 1.0, 2.0], NormalizationMode::Sum);
        assert_eq!(sum, vec![0.25, 0.25, 0.5]);
    }

    #[test]
    fn degenerate_divisors_leave_input_unchanged() {
        let zeros = vec![0.0; 5];
        for mode in [NormalizationMode::Peak, NormalizationMode::First, NormalizationMode::Sum] {
            assert_eq!(normalize(&zeros, mode), zeros);
        }
        assert_eq!(normalize(&[0.0, 3.0], NormalizationMode::First), vec![0.0, 3.0]);
        assert!(normalize(&[], NormalizationMode::Peak).is_empty());
    }

    #[test]
    fn max_is_accepted_as_peak() {
        assert_eq!("max".parse::<NormalizationMode>().unwrap(), NormalizationMode::Peak);
        let m: NormalizationMode = serde_json::from_str("\"max\"").unwrap();
        assert_eq!(m, NormalizationMode::Peak);
    }
}
