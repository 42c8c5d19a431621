//! Main-lobe ripple and sidelobe level.
//!
//! Both locate the main lobe by walking outward from the peak while the
//! level stays at or above `threshold_db` relative to the peak.
use super::{argmax, lin_to_db, main_lobe_span, normalized_by_peak};

pub const DEFAULT_LOBE_THRESHOLD_DB: f64 = -6.0;

fn db_levels(values: &[f64]) -> Vec<f64> {
    normalized_by_peak(values).into_iter().map(lin_to_db).collect()
}

/// Peak-to-peak variation (dB) inside the main lobe.
pub fn ripple_p2p_db(angles_deg: &[f64], values: &[f64], threshold_db: f64) -> f64 {
    if angles_deg.is_empty() || values.is_empty() {
        return f64::NAN;
    }
    let db = db_levels(values);
    let Some(peak) = argmax(&db) else {
        return f64::NAN;
    };
    let (left, right) = main_lobe_span(&db, peak, threshold_db);
    let sector = &db[left..=right];
    let max = sector.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = sector.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Highest level (dB relative to peak) outside the main lobe. NaN when the
/// main lobe covers the whole series.
pub fn sidelobe_level_db(angles_deg: &[f64], values: &[f64], threshold_db: f64) -> f64 {
    if angles_deg.is_empty() || values.is_empty() {
        return f64::NAN;
    }
    let db = db_levels(values);
    let Some(peak) = argmax(&db) else {
        return f64::NAN;
    };
    let (left, right) = main_lobe_span(&db, peak, threshold_db);
    db[..left]
        .iter()
        .chain(&db[right + 1..])
        .copied()
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(f64::NAN)
}
