//! Front-to-back ratio over a back-sector window.
use super::{lin_to_att_db, normalized_by_peak};

pub const DEFAULT_BACK_WINDOW_DEG: f64 = 30.0;

/// Front-to-back ratio in dB.
///
/// Takes the highest normalized level within ±`window_deg` of 180° and
/// reports it as attenuation below the forward peak. A dead back sector
/// saturates at 100 dB. NaN when no sample falls inside the window.
pub fn front_to_back_db(angles_deg: &[f64], values: &[f64], window_deg: f64) -> f64 {
    if angles_deg.is_empty() || values.len() != angles_deg.len() {
        return f64::NAN;
    }
    let norm = normalized_by_peak(values);
    let back = angles_deg
        .iter()
        .zip(&norm)
        .filter(|&(&a, _)| {
            let a = (a + 360.0).rem_euclid(360.0);
            a >= 180.0 - window_deg && a <= 180.0 + window_deg
        })
        .map(|(_, &v)| v)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    back.map_or(f64::NAN, lin_to_att_db)
}
