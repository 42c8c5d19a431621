//! Metrics records handed to report and export collaborators.
use serde::{Deserialize, Serialize};

use super::{
    directivity_2d_cut, estimate_gain_dbi, first_null_deg, front_to_back_db, hpbw_deg, lin_to_db,
    peak_angle_deg, ripple_p2p_db, sidelobe_level_db, DEFAULT_BACK_WINDOW_DEG,
    DEFAULT_LOBE_THRESHOLD_DB,
};
use crate::composer::ProjectComposition;
use crate::pattern::{CompositePattern, PatternKind};

/// Figures of merit for one pattern cut. Each field is NaN when not
/// computable for the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMetrics {
    pub peak_angle_deg: f64,
    pub peak_linear: f64,
    pub peak_db: f64,
    pub hpbw_deg: f64,
    pub first_null_deg: f64,
    pub sidelobe_level_db: f64,
    pub ripple_db: f64,
    /// Linear 2-D cut directivity.
    pub directivity: f64,
    /// Only computed for horizontal cuts.
    pub front_to_back_db: f64,
}

impl PatternMetrics {
    pub fn compute(pattern: &CompositePattern) -> Self {
        let a = &pattern.angles_deg;
        let v = &pattern.amplitude_linear;
        let peak_linear = v.iter().copied().fold(f64::NAN, f64::max);
        let peak_db = if peak_linear.is_finite() && peak_linear > 0.0 {
            lin_to_db(peak_linear)
        } else {
            f64::NAN
        };
        let front_to_back_db = match pattern.kind {
            PatternKind::Horizontal => front_to_back_db(a, v, DEFAULT_BACK_WINDOW_DEG),
            PatternKind::Vertical => f64::NAN,
        };
        Self {
            peak_angle_deg: peak_angle_deg(a, v),
            peak_linear,
            peak_db,
            hpbw_deg: hpbw_deg(a, v),
            first_null_deg: first_null_deg(a, v),
            sidelobe_level_db: sidelobe_level_db(a, v, DEFAULT_LOBE_THRESHOLD_DB),
            ripple_db: ripple_p2p_db(a, v, DEFAULT_LOBE_THRESHOLD_DB),
            directivity: directivity_2d_cut(a, v),
            front_to_back_db,
        }
    }

    /// Human-readable lines, `N/A` for anything not computable.
    pub fn summary_lines(&self, gain_dbi: Option<f64>) -> Vec<String> {
        let mut lines = vec![
            format!("Peak: {} @ {}", fmt(self.peak_db, " dB"), fmt(self.peak_angle_deg, " deg")),
            format!("HPBW: {}", fmt(self.hpbw_deg, " deg")),
            format!("Ripple: {}", fmt(self.ripple_db, " dB")),
            format!("SLL: {}", fmt(self.sidelobe_level_db, " dB")),
            format!("First null: {}", fmt(self.first_null_deg, " deg")),
        ];
        if self.directivity.is_finite() && self.directivity > 0.0 {
            lines.push(format!("2-D directivity: {:.2} dB", 10.0 * self.directivity.log10()));
        } else {
            lines.push("2-D directivity: N/A".to_string());
        }
        if !self.front_to_back_db.is_nan() {
            lines.push(format!("Front/back: {}", fmt(self.front_to_back_db, " dB")));
        }
        if let Some(g) = gain_dbi.filter(|g| g.is_finite()) {
            lines.push(format!("Estimated gain: {g:.2} dBi ({:.1}x)", 10f64.powf(g / 10.0)));
        }
        lines
    }
}

fn fmt(value: f64, suffix: &str) -> String {
    if value.is_finite() {
        format!("{value:.2}{suffix}")
    } else {
        format!("N/A{suffix}")
    }
}

/// Metrics for both cuts of a composed project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    pub horizontal: PatternMetrics,
    pub vertical: PatternMetrics,
    /// HPBW-product gain estimate, dBi.
    pub estimated_gain_dbi: f64,
    /// Vertical E/Emax at the horizon.
    pub horizon_level: f64,
}

impl ProjectMetrics {
    pub fn compute(composition: &ProjectComposition) -> Self {
        let horizontal = PatternMetrics::compute(&composition.horizontal.pattern);
        let vertical = PatternMetrics::compute(&composition.vertical.pattern);
        let v = &composition.vertical.pattern;
        let horizon_level = v
            .nearest_index(0.0)
            .map_or(f64::NAN, |i| v.amplitude_linear[i]);
        Self {
            horizontal,
            vertical,
            estimated_gain_dbi: estimate_gain_dbi(horizontal.hpbw_deg, vertical.hpbw_deg),
            horizon_level,
        }
    }
}
