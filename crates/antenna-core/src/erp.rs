//! Effective radiated power per azimuth.
//!
//! The vertical pattern is coupled into the horizontal sweep through its
//! value at the horizon (the sample nearest 0° elevation):
//!
//!   a(φ)      = h(φ) · v(0°)
//!   att(φ)    = 20·log10(a(φ))
//!   gain(φ)   = G_nominal − att(φ)          (dBd)
//!   ERP_dBW   = 10·log10(P_tx) − L_feeder + gain(φ)
//!   ERP_W     = 10^(ERP_dBW / 10)

use serde::{Deserialize, Serialize};

use crate::config::ProjectConfig;
use crate::error::{Result, RfError};
use crate::pattern::{CompositePattern, PatternKind};
use crate::units::EPSILON;

/// Per-azimuth ERP plus the intermediate columns. Plain data: callers may
/// cache it keyed on [`ProjectConfig::fingerprint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpTable {
    pub angles_deg: Vec<f64>,
    pub hrp_linear: Vec<f64>,
    pub vrp_angles_deg: Vec<f64>,
    pub vrp_linear: Vec<f64>,
    pub attenuation_db: Vec<f64>,
    pub gain_dbd: Vec<f64>,
    pub erp_dbw: Vec<f64>,
    pub erp_w: Vec<f64>,
    /// Vertical amplitude at the horizon, clamped to ≥ EPSILON.
    pub vertical_scalar: f64,
}

impl ErpTable {
    /// Largest ERP in dBW and the azimuth where it occurs.
    pub fn peak_dbw(&self) -> Option<(f64, f64)> {
        self.erp_dbw
            .iter()
            .zip(&self.angles_deg)
            .fold(None, |best: Option<(f64, f64)>, (&e, &a)| match best {
                Some((be, _)) if be >= e => best,
                _ => Some((e, a)),
            })
    }

    pub fn peak_w(&self) -> Option<f64> {
        self.peak_dbw().map(|(dbw, _)| 10f64.powf(dbw / 10.0))
    }
}

/// Combine composite patterns, nominal gain, transmit power and feeder loss
/// into an [`ErpTable`].
pub fn compute_erp(
    config: &ProjectConfig,
    h: &CompositePattern,
    v: &CompositePattern,
) -> Result<ErpTable> {
    if h.kind != PatternKind::Horizontal || v.kind != PatternKind::Vertical {
        return Err(RfError::invalid("ERP needs a horizontal and a vertical composite pattern"));
    }
    let horizon = v
        .nearest_index(0.0)
        .ok_or_else(|| RfError::invalid("vertical pattern is empty"))?;
    let vertical_scalar = v.amplitude_linear[horizon].max(EPSILON);

    let power_dbw = 10.0 * config.tx_power_w.max(EPSILON).log10();
    let feeder_loss_db = config.feeder_loss_db;
    let nominal = config.nominal_element_gain_dbd;

    let n = h.len();
    let mut attenuation_db = Vec::with_capacity(n);
    let mut gain_dbd = Vec::with_capacity(n);
    let mut erp_dbw = Vec::with_capacity(n);
    let mut erp_w = Vec::with_capacity(n);
    for &amp in &h.amplitude_linear {
        let linear = (amp * vertical_scalar).max(EPSILON);
        let att = 20.0 * linear.log10();
        let gain = nominal - att;
        let dbw = power_dbw - feeder_loss_db + gain;
        attenuation_db.push(att);
        gain_dbd.push(gain);
        erp_dbw.push(dbw);
        erp_w.push(10f64.powf(dbw / 10.0));
    }

    Ok(ErpTable {
        angles_deg: h.angles_deg.clone(),
        hrp_linear: h.amplitude_linear.clone(),
        vrp_angles_deg: v.angles_deg.clone(),
        vrp_linear: v.amplitude_linear.clone(),
        attenuation_db,
        gain_dbd,
        erp_dbw,
        erp_w,
        vertical_scalar,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn flat(kind: PatternKind, angles: Vec<f64>, value: f64) -> CompositePattern {
        let n = angles.len();
        CompositePattern::new(kind, angles, vec![value; n])
    }

    #[test]
    fn omni_pattern_erp_is_power_minus_loss_plus_gain() {
        let cfg = ProjectConfig {
            tx_power_w: 1000.0,
            feeder_loss_db: 2.0,
            nominal_element_gain_dbd: 6.0,
            ..Default::default()
        };
        let h = flat(PatternKind::Horizontal, vec![-180.0, 0.0, 180.0], 1.0);
        let v = flat(PatternKind::Vertical, vec![-1.0, 0.0, 1.0], 1.0);
        let t = compute_erp(&cfg, &h, &v).unwrap();
        for (&dbw, &w) in t.erp_dbw.iter().zip(&t.erp_w) {
            assert_abs_diff_eq!(dbw, 34.0, epsilon = 1e-9);
            assert_abs_diff_eq!(w, 10f64.powf(3.4), epsilon = 1e-6);
        }
    }

    #[test]
    fn attenuation_is_subtracted_from_nominal_gain() {
        let cfg = ProjectConfig { tx_power_w: 100.0, ..Default::default() };
        let h = CompositePattern::new(PatternKind::Horizontal, vec![0.0, 90.0], vec![1.0, 0.5]);
        let v = flat(PatternKind::Vertical, vec![0.0], 1.0);
        let t = compute_erp(&cfg, &h, &v).unwrap();
        assert_abs_diff_eq!(t.attenuation_db[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.attenuation_db[1], -6.0206, epsilon = 1e-4);
        assert_abs_diff_eq!(t.gain_dbd[1], 6.0206, epsilon = 1e-4);
        assert_abs_diff_eq!(t.erp_dbw[0], 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(t.erp_dbw[1], 26.0206, epsilon = 1e-4);
        assert_eq!(t.peak_dbw().unwrap().1, 90.0);
    }

    #[test]
    fn horizon_sample_scales_and_is_clamped() {
        let cfg = ProjectConfig::default();
        let h = flat(PatternKind::Horizontal, vec![0.0], 1.0);
        let v = CompositePattern::new(
            PatternKind::Vertical,
            vec![-0.1, 0.1, 5.0],
            vec![0.5, 0.9, 1.0],
        );
        let t = compute_erp(&cfg, &h, &v).unwrap();
        // −0.1 and 0.1 tie; the first one wins.
        assert_abs_diff_eq!(t.vertical_scalar, 0.5);

        let dead = flat(PatternKind::Vertical, vec![0.0], 0.0);
        let t = compute_erp(&cfg, &h, &dead).unwrap();
        assert_eq!(t.vertical_scalar, EPSILON);
        assert!(t.erp_dbw[0].is_finite());
    }
}
