//! Coaxial feeder loss.
//!
//! Attenuation curves are sparse (frequency, dB/100 m) tables. Between two
//! points the attenuation is interpolated on a log-log scale,
//!
//!   A(f) = A0 · (f / f0)^(ln(A1/A0) / ln(f1/f0))
//!
//! and the outermost pair is extended the same way beyond either end. When no
//! curve is available a fixed per-type table scaled by √(f / 100 MHz) is used.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::units::{ensure_positive, to_hz, FrequencyUnit, C};

// ── Curve ─────────────────────────────────────────────────────────────────────

/// Curve as written in project files: points in `unit`, MHz by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCableCurve {
    #[serde(default = "default_unit")]
    unit: FrequencyUnit,
    points: Vec<(f64, f64)>,
}

fn default_unit() -> FrequencyUnit {
    FrequencyUnit::MHz
}

/// Attenuation curve with strictly increasing frequencies in Hz and positive
/// attenuation in dB/100 m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCableCurve", into = "RawCableCurve")]
pub struct CableCurve {
    points: Vec<(f64, f64)>,
}

impl TryFrom<RawCableCurve> for CableCurve {
    type Error = RfError;

    fn try_from(raw: RawCableCurve) -> Result<Self> {
        CableCurve::from_points(raw.points, raw.unit)
    }
}

impl From<CableCurve> for RawCableCurve {
    fn from(curve: CableCurve) -> Self {
        RawCableCurve { unit: FrequencyUnit::Hz, points: curve.points }
    }
}

impl CableCurve {
    /// Build a curve from `(frequency, dB/100 m)` pairs with frequencies in
    /// `unit`. Non-positive or non-finite pairs are dropped; two points at
    /// the same frequency are rejected.
    pub fn from_points(
        points: impl IntoIterator<Item = (f64, f64)>,
        unit: FrequencyUnit,
    ) -> Result<Self> {
        let mut out: Vec<(f64, f64)> = Vec::new();
        for (f, att) in points {
            if !(f.is_finite() && att.is_finite() && f > 0.0 && att > 0.0) {
                warn!("dropping cable curve point ({f}, {att}): values must be positive");
                continue;
            }
            out.push((to_hz(f, unit), att));
        }
        out.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = out.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(RfError::invalid(format!(
                "cable curve has two points at {} Hz",
                w[0].0
            )));
        }
        Ok(Self { points: out })
    }

    /// Points in Hz, ascending.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ── Interpolation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationOrigin {
    /// One-point curve, value returned as is.
    SinglePoint,
    Interpolation,
    Extrapolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableInterpolation {
    pub frequency_hz: f64,
    pub attenuation_db_per_100m: f64,
    pub origin: InterpolationOrigin,
    pub extrapolated: bool,
    /// Curve points the value was derived from.
    pub support: Vec<(f64, f64)>,
}

/// Attenuation of `curve` at `frequency_hz`, or `None` for an empty curve.
pub fn interpolate(curve: &CableCurve, frequency_hz: f64) -> Result<Option<CableInterpolation>> {
    let f = ensure_positive(frequency_hz, "frequency")?;
    let pts = curve.points();
    let (p0, p1, extrapolated) = match pts {
        [] => return Ok(None),
        [only] => {
            return Ok(Some(CableInterpolation {
                frequency_hz: f,
                attenuation_db_per_100m: only.1,
                origin: InterpolationOrigin::SinglePoint,
                extrapolated: false,
                support: vec![*only],
            }))
        }
        [first, second, ..] if f < first.0 => (*first, *second, true),
        [.., before_last, last] if f > last.0 => (*before_last, *last, true),
        _ => {
            let i = pts.windows(2).position(|w| w[0].0 <= f && f <= w[1].0).unwrap_or(0);
            (pts[i], pts[i + 1], false)
        }
    };

    let (lf0, lf1) = (p0.0.ln(), p1.0.ln());
    let (la0, la1) = (p0.1.ln(), p1.1.ln());
    let slope = (la1 - la0) / (lf1 - lf0);
    let attenuation = (la0 + slope * (f.ln() - lf0)).exp();

    Ok(Some(CableInterpolation {
        frequency_hz: f,
        attenuation_db_per_100m: attenuation,
        origin: if extrapolated {
            InterpolationOrigin::Extrapolation
        } else {
            InterpolationOrigin::Interpolation
        },
        extrapolated,
        support: vec![p0, p1],
    }))
}

// ── Total loss ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableLossBreakdown {
    pub frequency_hz: f64,
    pub length_m: f64,
    pub cable_loss_db: f64,
    pub connector_loss_db: f64,
    pub total_loss_db: f64,
    pub interpolation: CableInterpolation,
    pub velocity_factor: Option<f64>,
    pub propagation_velocity_m_s: Option<f64>,
}

/// Loss of `length_m` of cable plus connectors. Only positive connector
/// entries count.
pub fn cable_total_loss(
    curve: &CableCurve,
    frequency_hz: f64,
    length_m: f64,
    connectors_db: &[f64],
    velocity_factor: Option<f64>,
) -> Result<CableLossBreakdown> {
    let length = ensure_positive(length_m, "length")?;
    let interpolation = interpolate(curve, frequency_hz)?
        .ok_or_else(|| RfError::invalid("cable has no attenuation curve"))?;
    let cable_loss_db = length / 100.0 * interpolation.attenuation_db_per_100m;
    let connector_loss_db: f64 = connectors_db.iter().filter(|&&x| x > 0.0).sum();
    let velocity_factor = velocity_factor.filter(|&vf| vf > 0.0);
    if interpolation.extrapolated {
        debug!(
            "cable attenuation at {:.3} MHz extrapolated from the curve",
            interpolation.frequency_hz / 1e6
        );
    }

    Ok(CableLossBreakdown {
        frequency_hz: interpolation.frequency_hz,
        length_m: length,
        cable_loss_db,
        connector_loss_db,
        total_loss_db: cable_loss_db + connector_loss_db,
        interpolation,
        velocity_factor,
        propagation_velocity_m_s: velocity_factor.map(|vf| vf * C),
    })
}

// ── Legacy table ──────────────────────────────────────────────────────────────

/// Fixed attenuation at 100 MHz, dB/100 m, keyed by uppercase cable type.
pub const LEGACY_DB_PER_100M: &[(&str, f64)] = &[
    ("EFTX-RF240", 6.1),
    ("EFTX-RF400", 3.8),
    ("EFTX-RF600", 2.5),
    ("COAX-1/2", 1.8),
    ("COAX-7/8", 1.2),
];

/// Attenuation for cable types missing from [`LEGACY_DB_PER_100M`].
pub const LEGACY_DEFAULT_DB_PER_100M: f64 = 5.0;

pub fn legacy_db_per_100m(cable_type: Option<&str>) -> f64 {
    let key = cable_type.unwrap_or_default().to_uppercase();
    LEGACY_DB_PER_100M
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(LEGACY_DEFAULT_DB_PER_100M, |&(_, db)| db)
}

/// Table loss of `length_m` at `freq_mhz`. Zero length or frequency gives 0.
pub fn legacy_cable_loss(length_m: f64, freq_mhz: f64, cable_type: Option<&str>) -> f64 {
    if length_m == 0.0 || freq_mhz == 0.0 {
        return 0.0;
    }
    let scaling = (freq_mhz.max(1.0) / 100.0).sqrt();
    length_m / 100.0 * legacy_db_per_100m(cable_type) * scaling
}

// ── Feeder ────────────────────────────────────────────────────────────────────

/// Everything between transmitter and antenna.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederSpec {
    pub length_m: f64,
    /// Measured curve; preferred over `cable_type` when present.
    pub cable: Option<CableCurve>,
    pub cable_type: Option<String>,
    pub velocity_factor: Option<f64>,
    pub splitter_loss_db: f64,
    pub connector_loss_db: f64,
}

/// Total feeder loss in dB at `freq_mhz`: cable plus splitter and connector
/// losses.
pub fn feeder_loss_db(spec: &FeederSpec, freq_mhz: f64) -> Result<f64> {
    let cable_db = match &spec.cable {
        Some(curve) if !curve.is_empty() && spec.length_m > 0.0 && freq_mhz > 0.0 => {
            let f_hz = freq_mhz * 1e6;
            cable_total_loss(curve, f_hz, spec.length_m, &[], spec.velocity_factor)?.cable_loss_db
        }
        _ => legacy_cable_loss(spec.length_m, freq_mhz, spec.cable_type.as_deref()),
    };
    Ok(cable_db + spec.splitter_loss_db + spec.connector_loss_db)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn sample_curve() -> CableCurve {
        CableCurve::from_points([(300.0, 6.5), (100.0, 4.1), (600.0, 9.8)], FrequencyUnit::MHz)
            .unwrap()
    }

    #[test]
    fn interpolated_total_loss() {
        let r = cable_total_loss(&sample_curve(), 200e6, 50.0, &[0.2, 0.15], None).unwrap();
        assert_relative_eq!(r.cable_loss_db, 2.7417, max_relative = 1e-3);
        assert_relative_eq!(r.total_loss_db, 3.0917, max_relative = 1e-3);
        assert!(!r.interpolation.extrapolated);
        assert_eq!(r.interpolation.origin, InterpolationOrigin::Interpolation);
        assert_eq!(r.interpolation.support, vec![(100e6, 4.1), (300e6, 6.5)]);
        assert!(r.propagation_velocity_m_s.is_none());
    }

    #[test]
    fn outside_the_curve_is_extrapolated() {
        let low = interpolate(&sample_curve(), 50e6).unwrap().unwrap();
        assert!(low.extrapolated);
        assert!(low.attenuation_db_per_100m < 4.1);
        let high = interpolate(&sample_curve(), 1e9).unwrap().unwrap();
        assert_eq!(high.origin, InterpolationOrigin::Extrapolation);
        assert_eq!(high.support, vec![(300e6, 6.5), (600e6, 9.8)]);
        let on_point = interpolate(&sample_curve(), 300e6).unwrap().unwrap();
        assert!(!on_point.extrapolated);
        assert_relative_eq!(on_point.attenuation_db_per_100m, 6.5, max_relative = 1e-12);
    }

    #[test]
    fn single_point_curve_is_returned_verbatim() {
        let curve = CableCurve::from_points([(1.0, 12.0)], FrequencyUnit::GHz).unwrap();
        let r = interpolate(&curve, 5e9).unwrap().unwrap();
        assert_eq!(r.attenuation_db_per_100m, 12.0);
        assert_eq!(r.origin, InterpolationOrigin::SinglePoint);
        assert!(!r.extrapolated);
    }

    #[test]
    fn curve_construction_rules() {
        let points = [(100.0, 4.0), (-5.0, 1.0), (200.0, 0.0)];
        let curve = CableCurve::from_points(points, FrequencyUnit::MHz).unwrap();
        assert_eq!(curve.points(), &[(100e6, 4.0)]);
        let dup = CableCurve::from_points([(100.0, 4.0), (100.0, 5.0)], FrequencyUnit::MHz);
        assert!(matches!(dup, Err(RfError::InvalidInput(_))));
    }

    #[test]
    fn empty_curve_is_rejected_for_total_loss() {
        let empty = CableCurve::from_points(Vec::new(), FrequencyUnit::MHz).unwrap();
        assert!(interpolate(&empty, 1e8).unwrap().is_none());
        assert!(cable_total_loss(&empty, 1e8, 10.0, &[], None).is_err());
    }

    #[test]
    fn velocity_factor_sets_propagation_velocity() {
        let r = cable_total_loss(&sample_curve(), 100e6, 10.0, &[-1.0], Some(0.88)).unwrap();
        assert_eq!(r.connector_loss_db, 0.0);
        assert_relative_eq!(r.propagation_velocity_m_s.unwrap(), 0.88 * C);
    }

    #[test]
    fn legacy_table() {
        assert_relative_eq!(legacy_cable_loss(100.0, 100.0, Some("coax-7/8")), 1.2);
        assert_relative_eq!(legacy_cable_loss(50.0, 400.0, Some("EFTX-RF400")), 3.8);
        assert_relative_eq!(legacy_cable_loss(100.0, 100.0, None), 5.0);
        assert_eq!(legacy_cable_loss(0.0, 100.0, Some("COAX-1/2")), 0.0);
    }

    #[test]
    fn feeder_prefers_curve_and_falls_back_to_table() {
        let mut spec = FeederSpec {
            length_m: 50.0,
            cable: Some(sample_curve()),
            cable_type: Some("COAX-1/2".into()),
            splitter_loss_db: 0.5,
            connector_loss_db: 0.25,
            ..Default::default()
        };
        let with_curve = feeder_loss_db(&spec, 200.0).unwrap();
        assert_relative_eq!(with_curve, 2.7417 + 0.75, max_relative = 1e-3);
        spec.cable = None;
        let from_table = feeder_loss_db(&spec, 100.0).unwrap();
        assert_relative_eq!(from_table, 0.9 + 0.75, max_relative = 1e-12);
    }

    #[test]
    fn curve_json_defaults_to_mhz() {
        let curve: CableCurve =
            serde_json::from_str(r#"{"points": [[100, 4.1], [300, 6.5]]}"#).unwrap();
        assert_eq!(curve.points()[1], (300e6, 6.5));
        let bad = serde_json::from_str::<CableCurve>(r#"{"points": [[100, 4.1], [100, 6.5]]}"#);
        assert!(bad.is_err());
    }
}
