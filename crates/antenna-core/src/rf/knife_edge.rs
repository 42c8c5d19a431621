//! Single knife-edge diffraction (ITU-R P.526).
//!
//!   v    = h · √(2/λ · (d1 + d2)/(d1·d2))
//!   J(v) = 6.9 + 20·log10(√((v − 0.1)² + 1) + v − 0.1)     v > −0.7
//!   rₙ   = √(n·λ·d1·d2 / (d1 + d2))
//!
//! `h` is the obstacle height above the straight tx→rx line; positive means
//! the path is blocked.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::units::{ensure_positive, wavelength_m};

const V_NO_LOSS: f64 = -0.7;
const PLOT_V_START: f64 = -3.0;
const PLOT_V_STEP: f64 = 0.25;
const PLOT_POINTS: usize = 37;

/// Qualitative reading of clearance / first-Fresnel-radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceGuidance {
    /// ratio ≥ 1
    FullyObstructed,
    /// 0.6 ≤ ratio < 1
    MajorIntrusion,
    /// 0 ≤ ratio < 0.6
    ModerateIntrusion,
    /// ratio < 0
    Clear,
}

impl ClearanceGuidance {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            Self::FullyObstructed
        } else if ratio >= 0.6 {
            Self::MajorIntrusion
        } else if ratio >= 0.0 {
            Self::ModerateIntrusion
        } else {
            Self::Clear
        }
    }
}

impl fmt::Display for ClearanceGuidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FullyObstructed => "First Fresnel zone fully obstructed; expect high losses.",
            Self::MajorIntrusion => {
                "Obstacle intrudes into a large part of the first Fresnel zone; \
                 adjust heights or distances."
            }
            Self::ModerateIntrusion => {
                "Obstacle crosses the line of sight with moderate first-zone intrusion."
            }
            Self::Clear => "Obstacle below the line of sight; clearance margin available.",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnifeEdgeResult {
    pub v: f64,
    pub loss_db: f64,
    /// Obstacle height above the line of sight (negative when below it).
    pub clearance_m: f64,
    pub fresnel_radius_m: f64,
    pub clearance_ratio: f64,
    pub obstructed: bool,
    pub guidance: ClearanceGuidance,
    /// (v, J(v)) over the tabulated range, for plotting.
    pub plot_points: Vec<(f64, f64)>,
}

/// Radius of Fresnel zone `zone` (≥ 1) at the obstacle.
pub fn fresnel_radius(frequency_hz: f64, d1_m: f64, d2_m: f64, zone: u32) -> Result<f64> {
    let f = ensure_positive(frequency_hz, "frequency")?;
    let d1 = ensure_positive(d1_m, "d1")?;
    let d2 = ensure_positive(d2_m, "d2")?;
    if zone == 0 {
        return Err(RfError::invalid("Fresnel zone must be >= 1"));
    }
    Ok((f64::from(zone) * wavelength_m(f) * d1 * d2 / (d1 + d2)).sqrt())
}

pub fn knife_edge_v(height_m: f64, frequency_hz: f64, d1_m: f64, d2_m: f64) -> Result<f64> {
    let lambda = wavelength_m(ensure_positive(frequency_hz, "frequency")?);
    let d1 = ensure_positive(d1_m, "d1")?;
    let d2 = ensure_positive(d2_m, "d2")?;
    Ok(height_m * (2.0 / lambda * (d1 + d2) / (d1 * d2)).sqrt())
}

pub fn knife_edge_loss_db(v: f64) -> f64 {
    if v <= V_NO_LOSS {
        return 0.0;
    }
    let x = v - 0.1;
    6.9 + 20.0 * ((x * x + 1.0).sqrt() + x).log10()
}

/// J(v) sampled from v = −3 to 6 in steps of 0.25.
pub fn loss_curve() -> Vec<(f64, f64)> {
    (0..PLOT_POINTS)
        .map(|i| {
            let v = PLOT_V_START + PLOT_V_STEP * i as f64;
            (v, knife_edge_loss_db(v))
        })
        .collect()
}

/// Full obstacle analysis for a path of `d1 + d2` metres with antenna and
/// obstacle heights on a common datum.
pub fn compute_knife_edge(
    frequency_hz: f64,
    d1_m: f64,
    d2_m: f64,
    tx_height_m: f64,
    rx_height_m: f64,
    obstacle_height_m: f64,
) -> Result<KnifeEdgeResult> {
    let d1 = ensure_positive(d1_m, "d1")?;
    let d2 = ensure_positive(d2_m, "d2")?;
    let los_height = tx_height_m + (rx_height_m - tx_height_m) * d1 / (d1 + d2);
    let clearance = obstacle_height_m - los_height;
    let v = knife_edge_v(clearance, frequency_hz, d1, d2)?;
    let r1 = fresnel_radius(frequency_hz, d1, d2, 1)?;
    let clearance_ratio = if r1 > 0.0 { clearance / r1 } else { f64::INFINITY };
    Ok(KnifeEdgeResult {
        v,
        loss_db: knife_edge_loss_db(v),
        clearance_m: clearance,
        fresnel_radius_m: r1,
        clearance_ratio,
        obstructed: clearance > 0.0,
        guidance: ClearanceGuidance::from_ratio(clearance_ratio),
        plot_points: loss_curve(),
    })
}
