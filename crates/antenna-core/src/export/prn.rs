//! `.PRN` (planet-style) encoder.
//!
//! Header keywords followed by two 360-row tables of `angle<TAB>attenuation`
//! where attenuation is `max(0, −20·log10(amplitude))`, saturating at 100 dB
//! for non-positive amplitude.
//!
//! Vertical rows use the 0..359 convention of the format: 0 is the front
//! horizon, 90 straight down, 180 the back horizon and 270 straight up.
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::metrics::{lin_to_att_db, ProjectMetrics};
use crate::pattern::CompositePattern;

/// dBd → dBi offset of a half-wave dipole.
const DBD_TO_DBI: f64 = 2.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrnHeader {
    pub name: String,
    pub make: String,
    pub frequency_mhz: f64,
    pub h_width_deg: f64,
    pub v_width_deg: f64,
    pub front_to_back_db: f64,
    pub gain_dbi: f64,
}

impl PrnHeader {
    /// Header for a composed project. The gain is the beamwidth-product
    /// estimate, or the nominal element gain in dBi when the estimate is
    /// not computable.
    pub fn for_project(
        name: impl Into<String>,
        make: impl Into<String>,
        config: &ProjectConfig,
        metrics: &ProjectMetrics,
    ) -> Self {
        let gain_dbi = if metrics.estimated_gain_dbi.is_finite() {
            metrics.estimated_gain_dbi
        } else {
            config.nominal_element_gain_dbd + DBD_TO_DBI
        };
        Self {
            name: name.into(),
            make: make.into(),
            frequency_mhz: config.frequency_mhz,
            h_width_deg: metrics.horizontal.hpbw_deg,
            v_width_deg: metrics.vertical.hpbw_deg,
            front_to_back_db: metrics.horizontal.front_to_back_db,
            gain_dbi,
        }
    }
}

/// Vertical-grid angle (positive below the horizon) read by a `.PRN`
/// vertical row. Rows past 90 look over the back, so their depression
/// mirrors about 180.
pub fn prn_vertical_elevation_deg(row_deg: u32) -> f64 {
    let a = f64::from(row_deg % 360);
    if a <= 90.0 {
        a
    } else if a >= 270.0 {
        a - 360.0
    } else {
        180.0 - a
    }
}

/// Non-finite header values are written as 0 so the file stays parseable.
fn num(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "0.00".to_string()
    }
}

pub fn write_prn<W: Write>(
    out: &mut W,
    header: &PrnHeader,
    horizontal: &CompositePattern,
    vertical: &CompositePattern,
) -> Result<()> {
    writeln!(out, "NAME {}", header.name)?;
    writeln!(out, "MAKE {}", header.make)?;
    writeln!(out, "FREQUENCY {} MHz", num(header.frequency_mhz))?;
    writeln!(out, "H_WIDTH {}", num(header.h_width_deg))?;
    writeln!(out, "V_WIDTH {}", num(header.v_width_deg))?;
    writeln!(out, "FRONT_TO_BACK {}", num(header.front_to_back_db))?;
    writeln!(out, "GAIN {} dBi", num(header.gain_dbi))?;
    writeln!(out, "TILT MECHANICAL")?;

    writeln!(out, "HORIZONTAL 360")?;
    for az in 0..360u32 {
        let amp = horizontal.value_at_azimuth(f64::from(az));
        writeln!(out, "{az}\t{:.2}", lin_to_att_db(amp))?;
    }
    writeln!(out, "VERTICAL 360")?;
    for row in 0..360u32 {
        let amp = vertical.value_at(prn_vertical_elevation_deg(row));
        writeln!(out, "{row}\t{:.2}", lin_to_att_db(amp))?;
    }
    Ok(())
}

pub fn encode_prn(
    header: &PrnHeader,
    horizontal: &CompositePattern,
    vertical: &CompositePattern,
) -> Result<String> {
    super::to_string(|buf| write_prn(buf, header, horizontal, vertical))
}
