//! Frequency and length units, physical constants and positivity checks.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{Result, RfError};

/// Speed of light in vacuum (m/s). Exact by SI definition.
pub const C: f64 = 299_792_458.0;

/// Smallest magnitude treated as non-zero by divisions and logarithms.
pub const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    #[strum(serialize = "hz", to_string = "Hz")]
    Hz,
    #[strum(serialize = "khz", to_string = "kHz")]
    KHz,
    #[strum(serialize = "mhz", to_string = "MHz")]
    MHz,
    #[strum(serialize = "ghz", to_string = "GHz")]
    GHz,
}

impl FrequencyUnit {
    pub fn factor(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    M,
    Cm,
    Mm,
    Mil,
    In,
    Ft,
    Km,
    Um,
}

impl LengthUnit {
    pub fn factor(self) -> f64 {
        match self {
            LengthUnit::M => 1.0,
            LengthUnit::Cm => 0.01,
            LengthUnit::Mm => 1e-3,
            LengthUnit::Mil => 25.4e-6,
            LengthUnit::In => 0.0254,
            LengthUnit::Ft => 0.3048,
            LengthUnit::Km => 1000.0,
            LengthUnit::Um => 1e-6,
        }
    }
}

#[inline]
pub fn to_hz(value: f64, unit: FrequencyUnit) -> f64 {
    value * unit.factor()
}

#[inline]
pub fn from_hz(value_hz: f64, unit: FrequencyUnit) -> f64 {
    value_hz / unit.factor()
}

#[inline]
pub fn to_meters(value: f64, unit: LengthUnit) -> f64 {
    value * unit.factor()
}

#[inline]
pub fn from_meters(value_m: f64, unit: LengthUnit) -> f64 {
    value_m / unit.factor()
}

/// Free-space wavelength (m) at `frequency_hz`.
#[inline]
pub fn wavelength_m(frequency_hz: f64) -> f64 {
    C / frequency_hz
}

/// Reject values that are not strictly positive. NaN is rejected too.
pub fn ensure_positive(value: f64, field: &str) -> Result<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(RfError::invalid(format!("{field} must be greater than zero (got {value})")))
    }
}

/// Reject negative values (and NaN).
pub fn ensure_non_negative(value: f64, field: &str) -> Result<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(RfError::invalid(format!("{field} must not be negative (got {value})")))
    }
}

/// Either a frequency or a length unit, for display-side conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Unit {
    Frequency(FrequencyUnit),
    Length(LengthUnit),
}

/// A physical value tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub value: f64,
    pub unit: Unit,
}

impl UnitValue {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Express the value in `target`. Both units must share a dimension.
    pub fn as_unit(&self, target: Unit) -> Result<f64> {
        match (self.unit, target) {
            (Unit::Frequency(from), Unit::Frequency(to)) => {
                Ok(from_hz(to_hz(self.value, from), to))
            }
            (Unit::Length(from), Unit::Length(to)) => {
                Ok(from_meters(to_meters(self.value, from), to))
            }
            _ => Err(RfError::invalid(format!(
                "cannot convert {:?} to {:?}",
                self.unit, target
            ))),
        }
    }
}
