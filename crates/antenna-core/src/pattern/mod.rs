//! Element patterns, composite patterns and the resampling/normalization
//! stage that feeds the array composition engine.

pub mod normalize;
pub mod parse;
pub mod resample;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};

pub use normalize::{normalize, NormalizationMode};
pub use parse::{parse_column_export, parse_generic_table, parse_pattern_text};
pub use resample::{resample_horizontal, resample_vertical};

/// Which cut a pattern describes.
///
/// Horizontal patterns are periodic over 360°. Vertical patterns span
/// −90°..+90°, positive below the horizon, and are clamped at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Horizontal,
    Vertical,
}

/// One measured point of a raw pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternSample {
    pub angle_deg: f64,
    pub amplitude_linear: f64,
}

impl PatternSample {
    pub fn new(angle_deg: f64, amplitude_linear: f64) -> Self {
        Self { angle_deg, amplitude_linear }
    }
}

/// Element pattern as written in project files, before cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawElementPattern {
    kind: PatternKind,
    samples: Vec<PatternSample>,
}

/// A cleaned raw element pattern: finite, sorted, one sample per angle,
/// amplitudes ≥ 0. Deserialization goes through [`ElementPattern::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElementPattern", into = "RawElementPattern")]
pub struct ElementPattern {
    kind: PatternKind,
    samples: Vec<PatternSample>,
}

impl TryFrom<RawElementPattern> for ElementPattern {
    type Error = RfError;

    fn try_from(raw: RawElementPattern) -> Result<Self> {
        ElementPattern::new(raw.kind, raw.samples)
    }
}

impl From<ElementPattern> for RawElementPattern {
    fn from(pattern: ElementPattern) -> Self {
        RawElementPattern { kind: pattern.kind, samples: pattern.samples }
    }
}

impl ElementPattern {
    /// Build a pattern from raw samples. Non-finite samples are dropped,
    /// negative amplitudes clamp to zero and duplicate angles are averaged.
    pub fn new(
        kind: PatternKind,
        samples: impl IntoIterator<Item = PatternSample>,
    ) -> Result<Self> {
        let mut raw: Vec<PatternSample> = samples
            .into_iter()
            .filter(|s| s.angle_deg.is_finite() && s.amplitude_linear.is_finite())
            .map(|s| PatternSample::new(s.angle_deg, s.amplitude_linear.max(0.0)))
            .collect();
        if raw.is_empty() {
            return Err(RfError::invalid(format!("{kind:?} pattern has no finite samples")));
        }
        raw.sort_by(|a, b| a.angle_deg.total_cmp(&b.angle_deg));

        let mut samples: Vec<PatternSample> = Vec::with_capacity(raw.len());
        let mut run_sum = 0.0;
        let mut run_len = 0usize;
        for s in raw {
            match samples.last_mut() {
                Some(last) if last.angle_deg == s.angle_deg => {
                    run_sum += s.amplitude_linear;
                    run_len += 1;
                    last.amplitude_linear = run_sum / run_len as f64;
                }
                _ => {
                    run_sum = s.amplitude_linear;
                    run_len = 1;
                    samples.push(s);
                }
            }
        }
        Ok(Self { kind, samples })
    }

    /// The unit (isotropic) pattern used when no measured pattern exists.
    pub fn uniform(kind: PatternKind) -> Self {
        let (lo, hi) = match kind {
            PatternKind::Horizontal => (-180.0, 180.0),
            PatternKind::Vertical => (-90.0, 90.0),
        };
        Self {
            kind,
            samples: vec![PatternSample::new(lo, 1.0), PatternSample::new(hi, 1.0)],
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn samples(&self) -> &[PatternSample] {
        &self.samples
    }

    /// Resample onto the fixed grid for this pattern's kind.
    pub fn resample(&self) -> CompositePattern {
        match self.kind {
            PatternKind::Horizontal => resample_horizontal(&self.samples, -180.0, 180.0, 1.0),
            PatternKind::Vertical => resample_vertical(&self.samples),
        }
    }
}

/// A pattern on a regular, strictly increasing angle grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositePattern {
    pub kind: PatternKind,
    pub angles_deg: Vec<f64>,
    pub amplitude_linear: Vec<f64>,
}

impl CompositePattern {
    pub fn new(kind: PatternKind, angles_deg: Vec<f64>, amplitude_linear: Vec<f64>) -> Self {
        debug_assert_eq!(angles_deg.len(), amplitude_linear.len());
        Self { kind, angles_deg, amplitude_linear }
    }

    pub fn len(&self) -> usize {
        self.angles_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles_deg.is_empty()
    }

    /// Linear amplitude at `angle_deg`, interpolated and clamped at the
    /// grid edges.
    pub fn value_at(&self, angle_deg: f64) -> f64 {
        resample::interp(angle_deg, &self.angles_deg, &self.amplitude_linear)
    }

    /// Amplitude at a horizontal azimuth in any turn, wrapped into the
    /// grid's −180..180 range first.
    pub fn value_at_azimuth(&self, azimuth_deg: f64) -> f64 {
        self.value_at(wrap_180(azimuth_deg))
    }

    /// Index of the sample nearest to `angle_deg` (first one on ties).
    pub fn nearest_index(&self, angle_deg: f64) -> Option<usize> {
        self.angles_deg
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &a)| {
                let d = (a - angle_deg).abs();
                match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                }
            })
            .map(|(i, _)| i)
    }
}

/// Wrap an angle into (−180, 180].
#[inline]
pub fn wrap_180(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}
