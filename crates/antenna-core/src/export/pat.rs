//! `.PAT` encoder.
//!
//! Layout:
//! ```text
//! '<description>', <gain>, <element count>
//! 0, <amp>            ← azimuths 0..=359
//! …
//! 356, <amp>          ← 356..=359 repeated as the wrap check
//! …
//! 999
//! 1, 91
//! 269,
//! 0, <amp>            ← elevations 0 down to −90
//! …
//! -90, <amp>
//! ```
//!
//! Vertical rows carry negative elevations; the composite grid counts
//! depression as positive, so row `el` reads grid angle `−el`.
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::CompositePattern;

const WRAP_CHECK: std::ops::Range<i32> = 356..360;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatHeader {
    pub description: String,
    pub gain_dbd: f64,
    pub element_count: usize,
}

/// Write the `.PAT` encoding of a horizontal/vertical composite pair.
pub fn write_pat<W: Write>(
    out: &mut W,
    header: &PatHeader,
    horizontal: &CompositePattern,
    vertical: &CompositePattern,
) -> Result<()> {
    // Single quotes delimit the description; strip any embedded ones.
    let description = header.description.replace('\'', "");
    writeln!(out, "'{description}', {:.2}, {}", header.gain_dbd, header.element_count)?;

    for az in (0..360).chain(WRAP_CHECK) {
        writeln!(out, "{az}, {:.4}", horizontal.value_at_azimuth(f64::from(az)))?;
    }
    writeln!(out, "999")?;
    writeln!(out, "1, 91")?;
    writeln!(out, "269,")?;
    for el in (-90..=0).rev() {
        writeln!(out, "{el}, {:.4}", vertical.value_at(-f64::from(el)))?;
    }
    Ok(())
}

pub fn encode_pat(
    header: &PatHeader,
    horizontal: &CompositePattern,
    vertical: &CompositePattern,
) -> Result<String> {
    super::to_string(|buf| write_pat(buf, header, horizontal, vertical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{ElementPattern, PatternKind, PatternSample};

    fn patterns() -> (CompositePattern, CompositePattern) {
        let h = ElementPattern::new(
            PatternKind::Horizontal,
            vec![PatternSample::new(0.0, 1.0), PatternSample::new(180.0, 0.0)],
        )
        .unwrap()
        .resample();
        let v = ElementPattern::new(
            PatternKind::Vertical,
            vec![PatternSample::new(0.0, 1.0), PatternSample::new(90.0, 0.0)],
        )
        .unwrap()
        .resample();
        (h, v)
    }

    #[test]
    fn pat_layout_and_line_count() {
        let (h, v) = patterns();
        let header = PatHeader {
            description: "Panel 'X'".into(),
            gain_dbd: 9.5,
            element_count: 4,
        };
        let text = encode_pat(&header, &h, &v).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 360 + 4 + 3 + 91);
        assert_eq!(lines[0], "'Panel X', 9.50, 4");
        assert_eq!(lines[1], "0, 1.0000");
        assert_eq!(lines[1 + 90], "90, 0.5000");
        assert_eq!(lines[1 + 270], "270, 0.5000");
        assert_eq!(lines[361], "356, 0.9778");
        assert_eq!(lines[361], lines[1 + 356]);
        assert_eq!(&lines[365..368], &["999", "1, 91", "269,"]);
        assert_eq!(lines[368], "0, 1.0000");
        assert_eq!(lines[368 + 45], "-45, 0.5000");
        assert_eq!(*lines.last().unwrap(), "-90, 0.0000");
    }
}
