//! Readers for raw measured-pattern text.
//!
//! Two layouts are understood, tried in this order:
//!
//! * Column exports (HFSS style, e.g. `Freq, Phi, Theta, rE`): one
//!   delimiter per file, an optional header row, the same column count on
//!   every row, and columns chosen by content. Angles prefer column 2 and
//!   amplitudes column 3. With four or more columns only the dominant φ cut
//!   (column 1) is kept.
//! * Generic tables: whitespace, `;` or `,` separated rows. Rows with three
//!   or more numbers are read as `index angle amplitude`, rows with two as
//!   `angle amplitude`.
//!
//! `#` lines are comments in both.
use super::PatternSample;
use crate::error::{Result, RfError};

const PREFERRED_ANGLE_COLUMN: usize = 2;
const PREFERRED_AMPLITUDE_COLUMN: usize = 3;
/// Angle columns should sweep at least this much.
const MIN_ANGLE_SPAN_DEG: f64 = 45.0;
/// Rounding applied when counting φ values.
const PHI_DECIMALS: f64 = 1e4;
const PHI_TOLERANCE: f64 = 1e-3;

fn parse_number(token: &str) -> Option<f64> {
    let v: f64 = token.trim().replace(',', ".").parse().ok()?;
    v.is_finite().then_some(v)
}

/// Parse a measured pattern, trying the column-export layout first and
/// falling back to the generic table.
///
/// Negative amplitudes clamp to zero. Duplicate angles are kept here and
/// averaged later by [`ElementPattern::new`](super::ElementPattern::new).
pub fn parse_pattern_text(text: &str) -> Result<Vec<PatternSample>> {
    parse_column_export(text).or_else(|_| parse_generic_table(text))
}

/// Generic angle/amplitude table.
pub fn parse_generic_table(text: &str) -> Result<Vec<PatternSample>> {
    let mut out = Vec::new();
    for line in content_lines(text) {
        let numbers: Vec<f64> = line
            .split(|c: char| c.is_whitespace() || c == ';' || c == ',')
            .filter(|t| !t.is_empty())
            .filter_map(parse_number)
            .collect();
        let (angle, amplitude) = match numbers.len() {
            0 | 1 => continue,
            2 => (numbers[0], numbers[1]),
            _ => (numbers[1], numbers[2]),
        };
        out.push(PatternSample::new(angle, amplitude.max(0.0)));
    }
    if out.is_empty() {
        return Err(RfError::Parse(
            "no line with enough numeric values was found".to_string(),
        ));
    }
    Ok(out)
}

// ── Column exports ────────────────────────────────────────────────────────────

type Row = Vec<Option<f64>>;

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

#[derive(Clone, Copy)]
enum Delimiter {
    Char(char),
    Whitespace,
}

impl Delimiter {
    /// First of `;`, tab or `,` present in the first row, else whitespace.
    fn detect(first: &str) -> Self {
        [';', '\t', ',']
            .into_iter()
            .find(|&c| first.contains(c))
            .map_or(Delimiter::Whitespace, Delimiter::Char)
    }

    fn split<'a>(self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Char(c) => line.split(c).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

/// Column-export layout: header row, dominant φ cut, content-picked columns.
pub fn parse_column_export(text: &str) -> Result<Vec<PatternSample>> {
    let mut lines = content_lines(text).peekable();
    let first = lines
        .peek()
        .copied()
        .ok_or_else(|| RfError::Parse("empty pattern file".to_string()))?;
    let delimiter = Delimiter::detect(first);
    if first.chars().any(char::is_alphabetic) {
        lines.next();
    }

    let cells: Vec<Vec<&str>> = lines.map(|l| delimiter.split(l)).collect();
    let width = cells.iter().map(Vec::len).max().unwrap_or(0);
    if width < 2 {
        return Err(RfError::Parse("no multi-column rows".to_string()));
    }
    if cells.iter().any(|r| r.len() != width) {
        return Err(RfError::Parse("rows differ in column count".to_string()));
    }
    let mut rows: Vec<Row> = cells
        .iter()
        .map(|r| (0..width).map(|i| r.get(i).and_then(|t| parse_number(t))).collect())
        .collect();
    if width > PREFERRED_AMPLITUDE_COLUMN {
        rows = select_primary_phi_rows(rows);
    }

    let columns: Vec<Vec<f64>> = (0..width)
        .map(|i| rows.iter().filter_map(|r| r[i]).collect())
        .collect();
    let angle_idx = pick_angle_column(&columns, rows.len())?;
    let amplitude_idx = pick_amplitude_column(&columns, rows.len(), angle_idx)?;

    let out: Vec<PatternSample> = rows
        .iter()
        .filter_map(|r| Some(PatternSample::new(r[angle_idx]?, r[amplitude_idx]?.max(0.0))))
        .collect();
    if out.is_empty() {
        return Err(RfError::Parse(
            "no angle/amplitude pairs in the selected columns".to_string(),
        ));
    }
    Ok(out)
}

fn span(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if values.is_empty() {
        0.0
    } else {
        max - min
    }
}

/// Keep the rows of the most frequent φ (column 1); ties go to the φ
/// closest to zero.
fn select_primary_phi_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for phi in rows.iter().filter_map(|r| r[1]) {
        let key = (phi * PHI_DECIMALS).round() / PHI_DECIMALS;
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    if counts.len() <= 1 {
        return rows;
    }
    let Some(&(best, _)) = counts
        .iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.abs().total_cmp(&a.0.abs())))
    else {
        return rows;
    };
    let kept: Vec<Row> = rows
        .iter()
        .filter(|r| r[1].is_some_and(|phi| (phi - best).abs() <= PHI_TOLERANCE))
        .cloned()
        .collect();
    if kept.is_empty() {
        rows
    } else {
        kept
    }
}

fn dense(values: &[f64], row_count: usize, fraction: f64) -> bool {
    values.len() as f64 >= row_count as f64 * fraction
}

fn pick_angle_column(columns: &[Vec<f64>], row_count: usize) -> Result<usize> {
    let sweeps = |vals: &Vec<f64>| dense(vals, row_count, 0.6) && span(vals) >= MIN_ANGLE_SPAN_DEG;
    if columns.get(PREFERRED_ANGLE_COLUMN).is_some_and(sweeps) {
        return Ok(PREFERRED_ANGLE_COLUMN);
    }
    if let Some(idx) = (0..columns.len())
        .filter(|&i| i != PREFERRED_ANGLE_COLUMN && sweeps(&columns[i]))
        .min_by_key(|&i| i.abs_diff(PREFERRED_ANGLE_COLUMN))
    {
        return Ok(idx);
    }
    let mut ranked: Vec<usize> = (0..columns.len()).collect();
    ranked.sort_by(|&a, &b| span(&columns[b]).total_cmp(&span(&columns[a])));
    ranked
        .into_iter()
        .find(|&i| dense(&columns[i], row_count, 0.4) && span(&columns[i]) >= 1.0)
        .ok_or_else(|| RfError::Parse("no angle column found".to_string()))
}

fn pick_amplitude_column(
    columns: &[Vec<f64>],
    row_count: usize,
    angle_idx: usize,
) -> Result<usize> {
    if columns
        .get(PREFERRED_AMPLITUDE_COLUMN)
        .is_some_and(|vals| dense(vals, row_count, 0.6))
    {
        return Ok(PREFERRED_AMPLITUDE_COLUMN);
    }
    // Widest non-negative column; lowest index on ties.
    let best = (0..columns.len())
        .filter(|&i| i != angle_idx && dense(&columns[i], row_count, 0.6))
        .filter(|&i| columns[i].iter().all(|&v| v >= 0.0))
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if span(&columns[b]) >= span(&columns[i]) => best,
            _ => Some(i),
        });
    if let Some(idx) = best {
        return Ok(idx);
    }
    (0..columns.len())
        .rev()
        .find(|&i| i != angle_idx && dense(&columns[i], row_count, 0.4))
        .ok_or_else(|| RfError::Parse("no amplitude column found".to_string()))
}
