//! Resampling of sparse element patterns onto fixed angle grids.
//!
//! Horizontal patterns wrap: samples are replicated at angle ± 360° before
//! interpolating. Vertical patterns clamp to the first/last sample outside
//! the measured range.
use super::{CompositePattern, PatternKind, PatternSample};

/// Vertical grid resolution in tenths of a degree: −90.0..=90.0 step 0.1.
const VERTICAL_TENTHS: i32 = 900;

/// Linear interpolation of `x` over the increasing abscissa `xp`.
///
/// Outside `[xp[0], xp[n-1]]` the end values are returned. Repeated
/// abscissae are allowed; the later ordinate wins on an exact hit.
/// Returns NaN for an empty table.
pub(crate) fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // First index with xp[hi] > x; xp[hi - 1] <= x.
    let hi = xp[..n].partition_point(|&a| a <= x);
    let lo = hi - 1;
    let dx = xp[hi] - xp[lo];
    if dx <= 0.0 {
        return fp[hi];
    }
    let t = (x - xp[lo]) / dx;
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// Regular grid `start, start + step, …` up to and including `stop`.
pub(crate) fn angle_grid(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop < start {
        return vec![start];
    }
    let n = ((stop - start) / step + 1e-9).floor() as usize + 1;
    (0..n).map(|i| start + i as f64 * step).collect()
}

fn sorted_xy(samples: &[PatternSample]) -> (Vec<f64>, Vec<f64>) {
    let mut s: Vec<PatternSample> = samples.to_vec();
    s.sort_by(|a, b| a.angle_deg.total_cmp(&b.angle_deg));
    s.into_iter().map(|p| (p.angle_deg, p.amplitude_linear)).unzip()
}

/// Resample a periodic horizontal pattern onto `start..=stop` in `step`
/// increments.
pub fn resample_horizontal(
    samples: &[PatternSample],
    start: f64,
    stop: f64,
    step: f64,
) -> CompositePattern {
    let dest = angle_grid(start, stop, step);
    let (xs, ys) = sorted_xy(samples);

    let mut xp = Vec::with_capacity(xs.len() * 3);
    let mut fp = Vec::with_capacity(ys.len() * 3);
    for shift in [-360.0, 0.0, 360.0] {
        xp.extend(xs.iter().map(|a| a + shift));
        fp.extend_from_slice(&ys);
    }

    let amp = dest.iter().map(|&a| interp(a, &xp, &fp).max(0.0)).collect();
    CompositePattern::new(PatternKind::Horizontal, dest, amp)
}

/// Resample a vertical pattern onto −90°..+90° at 0.1° resolution.
pub fn resample_vertical(samples: &[PatternSample]) -> CompositePattern {
    let dest: Vec<f64> = (-VERTICAL_TENTHS..=VERTICAL_TENTHS)
        .map(|t| t as f64 / 10.0)
        .collect();
    let (xp, fp) = sorted_xy(samples);
    let amp = dest.iter().map(|&a| interp(a, &xp, &fp).max(0.0)).collect();
    CompositePattern::new(PatternKind::Vertical, dest, amp)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn samples(points: &[(f64, f64)]) -> Vec<PatternSample> {
        points.iter().map(|&(a, v)| PatternSample::new(a, v)).collect()
    }

    #[test]
    fn interp_matches_clamped_linear_semantics() {
        let xp = [0.0, 10.0, 20.0];
        let fp = [1.0, 3.0, 2.0];
        assert_abs_diff_eq!(interp(-5.0, &xp, &fp), 1.0);
        assert_abs_diff_eq!(interp(5.0, &xp, &fp), 2.0);
        assert_abs_diff_eq!(interp(15.0, &xp, &fp), 2.5);
        assert_abs_diff_eq!(interp(25.0, &xp, &fp), 2.0);
        assert_abs_diff_eq!(interp(10.0, &xp, &fp), 3.0);
    }

    #[test]
    fn horizontal_grid_has_requested_length_and_is_increasing() {
        let s = samples(&[(0.0, 1.0), (90.0, 0.5), (180.0, 0.1), (270.0, 0.5)]);
        for step in [1.0, 2.0, 5.0, 0.5] {
            let p = resample_horizontal(&s, -180.0, 180.0, step);
            let expected = (360.0 / step) as usize + 1;
            assert_eq!(p.len(), expected, "step {step}");
            assert!(p.angles_deg.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn horizontal_interpolation_wraps_across_the_seam() {
        // Samples only at 170° and −170°: the gap straddles ±180°.
        let s = samples(&[(170.0, 1.0), (-170.0, 0.0)]);
        let p = resample_horizontal(&s, -180.0, 180.0, 1.0);
        assert_abs_diff_eq!(p.value_at(180.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.value_at(-180.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.value_at(175.0), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn vertical_grid_clamps_beyond_data() {
        let s = samples(&[(-10.0, 0.2), (0.0, 1.0), (10.0, 0.4)]);
        let p = resample_vertical(&s);
        assert_eq!(p.len(), 1801);
        assert_abs_diff_eq!(p.angles_deg[0], -90.0);
        assert_abs_diff_eq!(p.angles_deg[900], 0.0);
        assert_abs_diff_eq!(p.angles_deg[1800], 90.0);
        assert_abs_diff_eq!(p.value_at(-60.0), 0.2);
        assert_abs_diff_eq!(p.value_at(60.0), 0.4);
        assert_abs_diff_eq!(p.value_at(5.0), 0.7, epsilon = 1e-12);
    }
}
