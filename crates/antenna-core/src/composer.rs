//! Array composition engine and project pipeline orchestrator.
//!
//! Horizontal composition sums one phasor per element at each target azimuth:
//!
//!   E(φ) = Σₘ taperᵐ · g(φ) · exp(i·(k·xₘ·sin φ + m·β))
//!
//! with centred offsets `xₘ = (m − (N−1)/2)·d` and `k = 2π/λ`. The circular
//! layout places N panels on a ring of radius `d / (2·sin(π/N))`, each rotated
//! by `m·step`, and evaluates each panel's pattern relative to its own
//! boresight. Vertical composition multiplies the element pattern by the
//! closed-form array factor with ψ = k·d·sin θ + β, where θ is the
//! depression angle (positive below the horizon).
//!
//! Pipeline order: horizontal → vertical → ERP.

use std::f64::consts::PI;

use log::debug;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::config::{vertical_progressive_phase_deg, ArrayLayout, ProjectConfig};
use crate::erp::{compute_erp, ErpTable};
use crate::error::{Result, RfError};
use crate::pattern::{
    normalize, resample::interp, wrap_180, CompositePattern, ElementPattern, PatternKind,
};

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Composite horizontal pattern plus the values derived while composing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalComposition {
    pub pattern: CompositePattern,
    pub layout: ArrayLayout,
    pub wavelength_m: f64,
    /// Spacing used, after the one-wavelength default.
    pub effective_spacing_m: f64,
    /// Ring radius for the circular layout; 0 for linear arrays.
    pub radius_m: f64,
}

/// Composite vertical pattern plus the values derived while composing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalComposition {
    pub pattern: CompositePattern,
    pub wavelength_m: f64,
    pub effective_spacing_m: f64,
    /// Progressive phase derived from the tilt, degrees.
    pub effective_progressive_phase_deg: f64,
}

/// Full pipeline output for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectComposition {
    pub horizontal: HorizontalComposition,
    pub vertical: VerticalComposition,
    pub erp: ErpTable,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_kind(element: &ElementPattern, expected: PatternKind) -> Result<()> {
    if element.kind() != expected {
        return Err(RfError::invalid(format!(
            "expected a {expected:?} element pattern, got {:?}",
            element.kind()
        )));
    }
    Ok(())
}

/// Evaluate `f(index, angle)` for every grid angle, in parallel when the
/// `threading` feature is enabled.
#[cfg(feature = "threading")]
fn phasors_over<F>(angles: &[f64], f: F) -> Vec<Complex64>
where
    F: Fn(usize, f64) -> Complex64 + Sync + Send,
{
    angles.par_iter().enumerate().map(|(i, &a)| f(i, a)).collect()
}

#[cfg(not(feature = "threading"))]
fn phasors_over<F>(angles: &[f64], f: F) -> Vec<Complex64>
where
    F: Fn(usize, f64) -> Complex64,
{
    angles.iter().enumerate().map(|(i, &a)| f(i, a)).collect()
}

// ── Horizontal ────────────────────────────────────────────────────────────────

/// Compose the horizontal pattern of `config.horizontal` from a horizontal
/// element pattern.
pub fn compose_horizontal(
    config: &ProjectConfig,
    element: &ElementPattern,
) -> Result<HorizontalComposition> {
    check_kind(element, PatternKind::Horizontal)?;
    ensure_frequency(config)?;

    let h = &config.horizontal;
    let resampled = element.resample();
    let angles = &resampled.angles_deg;
    let g = &resampled.amplitude_linear;

    let lambda = config.wavelength_m();
    let k = 2.0 * PI / lambda;
    let count = h.array.count.max(1);
    let spacing = h.array.effective_spacing_m(lambda);
    if count > 1 && h.array.spacing_m <= 0.0 {
        debug!("horizontal spacing unspecified; using one wavelength ({spacing:.4} m)");
    }
    let beta = h.array.progressive_phase_deg.to_radians();
    let weights: Vec<f64> = (0..count).map(|m| h.array.weight(m)).collect();
    let layout = h.layout();
    let mut radius = 0.0;

    let composite: Vec<Complex64> = if count == 1 {
        g.iter().map(|&v| Complex64::new(v, 0.0)).collect()
    } else {
        match layout {
            ArrayLayout::Linear => {
                let offsets: Vec<f64> = (0..count)
                    .map(|m| (m as f64 - (count - 1) as f64 / 2.0) * spacing)
                    .collect();
                phasors_over(angles, |i, phi_deg| {
                    let sin_phi = phi_deg.to_radians().sin();
                    offsets
                        .iter()
                        .enumerate()
                        .map(|(m, &x)| {
                            let phase = k * x * sin_phi + beta * m as f64;
                            Complex64::from_polar(weights[m] * g[i], phase)
                        })
                        .sum()
                })
            }
            ArrayLayout::Circular { step_deg } => {
                radius = spacing / (2.0 * (PI / count as f64).sin());
                let rotations: Vec<f64> = (0..count).map(|m| m as f64 * step_deg).collect();
                let positions: Vec<(f64, f64)> = rotations
                    .iter()
                    .map(|a| {
                        let (s, c) = a.to_radians().sin_cos();
                        (radius * c, radius * s)
                    })
                    .collect();
                phasors_over(angles, |_, phi_deg| {
                    let (uy, ux) = phi_deg.to_radians().sin_cos();
                    (0..count)
                        .map(|m| {
                            let (xm, ym) = positions[m];
                            let phase = k * (xm * ux + ym * uy) + beta * m as f64;
                            // Each panel sees the target relative to its own boresight.
                            let rel = wrap_180(phi_deg - rotations[m]);
                            let sample = interp(rel, angles, g);
                            Complex64::from_polar(weights[m] * sample, phase)
                        })
                        .sum()
                })
            }
        }
    };

    let magnitude: Vec<f64> = composite.iter().map(|z| z.norm()).collect();
    let amplitude = normalize(&magnitude, h.array.normalization);
    debug!(
        "composed horizontal pattern: {count} element(s), {layout:?}, spacing {spacing:.4} m"
    );

    Ok(HorizontalComposition {
        pattern: CompositePattern::new(PatternKind::Horizontal, resampled.angles_deg, amplitude),
        layout,
        wavelength_m: lambda,
        effective_spacing_m: spacing,
        radius_m: radius,
    })
}

// ── Vertical ──────────────────────────────────────────────────────────────────

/// Compose the vertical pattern of `config.vertical` from a vertical element
/// pattern. The progressive phase is derived from the tilt.
pub fn compose_vertical(
    config: &ProjectConfig,
    element: &ElementPattern,
) -> Result<VerticalComposition> {
    check_kind(element, PatternKind::Vertical)?;
    ensure_frequency(config)?;

    let v = &config.vertical;
    let resampled = element.resample();

    let lambda = config.wavelength_m();
    let k = 2.0 * PI / lambda;
    let count = v.array.count.max(1);
    let spacing = v.array.effective_spacing_m(lambda);
    let beta_deg = vertical_progressive_phase_deg(config.frequency_mhz, spacing, v.tilt_deg);
    let beta = beta_deg.to_radians();
    debug!("vertical tilt {:.2}° → progressive phase {beta_deg:.3}°", v.tilt_deg);

    let weights: Vec<f64> = (0..count).map(|m| v.array.weight(m)).collect();
    let magnitude: Vec<f64> = resampled
        .angles_deg
        .iter()
        .zip(&resampled.amplitude_linear)
        .map(|(&theta, &g)| {
            let psi = k * spacing * theta.to_radians().sin() + beta;
            let af: Complex64 = weights
                .iter()
                .enumerate()
                .map(|(m, &w)| Complex64::from_polar(w, m as f64 * psi))
                .sum();
            g * af.norm()
        })
        .collect();
    let amplitude = normalize(&magnitude, v.array.normalization);

    Ok(VerticalComposition {
        pattern: CompositePattern::new(PatternKind::Vertical, resampled.angles_deg, amplitude),
        wavelength_m: lambda,
        effective_spacing_m: spacing,
        effective_progressive_phase_deg: beta_deg,
    })
}

fn ensure_frequency(config: &ProjectConfig) -> Result<()> {
    crate::units::ensure_positive(config.frequency_mhz, "frequency").map(|_| ())
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Run the full pipeline for one project: validate, compose both axes and
/// compute the ERP table.
///
/// Callers without a measured pattern for an axis pass
/// [`ElementPattern::uniform`].
pub fn compose_project(
    config: &ProjectConfig,
    h_element: &ElementPattern,
    v_element: &ElementPattern,
) -> Result<ProjectComposition> {
    config.validate()?;
    let horizontal = compose_horizontal(config, h_element)?;
    let vertical = compose_vertical(config, v_element)?;
    let erp = compute_erp(config, &horizontal.pattern, &vertical.pattern)?;
    Ok(ProjectComposition { horizontal, vertical, erp })
}
