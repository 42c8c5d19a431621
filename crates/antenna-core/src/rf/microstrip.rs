//! Microstrip width synthesis (Hammerstad & Jensen).
//!
//! Effective permittivity for u = W/h:
//!
//!   ε_eff = (εr+1)/2 + (εr−1)/2 · (1/√(1 + 12/u) + 0.04·(1−u)²)   u ≤ 1
//!   ε_eff = (εr+1)/2 + (εr−1)/2 · 1/√(1 + 12/u)                    u > 1
//!
//! Conductor thickness widens the strip by
//!
//!   Δu = (t/h)/π · (1 + 1/ε_eff) · ln(1 + 4e / ((t/h)·coth√(6.517·u)))
//!
//! and the two are iterated to a fixed point before evaluating
//!
//!   Z0 = 60/√ε_eff · ln(8/u + u/4)                                u ≤ 1
//!   Z0 = 120π / (√ε_eff · (u + 1.393 + 0.667·ln(u + 1.444)))      u > 1
//!
//! Z0 falls monotonically with u, so the width is found by bracketing and
//! bisection.

use std::f64::consts::{E, PI};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RfError};
use crate::units::ensure_positive;

const FIXED_POINT_ITERATIONS: usize = 3;
const FIXED_POINT_TOL: f64 = 1e-6;
const U_MIN: f64 = 1e-4;
const U_MAX: f64 = 1e5;
const MAX_DOUBLINGS: usize = 40;
const BISECTION_STEPS: usize = 80;
const BISECTION_TOL: f64 = 1e-6;
/// Final relative impedance error above which synthesis is reported as failed.
const CONVERGENCE_TOL: f64 = 1e-4;
/// W/h range over which the closed forms are accurate.
const VALID_U: (f64, f64) = (0.1, 20.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrostripResult {
    pub width_m: f64,
    pub width_over_height: f64,
    pub effective_eps: f64,
    pub impedance_ohms: f64,
    pub warnings: Vec<String>,
}

fn effective_eps(eps_r: f64, u: f64) -> f64 {
    let u = u.max(1e-12);
    let mut term = 1.0 / (1.0 + 12.0 / u).sqrt();
    if u <= 1.0 {
        term += 0.04 * (1.0 - u).powi(2);
    }
    (eps_r + 1.0) / 2.0 + (eps_r - 1.0) / 2.0 * term
}

fn thickness_correction(u: f64, t_h: f64, eps_eff: f64) -> f64 {
    if t_h <= 0.0 {
        return 0.0;
    }
    let x = (6.517 * u.max(1e-9)).sqrt();
    // tanh saturates long before x = 20.
    let mut tanh = if x < 20.0 { x.tanh() } else { 1.0 };
    if tanh == 0.0 {
        tanh = 1e-9;
    }
    (t_h / PI) * (1.0 + 1.0 / eps_eff) * (1.0 + 4.0 * E / (t_h / tanh)).ln()
}

/// Characteristic impedance at width ratio `u`: (Z0, ε_eff, u_eff).
fn characteristic_impedance(eps_r: f64, u: f64, t_h: f64) -> (f64, f64, f64) {
    let mut eps = effective_eps(eps_r, u);
    let mut u_eff = u;
    let mut converged = false;
    for _ in 0..FIXED_POINT_ITERATIONS {
        u_eff = u + thickness_correction(u, t_h, eps);
        let next = effective_eps(eps_r, u_eff);
        let delta = (next - eps).abs();
        eps = next;
        if delta < FIXED_POINT_TOL {
            converged = true;
            break;
        }
    }
    if !converged {
        u_eff = u + thickness_correction(u, t_h, eps);
    }

    let z0 = if u_eff <= 1.0 {
        60.0 / eps.sqrt() * (8.0 / u_eff + 0.25 * u_eff).ln()
    } else {
        120.0 * PI / (eps.sqrt() * (u_eff + 1.393 + 0.667 * (u_eff + 1.444).ln()))
    };
    (z0, eps, u_eff)
}

/// Strip width giving `impedance_ohms` on a substrate of relative
/// permittivity `eps_r`, height `substrate_height_m` and copper thickness
/// `conductor_thickness_m` (negative thickness is treated as zero).
pub fn width_for_impedance(
    impedance_ohms: f64,
    eps_r: f64,
    substrate_height_m: f64,
    conductor_thickness_m: f64,
) -> Result<MicrostripResult> {
    let target = ensure_positive(impedance_ohms, "Z0")?;
    let eps_r = ensure_positive(eps_r, "εr")?;
    let h = ensure_positive(substrate_height_m, "substrate height")?;
    let t_h = conductor_thickness_m.max(0.0) / h;
    let z_at = |u: f64| characteristic_impedance(eps_r, u, t_h);

    let mut u_low = U_MIN;
    let (z_low, eps_low, ueff_low) = z_at(u_low);
    if z_low < target {
        return Err(RfError::Unreachable(format!(
            "{target} Ω exceeds the {z_low:.1} Ω reachable at W/h = {U_MIN}"
        )));
    }

    let mut u_high = 1.0;
    let mut z_high = z_at(u_high).0;
    let mut doublings = 0;
    while z_high > target && doublings < MAX_DOUBLINGS {
        u_high *= 2.0;
        z_high = z_at(u_high).0;
        doublings += 1;
        if u_high > U_MAX {
            return Err(RfError::Unreachable(format!(
                "{target} Ω needs a strip wider than {U_MAX}·h"
            )));
        }
    }

    let (mut u_mid, mut z_mid) = (u_high, z_high);
    let (mut solution_eps, mut solution_ueff) = (eps_low, ueff_low);
    for _ in 0..BISECTION_STEPS {
        u_mid = 0.5 * (u_low + u_high);
        let (z, eps, ueff) = z_at(u_mid);
        z_mid = z;
        solution_eps = eps;
        solution_ueff = ueff;
        if ((z - target) / target).abs() < BISECTION_TOL {
            break;
        }
        if z > target {
            u_low = u_mid;
        } else {
            u_high = u_mid;
        }
    }

    let error = ((z_mid - target) / target).abs();
    if error > CONVERGENCE_TOL {
        return Err(RfError::Unreachable(format!(
            "bisection stopped at {z_mid:.3} Ω for a {target} Ω target"
        )));
    }
    debug!("microstrip {target} Ω: W/h = {u_mid:.5}, ε_eff = {solution_eps:.4}");

    let mut warnings = Vec::new();
    if solution_ueff < VALID_U.0 || solution_ueff > VALID_U.1 {
        warn!("microstrip W/h {solution_ueff:.3} outside the model's validity range");
        warnings.push(format!(
            "W/h = {solution_ueff:.3} is outside the {}–{} range of the Hammerstad model; \
             expect larger error",
            VALID_U.0, VALID_U.1
        ));
    }

    Ok(MicrostripResult {
        width_m: u_mid * h,
        width_over_height: u_mid,
        effective_eps: solution_eps,
        impedance_ohms: target,
        warnings,
    })
}
