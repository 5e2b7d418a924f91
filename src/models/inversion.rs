//! PX1 redshift inversion: solve for the emission parameter `w` given `z`.
//!
//! The PX1 mapping relates redshift and the parametric variable through
//!
//! ```text
//! (1 + z) = sec²(w) · exp(tan w),   w ∈ (−π/2, π/2)
//! ```
//!
//! which we solve in log form, `g(w) = ln(1+z) − [ln(sec² w) + tan w] = 0`.
//! The bracket term `ln(sec² w) + tan w` has derivative `(1 + tan w)²`, so it is
//! non-decreasing and the root is unique. `sec² w` diverges at the interval
//! ends, so the search interval is trimmed by `BOUNDARY_EPS` on each side.

use std::f64::consts::FRAC_PI_2;

use crate::error::ModelError;
use crate::math::{Brent, RootError, RootFinder, RootTolerance, first_sign_change, linspace};
use crate::models::cache::{Memo, ZKey};

/// Margin kept away from `±π/2`, where `sec² w` diverges.
pub const BOUNDARY_EPS: f64 = 1e-9;

/// Number of points in the fallback bracketing scan.
pub const SCAN_POINTS: usize = 2001;

/// Last-resort bracket. Empirical; never reached while the trimmed interval brackets.
pub const FALLBACK_BRACKET: (f64, f64) = (-1.45, 1.45);

/// Residual of the PX1 relation in log form.
///
/// Returns `+∞` where `cos w` vanishes or is not finite.
pub fn px1_residual(ln1pz: f64, w: f64) -> f64 {
    let c = w.cos();
    if !c.is_finite() || c == 0.0 {
        return f64::INFINITY;
    }
    let ln_sec2 = -2.0 * c.abs().ln();
    ln1pz - (ln_sec2 + w.tan())
}

/// Reconstruct `1 + z` from `w` via the forward mapping.
pub fn one_plus_z(w: f64) -> f64 {
    let c = w.cos();
    w.tan().exp() / (c * c)
}

/// Solves the PX1 relation per redshift, memoizing by quantized `z`.
#[derive(Debug, Default)]
pub struct RedshiftInverter<R = Brent> {
    finder: R,
    tol: RootTolerance,
    cache: Memo<ZKey>,
}

impl<R: RootFinder> RedshiftInverter<R> {
    pub fn new(finder: R, tol: RootTolerance) -> Self {
        Self {
            finder,
            tol,
            cache: Memo::default(),
        }
    }

    /// Emission parameter `w` for redshift `z`.
    ///
    /// `z = 0` maps to `w = 0` exactly without a solve.
    pub fn w_emit(&self, z: f64) -> Result<f64, ModelError> {
        if !(z.is_finite() && z >= 0.0) {
            return Err(ModelError::Domain { z });
        }
        self.cache.get_or_try_insert_with(ZKey::new(z), || {
            if z == 0.0 {
                return Ok(0.0);
            }
            self.solve(z)
        })
    }

    /// Element-wise [`Self::w_emit`], preserving order.
    pub fn w_emit_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.w_emit(z)).collect()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn solve(&self, z: f64) -> Result<f64, ModelError> {
        let ln1pz = z.ln_1p();
        let g = |w: f64| px1_residual(ln1pz, w);

        let (lower, upper) = bracket(z, g)?;
        self.finder
            .solve(g, lower, upper, self.tol)
            .map_err(|err| match err {
                RootError::NoSignChange { f_lower, f_upper, .. } => ModelError::RootBracketing {
                    z,
                    g_lower: f_lower,
                    g_upper: f_upper,
                },
                RootError::NotConverged { iterations, .. } => {
                    ModelError::RootConvergence { z, iterations }
                }
                RootError::Solver(message) => {
                    tracing::warn!(z, %message, "w_emit solver failed");
                    ModelError::RootConvergence { z, iterations: 0 }
                }
            })
    }
}

/// Pick a bracket for `g`, trying in order: the full trimmed interval, the first
/// sign change on a uniform scan, and the fixed fallback bracket.
fn bracket<G>(z: f64, g: G) -> Result<(f64, f64), ModelError>
where
    G: Fn(f64) -> f64,
{
    let a = -FRAC_PI_2 + BOUNDARY_EPS;
    let b = FRAC_PI_2 - BOUNDARY_EPS;
    if brackets(g(a), g(b)) {
        return Ok((a, b));
    }

    let grid = linspace(a, b, SCAN_POINTS);
    if let Some((lo, hi, _, _)) = first_sign_change(&grid, &g) {
        tracing::debug!(z, lo, hi, "w_emit bracket found by scan");
        return Ok((lo, hi));
    }

    let (lo, hi) = FALLBACK_BRACKET;
    let (g_lower, g_upper) = (g(lo), g(hi));
    if brackets(g_lower, g_upper) {
        tracing::debug!(z, "w_emit using fallback bracket");
        return Ok((lo, hi));
    }

    Err(ModelError::RootBracketing {
        z,
        g_lower,
        g_upper,
    })
}

fn brackets(g_lower: f64, g_upper: f64) -> bool {
    g_lower.is_finite() && g_upper.is_finite() && g_lower * g_upper <= 0.0
}
