//! Bracketed scalar root finding.
//!
//! The redshift inversion needs to solve `g(w) = 0` on a bounded interval many
//! times (once per distinct redshift, and every quadrature node is a distinct
//! redshift). The solver is kept behind the [`RootFinder`] trait so inversion
//! logic can be tested without caring which bracketed method is used.
//!
//! [`Brent`] drives `argmin`'s `BrentRoot` through an `Executor`: inverse
//! quadratic interpolation or secant steps when they make progress, bisection
//! when they do not.

use std::cell::RefCell;

use argmin::core::{
    CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus,
};
use argmin::solver::brent::BrentRoot;

/// Tolerances and iteration budget for a bracketed solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTolerance {
    /// Absolute tolerance on the root location.
    pub xtol: f64,
    /// Relative tolerance on the root location.
    pub rtol: f64,
    /// Maximum number of iterations before giving up.
    pub max_iter: usize,
}

impl Default for RootTolerance {
    fn default() -> Self {
        Self {
            xtol: 1e-12,
            rtol: 1e-12,
            max_iter: 300,
        }
    }
}

/// Why a bracketed solve failed.
#[derive(Debug, Clone, PartialEq)]
pub enum RootError {
    /// `f(lower)` and `f(upper)` have the same sign (or are not finite).
    NoSignChange {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },
    /// The iteration budget ran out before the tolerance was met.
    NotConverged { iterations: usize, last: f64 },
    /// The underlying solver failed without producing an iterate.
    Solver(String),
}

impl std::fmt::Display for RootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootError::NoSignChange {
                lower,
                upper,
                f_lower,
                f_upper,
            } => write!(
                f,
                "no sign change on [{lower}, {upper}]: f(lower)={f_lower}, f(upper)={f_upper}"
            ),
            RootError::NotConverged { iterations, last } => {
                write!(f, "no convergence after {iterations} iterations (last x={last})")
            }
            RootError::Solver(message) => write!(f, "root solver failed: {message}"),
        }
    }
}

impl std::error::Error for RootError {}

/// A bracketed scalar root finder.
pub trait RootFinder {
    /// Find `x` in `[lower, upper]` with `f(x) = 0`.
    ///
    /// The caller is responsible for supplying a bracket; implementations
    /// must report [`RootError::NoSignChange`] rather than guess.
    fn solve<F>(&self, f: F, lower: f64, upper: f64, tol: RootTolerance) -> Result<f64, RootError>
    where
        F: FnMut(f64) -> f64;
}

/// Brent's method, backed by `argmin`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brent;

/// Adapts a residual closure to `argmin`'s cost interface.
struct Residual<F>(RefCell<F>);

impl<F> CostFunction for Residual<F>
where
    F: FnMut(f64) -> f64,
{
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &f64) -> Result<f64, ArgminError> {
        let mut f = self.0.borrow_mut();
        Ok((*f)(*x))
    }
}

impl RootFinder for Brent {
    fn solve<F>(&self, mut f: F, lower: f64, upper: f64, tol: RootTolerance) -> Result<f64, RootError>
    where
        F: FnMut(f64) -> f64,
    {
        let f_lower = f(lower);
        let f_upper = f(upper);
        let bracketed = f_lower.is_finite() && f_upper.is_finite() && f_lower * f_upper <= 0.0;
        if !bracketed {
            return Err(RootError::NoSignChange {
                lower,
                upper,
                f_lower,
                f_upper,
            });
        }
        if f_lower == 0.0 {
            return Ok(lower);
        }
        if f_upper == 0.0 {
            return Ok(upper);
        }

        // BrentRoot stops once half the bracket is within `tol / 2`.
        let scale = lower.abs().max(upper.abs());
        let solver = BrentRoot::new(lower, upper, tol.xtol + tol.rtol * scale);
        let result = Executor::new(Residual(RefCell::new(f)), solver)
            .configure(|state| state.max_iters(tol.max_iter as u64))
            .run()
            .map_err(|err| RootError::Solver(err.to_string()))?;

        let state = result.state();
        let last = state.get_param().copied().unwrap_or(f64::NAN);
        match state.get_termination_status() {
            TerminationStatus::Terminated(TerminationReason::SolverConverged) => Ok(last),
            _ => Err(RootError::NotConverged {
                iterations: state.get_iter() as usize,
                last,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brent_finds_sqrt_two() {
        let root = Brent
            .solve(|x| x * x - 2.0, 0.0, 2.0, RootTolerance::default())
            .unwrap();
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-11);
    }

    #[test]
    fn brent_handles_reversed_sign_and_steep_functions() {
        // Decreasing function with a root at x = 1.
        let root = Brent
            .solve(|x: f64| (-x).exp() - (-1.0f64).exp(), -5.0, 30.0, RootTolerance::default())
            .unwrap();
        assert!((root - 1.0).abs() < 1e-10);
    }

    #[test]
    fn brent_returns_exact_endpoint_root() {
        let root = Brent
            .solve(|x| x, 0.0, 1.0, RootTolerance::default())
            .unwrap();
        assert_eq!(root, 0.0);
    }

    #[test]
    fn brent_rejects_missing_bracket() {
        let err = Brent
            .solve(|x| x * x + 1.0, -1.0, 1.0, RootTolerance::default())
            .unwrap_err();
        assert!(matches!(err, RootError::NoSignChange { .. }));
    }

    #[test]
    fn brent_reports_exhausted_budget() {
        let tol = RootTolerance {
            xtol: 1e-15,
            rtol: 1e-15,
            max_iter: 2,
        };
        let err = Brent.solve(|x: f64| x.powi(3) - 0.3, 0.0, 10.0, tol).unwrap_err();
        assert!(matches!(err, RootError::NotConverged { iterations: 2, .. }));
    }
}
