//! Flat-geometry distances from the PX1 expansion rate.
//!
//! ```text
//! D_M(z) = (c/H0) ∫₀^z dz'/E(z')
//! D_L(z) = (1+z) D_M(z)
//! D_A(z) = D_M(z) / (1+z)
//! ```
//!
//! All three return exactly `0.0` for `z <= 0` without integrating. The
//! integrand treats the infinite-`E` sentinel (and any non-positive `E`) as a
//! zero contribution instead of letting it poison the integral.

use crate::domain::C_KM_S;
use crate::error::ModelError;
use crate::math::{Brent, GaussKronrod, Integrator, QuadTolerance, RootFinder};
use crate::models::cache::{Memo, ZH0Key};
use crate::models::expansion::ExpansionModel;

/// Comoving, luminosity and angular-diameter distances in Mpc.
#[derive(Debug, Default)]
pub struct DistanceEngine<R = Brent, I = GaussKronrod> {
    expansion: ExpansionModel<R>,
    integrator: I,
    tol: QuadTolerance,
    dm_cache: Memo<ZH0Key>,
    dl_cache: Memo<ZH0Key>,
}

impl<R: RootFinder, I: Integrator> DistanceEngine<R, I> {
    pub fn new(expansion: ExpansionModel<R>, integrator: I, tol: QuadTolerance) -> Self {
        Self {
            expansion,
            integrator,
            tol,
            dm_cache: Memo::default(),
            dl_cache: Memo::default(),
        }
    }

    pub fn expansion(&self) -> &ExpansionModel<R> {
        &self.expansion
    }

    /// `1/E(z)`, or `0` where `E` is degenerate.
    pub fn inverse_expansion(&self, z: f64) -> Result<f64, ModelError> {
        let e = self.expansion.expansion_rate(z)?;
        if e.is_finite() && e > 0.0 {
            Ok(1.0 / e)
        } else {
            Ok(0.0)
        }
    }

    /// Transverse comoving distance `D_M(z)`.
    pub fn comoving_angular_distance(&self, z: f64, h0: f64) -> Result<f64, ModelError> {
        if z <= 0.0 {
            return Ok(0.0);
        }
        self.dm_cache.get_or_try_insert_with(ZH0Key::new(z, h0), || {
            let quad = self
                .integrator
                .integrate(|zp| self.inverse_expansion(zp), 0.0, z, self.tol)?;
            if !quad.converged {
                tracing::warn!(
                    z,
                    value = quad.value,
                    abs_error = quad.abs_error,
                    intervals = quad.intervals,
                    "D_M integral hit its subdivision budget before meeting tolerance"
                );
            }
            Ok((C_KM_S / h0) * quad.value)
        })
    }

    /// Luminosity distance `D_L(z) = (1+z) D_M(z)`.
    pub fn luminosity_distance(&self, z: f64, h0: f64) -> Result<f64, ModelError> {
        if z <= 0.0 {
            return Ok(0.0);
        }
        self.dl_cache.get_or_try_insert_with(ZH0Key::new(z, h0), || {
            Ok((1.0 + z) * self.comoving_angular_distance(z, h0)?)
        })
    }

    /// Angular-diameter distance `D_A(z) = D_M(z)/(1+z)`. Not memoized.
    pub fn angular_diameter_distance(&self, z: f64, h0: f64) -> Result<f64, ModelError> {
        if z <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.comoving_angular_distance(z, h0)? / (1.0 + z))
    }

    pub fn comoving_angular_distance_many(&self, zs: &[f64], h0: f64) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.comoving_angular_distance(z, h0)).collect()
    }

    pub fn luminosity_distance_many(&self, zs: &[f64], h0: f64) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.luminosity_distance(z, h0)).collect()
    }

    pub fn angular_diameter_distance_many(&self, zs: &[f64], h0: f64) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.angular_diameter_distance(z, h0)).collect()
    }

    /// Sizes of the `(D_M, D_L)` memo tables.
    pub fn cached(&self) -> (usize, usize) {
        (self.dm_cache.len(), self.dl_cache.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H0: f64 = 70.0;

    fn engine() -> DistanceEngine {
        DistanceEngine::default()
    }

    #[test]
    fn non_positive_redshift_is_exactly_zero() {
        let d = engine();
        assert_eq!(d.comoving_angular_distance(0.0, H0).unwrap(), 0.0);
        assert_eq!(d.luminosity_distance(-1.0, H0).unwrap(), 0.0);
        assert_eq!(d.angular_diameter_distance(-0.2, H0).unwrap(), 0.0);
        assert_eq!(d.cached(), (0, 0));
        assert_eq!(d.expansion().cached(), (0, 0, 0));
    }

    #[test]
    fn small_z_recovers_hubble_law() {
        let d = engine();
        let z = 0.01;
        let slope = d.luminosity_distance(z, H0).unwrap() / z;
        let target = C_KM_S / H0;
        assert!(
            ((slope - target) / target).abs() < 0.03,
            "D_L/z={slope}, c/H0={target}"
        );
    }

    #[test]
    fn comoving_distance_is_strictly_increasing() {
        let d = engine();
        let zs = [0.001, 0.01, 0.1, 0.35, 0.57, 1.0, 1.5, 3.0, 10.0, 100.0, 1090.0];
        let dm = d.comoving_angular_distance_many(&zs, H0).unwrap();
        for pair in dm.windows(2) {
            assert!(pair[0] < pair[1], "{pair:?}");
        }
    }

    #[test]
    fn distance_relations_hold() {
        let d = engine();
        let z = 0.8;
        let dm = d.comoving_angular_distance(z, H0).unwrap();
        assert_eq!(d.luminosity_distance(z, H0).unwrap(), (1.0 + z) * dm);
        assert_eq!(d.angular_diameter_distance(z, H0).unwrap(), dm / (1.0 + z));
    }

    #[test]
    fn distances_scale_inversely_with_h0() {
        let d = engine();
        let a = d.comoving_angular_distance(0.5, 70.0).unwrap();
        let b = d.comoving_angular_distance(0.5, 35.0).unwrap();
        assert!((b / a - 2.0).abs() < 1e-12);
        assert_eq!(d.cached(), (2, 0));
    }

    #[test]
    fn cold_and_warm_calls_agree_bit_for_bit() {
        let cold = engine();
        let first = cold.luminosity_distance(1.2, H0).unwrap();
        let second = cold.luminosity_distance(1.2, H0).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());

        let fresh = engine().luminosity_distance(1.2, H0).unwrap();
        assert_eq!(first.to_bits(), fresh.to_bits());
    }

    #[test]
    fn adaptive_quadrature_matches_fine_trapezoid() {
        // Independent check: a fine fixed-step trapezoid over the same integrand.
        let d = engine();
        let z_max = 1.0;
        let n = 20_000;
        let h = z_max / n as f64;
        let mut acc = 0.0;
        for i in 0..=n {
            let z = i as f64 * h;
            let weight = if i == 0 || i == n { 0.5 } else { 1.0 };
            acc += weight * d.inverse_expansion(z).unwrap();
        }
        let trapezoid = (C_KM_S / H0) * acc * h;
        let adaptive = d.comoving_angular_distance(z_max, H0).unwrap();
        assert!(((adaptive - trapezoid) / trapezoid).abs() < 1e-5);
    }

    #[test]
    fn nan_redshift_propagates_domain_error() {
        let d = engine();
        assert!(matches!(
            d.comoving_angular_distance(f64::NAN, H0),
            Err(ModelError::Domain { .. })
        ));
    }
}
