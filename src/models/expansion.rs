//! Dimensionless expansion rate `E(z) = H(z)/H0` under PX1.
//!
//! Given `w = w_emit(z)`:
//!
//! ```text
//! E = (2 tan w + sec² w) / (exp(tan w) · sec² w)
//! ```
//!
//! Numerical notes:
//! - The exponent is clamped to `[-700, 700]` so `exp` cannot overflow.
//! - Degenerate points (vanishing `cos w`, non-finite or non-positive `E`) are
//!   not errors. They evaluate to `+∞`, which callers treat as "no
//!   contribution" (e.g. `1/E = 0` inside distance integrals).

use crate::error::ModelError;
use crate::math::{Brent, RootFinder};
use crate::models::cache::{Memo, ZH0Key, ZKey};
use crate::models::inversion::RedshiftInverter;

/// Clamp applied to `tan w` before exponentiation.
pub const EXP_CLIP: f64 = 700.0;

/// `E` as a function of the emission parameter `w`.
pub fn expansion_at(w: f64) -> f64 {
    let c = w.cos();
    if c == 0.0 || !c.is_finite() {
        return f64::INFINITY;
    }
    let sec2 = 1.0 / (c * c);
    let t = w.tan();
    let num = 2.0 * t + sec2;
    let den = t.clamp(-EXP_CLIP, EXP_CLIP).exp() * sec2;
    let e = num / den;
    if e.is_finite() && e > 0.0 { e } else { f64::INFINITY }
}

/// Memoized `E(z)` and `H(z)` on top of a [`RedshiftInverter`].
#[derive(Debug, Default)]
pub struct ExpansionModel<R = Brent> {
    inverter: RedshiftInverter<R>,
    e_cache: Memo<ZKey>,
    h_cache: Memo<ZH0Key>,
}

impl<R: RootFinder> ExpansionModel<R> {
    pub fn new(inverter: RedshiftInverter<R>) -> Self {
        Self {
            inverter,
            e_cache: Memo::default(),
            h_cache: Memo::default(),
        }
    }

    pub fn inverter(&self) -> &RedshiftInverter<R> {
        &self.inverter
    }

    /// `E(z)`; `+∞` marks a degenerate point.
    pub fn expansion_rate(&self, z: f64) -> Result<f64, ModelError> {
        // Validate before touching the cache so a NaN never becomes a key.
        let w = self.inverter.w_emit(z)?;
        self.e_cache
            .get_or_try_insert_with(ZKey::new(z), || Ok(expansion_at(w)))
    }

    pub fn expansion_rate_many(&self, zs: &[f64]) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.expansion_rate(z)).collect()
    }

    /// `H(z) = H0 · E(z)` in km/s/Mpc.
    pub fn hubble(&self, z: f64, h0: f64) -> Result<f64, ModelError> {
        let e = self.expansion_rate(z)?;
        self.h_cache
            .get_or_try_insert_with(ZH0Key::new(z, h0), || Ok(h0 * e))
    }

    pub fn hubble_many(&self, zs: &[f64], h0: f64) -> Result<Vec<f64>, ModelError> {
        zs.iter().map(|&z| self.hubble(z, h0)).collect()
    }

    /// Sizes of the `(w, E, H)` memo tables.
    pub fn cached(&self) -> (usize, usize, usize) {
        (self.inverter.cached(), self.e_cache.len(), self.h_cache.len())
    }
}
