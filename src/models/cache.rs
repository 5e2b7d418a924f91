//! Memo tables for per-redshift results.
//!
//! Every model quantity is a pure function of the redshift (and, for
//! dimensional quantities, of `H0`). Results are memoized under a quantized key:
//! the redshift is rounded to 12 decimal digits, so two redshifts that agree to
//! `1e-12` are deliberately treated as the same redshift and share one entry.
//!
//! Tables use interior mutability so evaluation methods can take `&self`. The
//! `RefCell` makes every table (and therefore every model) `!Sync`: a model
//! instance cannot be shared across threads, only moved to one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// Decimal digits kept when quantizing a redshift.
pub const Z_KEY_DIGITS: i32 = 12;

/// Quantized redshift key.
///
/// Holds the bit pattern of `z` rounded to [`Z_KEY_DIGITS`] decimals, so keys
/// stay distinct for arbitrarily large redshifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZKey(u64);

impl ZKey {
    pub fn new(z: f64) -> Self {
        let scale = 10f64.powi(Z_KEY_DIGITS);
        let scaled = z * scale;
        let rounded = if scaled.is_finite() { scaled.round() / scale } else { z };
        // `+ 0.0` folds -0.0 into 0.0.
        let rounded = rounded + 0.0;
        Self(rounded.to_bits())
    }
}

/// Quantized redshift plus the exact bit pattern of `H0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZH0Key {
    z: ZKey,
    h0_bits: u64,
}

impl ZH0Key {
    pub fn new(z: f64, h0: f64) -> Self {
        Self {
            z: ZKey::new(z),
            h0_bits: h0.to_bits(),
        }
    }
}

/// A grow-only memo table.
#[derive(Debug)]
pub struct Memo<K> {
    entries: RefCell<HashMap<K, f64>>,
}

impl<K> Default for Memo<K> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash> Memo<K> {
    pub fn get(&self, key: K) -> Option<f64> {
        self.entries.borrow().get(&key).copied()
    }

    pub fn insert(&self, key: K, value: f64) {
        self.entries.borrow_mut().insert(key, value);
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// No borrow is held while `compute` runs, so `compute` may itself consult
    /// other tables (or this one). Errors are not cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<f64, E>
    where
        F: FnOnce() -> Result<f64, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_redshifts_share_a_key() {
        assert_eq!(ZKey::new(0.1 + 0.2), ZKey::new(0.3));
        assert_eq!(ZKey::new(1.0), ZKey::new(1.0 + 1e-14));
        assert_ne!(ZKey::new(1.0), ZKey::new(1.0 + 1e-11));
        assert_eq!(ZKey::new(-0.0), ZKey::new(0.0));
    }

    #[test]
    fn huge_redshifts_keep_distinct_keys() {
        assert_ne!(ZKey::new(1.0e7), ZKey::new(2.0e7));
        assert_ne!(ZKey::new(1.0e7), ZKey::new(1.0e7 + 1.0));
        assert_ne!(ZKey::new(1.0e300), ZKey::new(2.0e300));
    }

    #[test]
    fn h0_is_part_of_the_dimensional_key() {
        assert_eq!(ZH0Key::new(0.5, 70.0), ZH0Key::new(0.5, 70.0));
        assert_ne!(ZH0Key::new(0.5, 70.0), ZH0Key::new(0.5, 67.4));
    }

    #[test]
    fn memo_computes_once_and_skips_failures() {
        let memo: Memo<ZKey> = Memo::default();
        let mut calls = 0;

        let v = memo
            .get_or_try_insert_with(ZKey::new(2.0), || {
                calls += 1;
                Ok::<_, ()>(4.0)
            })
            .unwrap();
        assert_eq!(v, 4.0);

        let v = memo
            .get_or_try_insert_with(ZKey::new(2.0), || {
                calls += 1;
                Ok::<_, ()>(-1.0)
            })
            .unwrap();
        assert_eq!(v, 4.0);
        assert_eq!(calls, 1);

        assert!(memo.get_or_try_insert_with(ZKey::new(3.0), || Err(())).is_err());
        assert_eq!(memo.len(), 1);
    }
}
