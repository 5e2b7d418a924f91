//! Uniform grid generation.
//!
//! The redshift inversion falls back to a deterministic scan when the full
//! interval does not bracket a root. The scan points come from here.

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// Returns an empty vector for `steps == 0` and `[min]` for `steps == 1`.
/// The last point is exactly `max`.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => return Vec::new(),
        1 => return vec![min],
        _ => {}
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps - 1 {
        out.push(min + step * i as f64);
    }
    out.push(max);
    out
}

/// Find the first adjacent pair of grid points whose function values are both
/// finite and bracket a sign change (product `<= 0`).
///
/// Returns `(a, b, f(a), f(b))`.
pub fn first_sign_change<F>(grid: &[f64], mut f: F) -> Option<(f64, f64, f64, f64)>
where
    F: FnMut(f64) -> f64,
{
    let (&first, rest) = grid.split_first()?;
    let mut prev_x = first;
    let mut prev_f = f(first);

    for &x in rest {
        let fx = f(x);
        if prev_f.is_finite() && fx.is_finite() && prev_f * fx <= 0.0 {
            return Some((prev_x, x, prev_f, fx));
        }
        prev_x = x;
        prev_f = fx;
    }
    None
}
