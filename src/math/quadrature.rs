//! Adaptive numerical integration.
//!
//! Distances are integrals of `1/E(z)` from 0 to z, where every integrand
//! evaluation costs a root solve. We therefore use a globally adaptive
//! Gauss–Kronrod (7/15) scheme: each panel is evaluated once with 15 nodes,
//! the embedded 7-point Gauss rule provides the error estimate, and the panel
//! with the largest error is bisected until the tolerance is met or the panel
//! budget runs out.
//!
//! The integrand is fallible. An `Err` from any node aborts the integral and is
//! returned unchanged.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Kronrod abscissae on [-1, 1] (non-negative half, descending).
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

/// Kronrod weights matching `XGK`.
const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// Gauss weights for the odd-indexed Kronrod nodes (`XGK[1]`, `XGK[3]`,
/// `XGK[5]`) and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Tolerances and subdivision budget for an adaptive integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTolerance {
    pub abs: f64,
    pub rel: f64,
    /// Maximum number of panels kept at any time.
    pub max_intervals: usize,
}

impl Default for QuadTolerance {
    fn default() -> Self {
        Self {
            abs: 1e-8,
            rel: 1e-6,
            max_intervals: 300,
        }
    }
}

/// Result of an adaptive integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    pub abs_error: f64,
    /// Number of panels in the final partition.
    pub intervals: usize,
    /// Whether the requested tolerance was met within the panel budget.
    pub converged: bool,
}

/// A definite-integral engine.
pub trait Integrator {
    /// Integrate `f` over `[a, b]`.
    fn integrate<F, E>(&self, f: F, a: f64, b: f64, tol: QuadTolerance) -> Result<Quadrature, E>
    where
        F: FnMut(f64) -> Result<f64, E>;
}

/// Globally adaptive Gauss–Kronrod 7/15.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussKronrod;

#[derive(Debug, Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Panel {}

impl PartialOrd for Panel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Panel {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on error; ties broken by position for determinism.
        self.error
            .total_cmp(&other.error)
            .then_with(|| other.a.total_cmp(&self.a))
    }
}

impl Integrator for GaussKronrod {
    fn integrate<F, E>(&self, mut f: F, a: f64, b: f64, tol: QuadTolerance) -> Result<Quadrature, E>
    where
        F: FnMut(f64) -> Result<f64, E>,
    {
        if a == b {
            return Ok(Quadrature {
                value: 0.0,
                abs_error: 0.0,
                intervals: 1,
                converged: true,
            });
        }

        let first = kronrod_panel(&mut f, a, b)?;
        let mut total = first.value;
        let mut total_err = first.error;
        let mut heap = BinaryHeap::with_capacity(tol.max_intervals.max(1));
        heap.push(first);

        let max_intervals = tol.max_intervals.max(1);
        while total_err > tol.abs.max(tol.rel * total.abs()) {
            if heap.len() >= max_intervals {
                break;
            }
            let Some(worst) = heap.pop() else {
                break;
            };

            let mid = 0.5 * (worst.a + worst.b);
            // Stop refining once panels can no longer be split in floating point.
            if mid <= worst.a || mid >= worst.b {
                heap.push(worst);
                break;
            }

            let left = kronrod_panel(&mut f, worst.a, mid)?;
            let right = kronrod_panel(&mut f, mid, worst.b)?;

            total += left.value + right.value - worst.value;
            total_err += left.error + right.error - worst.error;
            heap.push(left);
            heap.push(right);
        }

        // Re-sum from the partition so accumulated update round-off does not
        // leak into the result. Sorting by position keeps the sum deterministic.
        let mut panels = heap.into_vec();
        panels.sort_by(|p, q| p.a.total_cmp(&q.a));
        let value: f64 = panels.iter().map(|p| p.value).sum();
        let abs_error: f64 = panels.iter().map(|p| p.error).sum();
        let converged = abs_error <= tol.abs.max(tol.rel * value.abs());

        Ok(Quadrature {
            value,
            abs_error,
            intervals: panels.len(),
            converged,
        })
    }
}

fn kronrod_panel<F, E>(f: &mut F, a: f64, b: f64) -> Result<Panel, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let fc = f(centre)?;
    let mut kronrod = WGK[7] * fc;
    let mut gauss = WG[3] * fc;

    for (j, (&x, &wk)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
        let dx = half * x;
        let f_sum = f(centre - dx)? + f(centre + dx)?;
        kronrod += wk * f_sum;
        if j % 2 == 1 {
            gauss += WG[j / 2] * f_sum;
        }
    }

    Ok(Panel {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    })
}
