// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Interpolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Piecewise-linear interpolation and uniform grid builders.
//!
//! Semantics follow `numpy.interp`, `numpy.linspace` and `numpy.arange`
//! so tabulated results line up bin for bin with reference outputs.

use ndarray::{Array1, ArrayView1};

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be strictly increasing and the same length as `fp`.
/// Outside `[xp[0], xp[n-1]]` the nearest endpoint value is returned;
/// there is no extrapolation.
pub fn interp(x: f64, xp: ArrayView1<f64>, fp: ArrayView1<f64>) -> f64 {
    debug_assert!(!xp.is_empty(), "interp requires a non-empty table");
    debug_assert_eq!(xp.len(), fp.len(), "interp requires xp and fp of equal length");

    let n = xp.len();
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // Largest i with xp[i] <= x; x is strictly inside so 0 <= i < n-1.
    let mut lo = 0usize;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xp[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let t = (x - xp[lo]) / (xp[hi] - xp[lo]);
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// [`interp`] applied to every element of `x`.
pub fn interp_many(x: ArrayView1<f64>, xp: ArrayView1<f64>, fp: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(|xi| interp(xi, xp, fp))
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, stop, n)
}

/// Points `start + i·step` for `i = 0, 1, ...` strictly below `stop`.
///
/// The bin count absorbs the rounding of `(stop - start) / step` so
/// `arange(1e-4, 0.0176, 1e-4)` has 175 points, as numpy produces.
pub fn arange(start: f64, stop: f64, step: f64) -> Array1<f64> {
    debug_assert!(step > 0.0, "arange requires step > 0, got {step}");
    let span = (stop - start) / step;
    if !(span > 0.0) {
        return Array1::zeros(0);
    }
    let n = (span - 1e-9).ceil().max(0.0) as usize;
    Array1::from_shape_fn(n, |i| start + i as f64 * step)
}
