// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Adaptive Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Globally adaptive Gauss-Kronrod quadrature.
//!
//! Each interval is estimated with the 21-point Kronrod rule and its
//! embedded 10-point Gauss rule (QUADPACK `qk21`). The interval with the
//! largest error estimate is bisected until
//!   |error| <= max(epsabs, epsrel * |integral|)
//! or the subinterval limit is reached.
//!
//! Integrands with known kinks (piecewise-linear tables) should be split
//! at the kinks with [`integrate_with_breakpoints`]; the rule is then
//! exact to rounding on each smooth piece.

/// Kronrod abscissae, descending; the last entry is the centre.
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// Kronrod weights matching [`XGK`].
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_208_814_976_375,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// 10-point Gauss weights for the odd-indexed abscissae of [`XGK`].
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    pub epsabs: f64,
    pub epsrel: f64,
    /// Maximum number of subintervals per call.
    pub limit: usize,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            epsabs: 0.0,
            epsrel: 1e-8,
            limit: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadResult {
    pub value: f64,
    pub abs_error: f64,
    pub intervals: usize,
    pub evaluations: usize,
    pub converged: bool,
}

impl QuadResult {
    fn zero() -> Self {
        QuadResult {
            value: 0.0,
            abs_error: 0.0,
            intervals: 0,
            evaluations: 0,
            converged: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// One 21-point Gauss-Kronrod estimate on `[a, b]`: (integral, error).
fn qk21<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64) {
    let centr = 0.5 * (a + b);
    let hlgth = 0.5 * (b - a);
    let dhlgth = hlgth.abs();

    let fc = f(centr);
    let mut resg = 0.0;
    let mut resk = WGK[10] * fc;
    let mut resabs = resk.abs();
    let mut fv1 = [0.0; 10];
    let mut fv2 = [0.0; 10];

    for j in 0..5 {
        let jtw = 2 * j + 1;
        let absc = hlgth * XGK[jtw];
        let f1 = f(centr - absc);
        let f2 = f(centr + absc);
        fv1[jtw] = f1;
        fv2[jtw] = f2;
        resg += WG[j] * (f1 + f2);
        resk += WGK[jtw] * (f1 + f2);
        resabs += WGK[jtw] * (f1.abs() + f2.abs());
    }
    for j in 0..5 {
        let jtwm1 = 2 * j;
        let absc = hlgth * XGK[jtwm1];
        let f1 = f(centr - absc);
        let f2 = f(centr + absc);
        fv1[jtwm1] = f1;
        fv2[jtwm1] = f2;
        resk += WGK[jtwm1] * (f1 + f2);
        resabs += WGK[jtwm1] * (f1.abs() + f2.abs());
    }

    let reskh = resk * 0.5;
    let mut resasc = WGK[10] * (fc - reskh).abs();
    for j in 0..10 {
        resasc += WGK[j] * ((fv1[j] - reskh).abs() + (fv2[j] - reskh).abs());
    }

    let result = resk * hlgth;
    resabs *= dhlgth;
    resasc *= dhlgth;
    let mut abserr = ((resk - resg) * hlgth).abs();
    if resasc != 0.0 && abserr != 0.0 {
        abserr = resasc * (200.0 * abserr / resasc).powf(1.5).min(1.0);
    }
    if resabs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        abserr = abserr.max(50.0 * f64::EPSILON * resabs);
    }
    (result, abserr)
}

/// Adaptive integral of `f` over `[a, b]`.
///
/// `a > b` integrates the reversed interval and negates, `a == b` is 0.
/// Non-convergence is reported through `QuadResult::converged`, never by
/// substituting NaN.
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, cfg: &QuadConfig) -> QuadResult {
    if a == b {
        return QuadResult::zero();
    }
    if a > b {
        let mut r = integrate(f, b, a, cfg);
        r.value = -r.value;
        return r;
    }

    let (value, error) = qk21(&f, a, b);
    let mut intervals = vec![Interval { a, b, value, error }];
    let mut evaluations = 21;
    let limit = cfg.limit.max(1);

    loop {
        let total: f64 = intervals.iter().map(|iv| iv.value).sum();
        let total_err: f64 = intervals.iter().map(|iv| iv.error).sum();
        let tolerance = cfg.epsabs.max(cfg.epsrel * total.abs());

        if total_err <= tolerance {
            return QuadResult {
                value: total,
                abs_error: total_err,
                intervals: intervals.len(),
                evaluations,
                converged: true,
            };
        }

        // Bisect the worst interval.
        let worst = intervals
            .iter()
            .enumerate()
            .max_by(|x, y| x.1.error.total_cmp(&y.1.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let iv = intervals[worst];
        let mid = 0.5 * (iv.a + iv.b);

        // Interval too small to split in floating point.
        let unsplittable = mid <= iv.a || mid >= iv.b;
        if intervals.len() >= limit || unsplittable || !total_err.is_finite() {
            return QuadResult {
                value: total,
                abs_error: total_err,
                intervals: intervals.len(),
                evaluations,
                converged: false,
            };
        }

        let (v1, e1) = qk21(&f, iv.a, mid);
        let (v2, e2) = qk21(&f, mid, iv.b);
        evaluations += 42;
        intervals[worst] = Interval {
            a: iv.a,
            b: mid,
            value: v1,
            error: e1,
        };
        intervals.push(Interval {
            a: mid,
            b: iv.b,
            value: v2,
            error: e2,
        });
    }
}

/// Adaptive integral over `[a, b]` split at every breakpoint inside it.
///
/// Each segment is integrated independently with `cfg` (the absolute
/// tolerance is shared evenly between segments). Values and error
/// estimates are summed left to right.
pub fn integrate_with_breakpoints<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    breakpoints: &[f64],
    cfg: &QuadConfig,
) -> QuadResult {
    if a == b {
        return QuadResult::zero();
    }
    if a > b {
        let mut r = integrate_with_breakpoints(f, b, a, breakpoints, cfg);
        r.value = -r.value;
        return r;
    }

    let mut edges: Vec<f64> = Vec::with_capacity(breakpoints.len() + 2);
    edges.push(a);
    edges.extend(breakpoints.iter().copied().filter(|&p| p > a && p < b));
    edges.push(b);
    edges.sort_by(f64::total_cmp);
    edges.dedup();

    let n_segments = edges.len() - 1;
    let seg_cfg = QuadConfig {
        epsabs: cfg.epsabs / n_segments as f64,
        ..*cfg
    };

    let mut out = QuadResult::zero();
    for w in edges.windows(2) {
        let r = integrate(&f, w[0], w[1], &seg_cfg);
        out.value += r.value;
        out.abs_error += r.abs_error;
        out.intervals += r.intervals;
        out.evaluations += r.evaluations;
        out.converged &= r.converged;
    }
    out
}
