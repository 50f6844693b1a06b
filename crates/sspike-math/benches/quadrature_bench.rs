// -------------------------------------------------------------------------
// SSPIKE Rates -- Quadrature Benchmark
// Linear interpolation on a 501-point fluence grid and adaptive integrals
// of the interpolant with and without grid breakpoints.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array1;
use sspike_math::interp::interp;
use sspike_math::quadrature::{integrate, integrate_with_breakpoints, QuadConfig};
use std::hint::black_box;

fn bench_interp_501(c: &mut Criterion) {
    let xp = Array1::linspace(0.0, 0.1, 501);
    let fp = xp.mapv(|e: f64| 1e10 * (e * 1e3).powi(2) * (-e * 1e3 / 4.0).exp());

    c.bench_function("interp_501", |b| {
        b.iter(|| interp(black_box(0.0123), xp.view(), fp.view()))
    });
}

fn bench_table_integrals(c: &mut Criterion) {
    let xp = Array1::linspace(0.0, 0.1, 501);
    let fp = xp.mapv(|e: f64| 1e10 * (e * 1e3).powi(2) * (-e * 1e3 / 4.0).exp());
    let cfg = QuadConfig::default();

    let mut group = c.benchmark_group("fluence_integral_501");
    group.bench_function("adaptive_plain", |b| {
        b.iter(|| {
            let r = integrate(|x| interp(x, xp.view(), fp.view()), 0.005, 0.1, &cfg);
            black_box(r.value);
        })
    });
    group.bench_function("adaptive_breakpoints", |b| {
        b.iter(|| {
            let r = integrate_with_breakpoints(
                |x| interp(x, xp.view(), fp.view()),
                0.005,
                0.1,
                xp.as_slice().unwrap_or(&[]),
                &cfg,
            );
            black_box(r.value);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_interp_501, bench_table_integrals);
criterion_main!(benches);
