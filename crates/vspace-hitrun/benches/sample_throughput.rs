use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use vspace_geom::{PolyhedralCone, SimplexSolver, UnitBallPolyhedralCone};
use vspace_hitrun::{HitAndRunSampler, SampleSelector, SamplingSession};

fn body(dim: usize) -> UnitBallPolyhedralCone {
    let mut constraints = DMatrix::identity(dim, dim);
    // Tilt the orthant so rounding has something to do.
    for i in 1..dim {
        constraints[(i, 0)] = -0.9;
    }
    let cone = PolyhedralCone::new(constraints, Arc::new(SimplexSolver::default())).unwrap();
    UnitBallPolyhedralCone::new(cone)
}

fn bench_sample(c: &mut Criterion) {
    let body = body(8);
    let selector = SampleSelector::warm_up_and_thin(100, 10).unwrap();

    let plain = HitAndRunSampler::builder(selector).with_seed(1).build().unwrap();
    c.bench_function("hit_and_run_plain_dim8", |b| {
        b.iter(|| {
            let mut session = SamplingSession::stub();
            plain.sample(&body, 16, &mut session).unwrap()
        })
    });

    let rounded = HitAndRunSampler::builder(selector)
        .with_rounding(5_000)
        .with_seed(1)
        .build()
        .unwrap();
    c.bench_function("hit_and_run_rounded_dim8", |b| {
        b.iter(|| {
            let mut session = SamplingSession::stub();
            rounded.sample(&body, 16, &mut session).unwrap()
        })
    });
}

criterion_group!(benches, bench_sample);
criterion_main!(benches);
