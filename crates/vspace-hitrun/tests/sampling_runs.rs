use std::sync::Arc;

use nalgebra::DMatrix;
use proptest::prelude::*;
use vspace_core::{Point, RngHandle, VsError};
use vspace_geom::{
    ConvexBody, PolyhedralCone, SimplexSolver, UnitBallPolyhedralCone, UnitSpherePolyhedralCone,
};
use vspace_hitrun::{HitAndRunSampler, SampleSelector, SamplingSession};

fn solver() -> Arc<SimplexSolver> {
    Arc::new(SimplexSolver::default())
}

fn orthant(dim: usize) -> PolyhedralCone {
    PolyhedralCone::new(DMatrix::identity(dim, dim), solver()).unwrap()
}

/// Cone of hypotheses agreeing with labels drawn from a hidden hyperplane.
fn labeled_cone(seed: u64, dim: usize, count: usize) -> PolyhedralCone {
    let mut rng = RngHandle::from_seed(seed);
    let hidden = Point::from_fn(dim, |_, _| rng.gaussian());
    let mut points = Vec::new();
    let mut labels = Vec::new();
    while points.len() < count {
        let x = Point::from_fn(dim, |_, _| rng.gaussian());
        let margin = hidden.dot(&x) / hidden.norm();
        if margin.abs() < 0.1 {
            continue;
        }
        labels.push(margin > 0.0);
        points.push(x);
    }
    PolyhedralCone::from_labeled_points(&points, &labels, solver()).unwrap()
}

#[test]
fn every_sample_lies_inside_ball_cone() {
    let body = UnitBallPolyhedralCone::new(labeled_cone(17, 4, 10));
    let selectors = [
        SampleSelector::warm_up_and_thin(20, 5).unwrap(),
        SampleSelector::independent_chains(15).unwrap(),
    ];
    for selector in selectors {
        for rounding in [false, true] {
            let mut builder = HitAndRunSampler::builder(selector).with_seed(3);
            if rounding {
                builder = builder.with_rounding(1_000);
            }
            let sampler = builder.build().unwrap();
            let samples = sampler
                .sample(&body, 25, &mut SamplingSession::stub().add_sample_cache())
                .unwrap();
            assert_eq!(samples.len(), 25);
            assert!(samples.iter().all(|s| body.is_inside(s)));
        }
    }
}

#[test]
fn every_sample_lies_on_sphere_cone() {
    let body = UnitSpherePolyhedralCone::new(labeled_cone(5, 3, 8));
    let sampler = HitAndRunSampler::builder(SampleSelector::warm_up_and_thin(10, 2).unwrap())
        .build()
        .unwrap();
    let samples = sampler
        .sample(&body, 30, &mut SamplingSession::stub())
        .unwrap();
    assert!(samples.iter().all(|s| body.is_inside(s)));
}

#[test]
fn rounding_a_sphere_body_is_a_configuration_error() {
    let body = UnitSpherePolyhedralCone::new(orthant(3));
    let sampler = HitAndRunSampler::builder(SampleSelector::independent_chains(5).unwrap())
        .with_rounding(100)
        .build()
        .unwrap();
    let err = sampler
        .sample(&body, 3, &mut SamplingSession::stub())
        .unwrap_err();
    assert!(matches!(err, VsError::Configuration(_)));
}

#[test]
fn single_point_body_is_degenerate() {
    // x >= 0 and -x >= 0 leave only the origin.
    let body = PolyhedralCone::new(DMatrix::from_row_slice(2, 1, &[1.0, -1.0]), solver()).unwrap();
    let sampler = HitAndRunSampler::builder(SampleSelector::warm_up_and_thin(10, 1).unwrap())
        .build()
        .unwrap();

    let mut session = SamplingSession::stub().add_sample_cache();
    session
        .sample_cache_mut()
        .unwrap()
        .update_cache(&[Point::zeros(1)]);
    let err = sampler.sample(&body, 3, &mut session).unwrap_err();
    assert!(matches!(err, VsError::DegenerateGeometry(_)), "{err:?}");

    let err = sampler
        .sample(&body, 3, &mut SamplingSession::stub())
        .unwrap_err();
    assert!(matches!(err, VsError::InfeasibleRegion(_)), "{err:?}");
}

#[test]
fn zero_samples_are_rejected() {
    let body = UnitBallPolyhedralCone::new(orthant(2));
    let sampler = HitAndRunSampler::builder(SampleSelector::default())
        .build()
        .unwrap();
    let mut session = SamplingSession::stub();
    let err = sampler.sample(&body, 0, &mut session).unwrap_err();
    assert!(matches!(err, VsError::Configuration(_)));
    assert_eq!(session.calls(), 0);
}

#[test]
fn session_carries_samples_into_next_call() {
    let body = UnitBallPolyhedralCone::new(orthant(2));
    let sampler = HitAndRunSampler::builder(SampleSelector::warm_up_and_thin(5, 5).unwrap())
        .build()
        .unwrap();
    let mut session = SamplingSession::stub().add_sample_cache();
    let samples = sampler.sample(&body, 4, &mut session).unwrap();
    assert_eq!(session.sample_cache().unwrap().points(), samples.as_slice());

    // One more label, one more dimension: the cached points are padded and
    // checked against the new body.
    let grown = UnitBallPolyhedralCone::new(orthant(3));
    let next = sampler.sample(&grown, 4, &mut session).unwrap();
    assert!(next.iter().all(|s| grown.is_inside(s) && s.len() == 3));
    assert_eq!(session.calls(), 2);
}

#[test]
fn ellipsoid_cache_follows_growing_dimension() {
    let sampler = HitAndRunSampler::builder(SampleSelector::independent_chains(10).unwrap())
        .with_rounding(2_000)
        .build()
        .unwrap();
    let mut session = SamplingSession::stub().add_sample_cache().add_rounding_cache();

    for dim in 2..5 {
        let body = UnitBallPolyhedralCone::new(orthant(dim));
        let samples = sampler.sample(&body, 6, &mut session).unwrap();
        assert!(samples.iter().all(|s| body.is_inside(s)));
        let cached = session.ellipsoid_cache().unwrap().ellipsoid().unwrap();
        assert_eq!(cached.dim(), dim);
    }
}

#[test]
fn parallel_chains_match_sequential_chains() {
    let body = UnitBallPolyhedralCone::new(labeled_cone(8, 3, 6));
    let selector = SampleSelector::independent_chains(12).unwrap();
    let run = |threads: usize| {
        let sampler = HitAndRunSampler::builder(selector)
            .with_threads(threads)
            .with_seed(77)
            .build()
            .unwrap();
        let mut session = SamplingSession::stub().add_sample_cache();
        let first = sampler.sample(&body, 8, &mut session).unwrap();
        let second = sampler.sample(&body, 8, &mut session).unwrap();
        (first, second)
    };
    let sequential = run(1);
    assert_eq!(sequential, run(4));
    assert_ne!(sequential.0, sequential.1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn random_version_spaces_are_sampled_soundly(seed in any::<u64>(), dim in 2usize..5, count in 1usize..10) {
        let body = UnitBallPolyhedralCone::new(labeled_cone(seed, dim, count));
        let sampler = HitAndRunSampler::builder(SampleSelector::warm_up_and_thin(10, 3).unwrap())
            .with_seed(seed)
            .build()
            .unwrap();
        let samples = sampler.sample(&body, 10, &mut SamplingSession::stub()).unwrap();
        prop_assert!(samples.iter().all(|s| body.is_inside(s)));
    }
}
