use tracing::{debug, warn};
use vspace_core::{resize, Point, VsError};
use vspace_geom::ConvexBody;
use vspace_round::Ellipsoid;

use crate::config::CacheConfig;

/// A body together with an optional known interior point.
///
/// When the point is present the chain starts there and the body's own
/// (linear-programming) interior point search is skipped.
#[derive(Clone)]
pub struct PreparedBody<'a> {
    body: &'a dyn ConvexBody,
    interior_point: Option<Point>,
}

impl<'a> PreparedBody<'a> {
    /// Wraps `body` without an override.
    pub fn new(body: &'a dyn ConvexBody) -> Self {
        Self {
            body,
            interior_point: None,
        }
    }

    /// Wraps `body` with a known interior point.
    pub fn with_interior_point(body: &'a dyn ConvexBody, point: Point) -> Self {
        Self {
            body,
            interior_point: Some(point),
        }
    }

    /// Underlying body.
    pub fn body(&self) -> &'a dyn ConvexBody {
        self.body
    }

    /// The override, if any.
    pub fn cached_interior_point(&self) -> Option<&Point> {
        self.interior_point.as_ref()
    }

    /// Replaces the override.
    pub fn set_interior_point(&mut self, point: Point) {
        self.interior_point = Some(point);
    }

    /// The override, or the body's own interior point.
    pub fn interior_point(&self) -> Result<Point, VsError> {
        match &self.interior_point {
            Some(point) => Ok(point.clone()),
            None => self.body.interior_point(),
        }
    }
}

/// Points from the previous batch, reused as starting points.
#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    points: Vec<Point>,
}

impl SampleCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns `body` with the first cached point (resized to the body's
    /// dimension) that lies inside it, or `body` unchanged on a miss.
    pub fn attempt_to_set_default_interior_point<'a>(
        &self,
        body: &'a dyn ConvexBody,
    ) -> PreparedBody<'a> {
        let dim = body.dim();
        self.points
            .iter()
            .map(|point| resize(point, dim))
            .find(|point| body.is_inside(point))
            .map_or_else(
                || PreparedBody::new(body),
                |point| PreparedBody::with_interior_point(body, point),
            )
    }

    /// Replaces the cache contents with the latest batch.
    pub fn update_cache(&mut self, samples: &[Point]) {
        self.points = samples.to_vec();
    }
}

/// Last fitted rounding ellipsoid.
#[derive(Debug, Clone, Default)]
pub struct EllipsoidCache {
    ellipsoid: Option<Ellipsoid>,
}

impl EllipsoidCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached ellipsoid.
    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        self.ellipsoid.as_ref()
    }

    /// Warm start for a body of dimension `dim`.
    ///
    /// A body one dimension larger gets the cached ellipsoid lifted by one
    /// axis; any other dimension drops the cache.
    pub fn warm_start(&mut self, dim: usize) -> Option<Ellipsoid> {
        let cached = self.ellipsoid.as_ref()?;
        if dim == cached.dim() + 1 {
            return Some(cached.lifted());
        }
        warn!(cached = cached.dim(), requested = dim, "ellipsoid cache invalidated");
        self.ellipsoid = None;
        None
    }

    /// Stores the latest fitted ellipsoid.
    pub fn update_cache(&mut self, ellipsoid: Ellipsoid) {
        self.ellipsoid = Some(ellipsoid);
    }
}

/// Cross-call state owned by the caller and passed into every
/// [`crate::HitAndRunSampler::sample`] call.
///
/// A session without caches is a pure pass-through.
#[derive(Debug, Clone, Default)]
pub struct SamplingSession {
    sample_cache: Option<SampleCache>,
    ellipsoid_cache: Option<EllipsoidCache>,
    calls: u64,
}

impl SamplingSession {
    /// Session that caches nothing.
    pub fn stub() -> Self {
        Self::default()
    }

    /// Session with the caches enabled in `config`.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut session = Self::stub();
        if config.sample_cache {
            session = session.add_sample_cache();
        }
        if config.ellipsoid_cache {
            session = session.add_rounding_cache();
        }
        session
    }

    /// Enables the point cache.
    pub fn add_sample_cache(mut self) -> Self {
        self.sample_cache = Some(SampleCache::new());
        self
    }

    /// Enables the ellipsoid cache.
    pub fn add_rounding_cache(mut self) -> Self {
        self.ellipsoid_cache = Some(EllipsoidCache::new());
        self
    }

    /// Point cache, when enabled.
    pub fn sample_cache(&self) -> Option<&SampleCache> {
        self.sample_cache.as_ref()
    }

    /// Mutable point cache, when enabled.
    pub fn sample_cache_mut(&mut self) -> Option<&mut SampleCache> {
        self.sample_cache.as_mut()
    }

    /// Ellipsoid cache, when enabled.
    pub fn ellipsoid_cache(&self) -> Option<&EllipsoidCache> {
        self.ellipsoid_cache.as_ref()
    }

    /// Number of completed `sample` calls.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub(crate) fn prepare<'a>(&self, body: &'a dyn ConvexBody) -> PreparedBody<'a> {
        let prepared = match &self.sample_cache {
            Some(cache) => cache.attempt_to_set_default_interior_point(body),
            None => PreparedBody::new(body),
        };
        debug!(
            dim = body.dim(),
            hit = prepared.cached_interior_point().is_some(),
            "sample cache lookup"
        );
        prepared
    }

    /// Offers a known interior point as the chain start. Only sessions with a
    /// point cache take it; a stub session leaves `prepared` untouched.
    pub(crate) fn offer_interior_point(&self, prepared: &mut PreparedBody<'_>, point: &Point) {
        if self.sample_cache.is_some() {
            prepared.set_interior_point(point.clone());
        }
    }

    pub(crate) fn warm_start(&mut self, dim: usize) -> Option<Ellipsoid> {
        self.ellipsoid_cache.as_mut()?.warm_start(dim)
    }

    pub(crate) fn record(&mut self, samples: &[Point], ellipsoid: Option<&Ellipsoid>) {
        if let Some(cache) = &mut self.sample_cache {
            cache.update_cache(samples);
        }
        if let (Some(cache), Some(ellipsoid)) = (&mut self.ellipsoid_cache, ellipsoid) {
            cache.update_cache(ellipsoid.clone());
        }
        self.calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::DMatrix;
    use vspace_geom::{PolyhedralCone, SimplexSolver, UnitBallPolyhedralCone};

    use super::*;

    fn p(values: &[f64]) -> Point {
        Point::from_vec(values.to_vec())
    }

    fn orthant_ball(dim: usize) -> UnitBallPolyhedralCone {
        UnitBallPolyhedralCone::new(
            PolyhedralCone::new(DMatrix::identity(dim, dim), Arc::new(SimplexSolver::default())).unwrap(),
        )
    }

    #[test]
    fn cached_point_is_returned_exactly() {
        let body = orthant_ball(2);
        let point = p(&[0.25, 0.125]);
        let mut cache = SampleCache::new();
        cache.update_cache(&[p(&[-0.5, 0.5]), point.clone()]);
        let prepared = cache.attempt_to_set_default_interior_point(&body);
        assert_eq!(prepared.cached_interior_point(), Some(&point));
        assert_eq!(prepared.interior_point().unwrap(), point);
    }

    #[test]
    fn cached_points_are_padded_to_new_dimension() {
        let body = orthant_ball(3);
        let mut cache = SampleCache::new();
        cache.update_cache(&[p(&[0.25, 0.25])]);
        // Padding puts the point on the boundary x_3 = 0, which the closed
        // cone still accepts.
        let prepared = cache.attempt_to_set_default_interior_point(&body);
        assert_eq!(prepared.cached_interior_point(), Some(&p(&[0.25, 0.25, 0.0])));
    }

    #[test]
    fn miss_falls_back_to_body() {
        let body = orthant_ball(2);
        let mut cache = SampleCache::new();
        cache.update_cache(&[p(&[-0.5, 0.5])]);
        let prepared = cache.attempt_to_set_default_interior_point(&body);
        assert!(prepared.cached_interior_point().is_none());
        assert!(body.is_inside(&prepared.interior_point().unwrap()));
    }

    #[test]
    fn ellipsoid_cache_lifts_by_one_dimension_only() {
        let mut cache = EllipsoidCache::new();
        let fitted = Ellipsoid::from_parts(
            p(&[0.5, 0.25]),
            DMatrix::from_diagonal(&p(&[0.2, 0.1])),
            DMatrix::identity(2, 2),
            p(&[0.2, 0.1]),
        )
        .unwrap();
        cache.update_cache(fitted.clone());

        let lifted = cache.warm_start(3).unwrap();
        assert_eq!(lifted.center(), &p(&[0.5, 0.25, 0.0]));
        assert_eq!(lifted.d(), &p(&[0.2 * 1.5, 0.1 * 1.5, 2.0 * 1.5]));
        assert_eq!(cache.ellipsoid(), Some(&fitted));

        assert!(cache.warm_start(2).is_none());
        assert!(cache.ellipsoid().is_none());
    }

    #[test]
    fn stub_session_caches_nothing() {
        let body = orthant_ball(2);
        let mut session = SamplingSession::stub();
        session.record(&[p(&[0.1, 0.1])], None);
        assert!(session.prepare(&body).cached_interior_point().is_none());
        assert!(session.warm_start(3).is_none());
        assert_eq!(session.calls(), 1);
    }

    #[test]
    fn offered_point_needs_a_point_cache() {
        let body = orthant_ball(2);
        let center = p(&[0.4, 0.3]);

        let stub = SamplingSession::stub();
        let mut prepared = stub.prepare(&body);
        stub.offer_interior_point(&mut prepared, &center);
        assert!(prepared.cached_interior_point().is_none());

        let cached = SamplingSession::stub().add_sample_cache();
        let mut prepared = cached.prepare(&body);
        cached.offer_interior_point(&mut prepared, &center);
        assert_eq!(prepared.cached_interior_point(), Some(&center));
    }

    #[test]
    fn configured_session_enables_requested_caches() {
        let session = SamplingSession::from_config(&CacheConfig {
            sample_cache: true,
            ellipsoid_cache: false,
        });
        assert!(session.sample_cache().is_some());
        assert!(session.ellipsoid_cache().is_none());
    }
}
