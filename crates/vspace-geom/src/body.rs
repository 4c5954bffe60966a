use vspace_core::{Point, VsError};

use crate::geodesic::{Geodesic, GeodesicSegment};
use crate::hyperplane::Hyperplane;
use crate::manifold::Manifold;

/// Geometric contract every sampled region exposes.
///
/// Bodies are built fresh each active-learning iteration from the current
/// labeled set; the sampler only ever reads them.
pub trait ConvexBody: Send + Sync {
    /// Dimension of the ambient space.
    fn dim(&self) -> usize;

    /// Whether `point` lies inside the body. Points of the wrong dimension
    /// are never inside.
    fn is_inside(&self, point: &Point) -> bool;

    /// A point strictly inside the body.
    ///
    /// Fails with [`VsError::InfeasibleRegion`] when the interior is empty.
    fn interior_point(&self) -> Result<Point, VsError>;

    /// Parameter interval of `geodesic` that stays inside the body.
    ///
    /// Fails with [`VsError::DegenerateGeometry`] when the geodesic misses the
    /// body, touches it at a single point, or is unbounded inside it.
    fn compute_intersection(&self, geodesic: &Geodesic) -> Result<GeodesicSegment, VsError>;

    /// Manifold the body lives on.
    fn manifold(&self) -> Manifold;

    /// Euclidean view used by ellipsoid rounding, when supported.
    fn as_euclidean(&self) -> Option<&dyn EuclideanBody> {
        None
    }
}

/// Bodies in flat space that can drive the ellipsoid method.
pub trait EuclideanBody: ConvexBody {
    /// Radius of a ball centred at the origin containing the body
    /// (`f64::INFINITY` when unbounded).
    fn radius(&self) -> f64;

    /// Hyperplane separating an exterior `point` from the body: `point` gets a
    /// positive margin, every point of the body a non-positive one.
    ///
    /// Fails when `point` is inside the body.
    fn separating_hyperplane(&self, point: &Point) -> Result<Hyperplane, VsError>;
}
