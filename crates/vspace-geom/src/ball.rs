use vspace_core::{ensure_dim, with_norm, Point, VsError};

use crate::body::{ConvexBody, EuclideanBody};
use crate::cone::PolyhedralCone;
use crate::geodesic::{Geodesic, GeodesicSegment};
use crate::hyperplane::Hyperplane;
use crate::manifold::Manifold;
use crate::quadratic::solve_second_degree;

/// Norm given to the cone's interior point so it lands strictly inside the ball.
const INTERIOR_NORM: f64 = 0.9;

/// A polyhedral cone clipped to the open unit ball `||x|| < 1`.
#[derive(Debug, Clone)]
pub struct UnitBallPolyhedralCone {
    cone: PolyhedralCone,
}

impl UnitBallPolyhedralCone {
    /// Clips `cone` to the unit ball.
    pub fn new(cone: PolyhedralCone) -> Self {
        Self { cone }
    }

    /// Underlying cone.
    pub fn cone(&self) -> &PolyhedralCone {
        &self.cone
    }
}

impl ConvexBody for UnitBallPolyhedralCone {
    fn dim(&self) -> usize {
        self.cone.dim()
    }

    fn is_inside(&self, point: &Point) -> bool {
        point.len() == self.dim() && point.norm_squared() < 1.0 && self.cone.is_inside(point)
    }

    fn interior_point(&self) -> Result<Point, VsError> {
        with_norm(&self.cone.interior_point()?, INTERIOR_NORM)
    }

    /// The ball interval solves `|v|^2 t^2 + 2 <c, v> t + |c|^2 - 1 = 0`; the
    /// cone then narrows it.
    fn compute_intersection(&self, geodesic: &Geodesic) -> Result<GeodesicSegment, VsError> {
        if !matches!(geodesic, Geodesic::Line { .. }) {
            return Err(VsError::config(
                "unsupported-geodesic",
                "unit ball cone only intersects straight lines",
            ));
        }
        ensure_dim(self.dim(), geodesic.dim())?;
        let center = geodesic.center();
        let velocity = geodesic.velocity();
        let (first, second) = solve_second_degree(
            velocity.norm_squared(),
            center.dot(velocity),
            center.norm_squared() - 1.0,
        )?;
        let (lower, upper) = self.cone.line_bounds(geodesic, first, second)?;
        geodesic.segment(lower, upper)
    }

    fn manifold(&self) -> Manifold {
        Manifold::Euclidean
    }

    fn as_euclidean(&self) -> Option<&dyn EuclideanBody> {
        Some(self)
    }
}

impl EuclideanBody for UnitBallPolyhedralCone {
    fn radius(&self) -> f64 {
        1.0
    }

    /// Points outside the ball are cut by the tangent plane through `x / |x|`;
    /// otherwise a violated cone row is used.
    fn separating_hyperplane(&self, point: &Point) -> Result<Hyperplane, VsError> {
        ensure_dim(self.dim(), point.len())?;
        if point.norm_squared() >= 1.0 {
            return Ok(Hyperplane::new(-1.0, with_norm(point, 1.0)?));
        }
        self.cone.separating_hyperplane(point)
    }
}
