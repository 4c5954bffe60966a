use vspace_core::{Point, RngHandle, VsError};

use crate::geodesic::Geodesic;

/// Space on which a convex body lives; decides what a straight path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Manifold {
    /// Flat space, geodesics are lines.
    Euclidean,
    /// Unit sphere, geodesics are great circles.
    Sphere,
}

impl Manifold {
    /// Builds the geodesic through `center` with initial `velocity`.
    pub fn geodesic(&self, center: Point, velocity: Point) -> Result<Geodesic, VsError> {
        match self {
            Manifold::Euclidean => Geodesic::line(center, velocity),
            Manifold::Sphere => Geodesic::great_circle(center, velocity),
        }
    }

    /// Draws a random tangent vector at `point`. The result is not normalized
    /// on the Euclidean manifold.
    pub fn sample_velocity(&self, point: &Point, rng: &mut RngHandle) -> Point {
        let direction = Point::from_fn(point.len(), |_, _| rng.gaussian());
        match self {
            Manifold::Euclidean => direction,
            Manifold::Sphere => self.project_to_tangent(point, direction),
        }
    }

    /// Projects `direction` onto the tangent space at `point`.
    pub fn project_to_tangent(&self, point: &Point, direction: Point) -> Point {
        match self {
            Manifold::Euclidean => direction,
            Manifold::Sphere => {
                let sq_norm = point.norm_squared();
                if sq_norm == 0.0 {
                    return direction;
                }
                let prod = direction.dot(point) / sq_norm;
                direction - point * prod
            }
        }
    }
}
