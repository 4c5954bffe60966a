#![deny(missing_docs)]
#![doc = "Manifolds, geodesics and the convex bodies (polyhedral cones, optionally clipped to the unit ball or sphere) that version-space samplers walk through."]

/// Ball-clipped polyhedral cones.
pub mod ball;
/// Convex body contracts.
pub mod body;
/// Polyhedral cones built from labeled points.
pub mod cone;
/// Geodesics and geodesic segments.
pub mod geodesic;
/// Affine hyperplanes used as separators.
pub mod hyperplane;
pub mod linprog;
/// Euclidean and spherical manifolds.
pub mod manifold;
/// Second degree equation roots.
pub mod quadratic;
/// Sphere-restricted polyhedral cones.
pub mod sphere;

pub use ball::UnitBallPolyhedralCone;
pub use body::{ConvexBody, EuclideanBody};
pub use cone::PolyhedralCone;
pub use geodesic::{Geodesic, GeodesicSegment};
pub use hyperplane::Hyperplane;
pub use linprog::{InequalitySign, LinearProgram, LinearProgramSolver, SimplexSolver};
pub use manifold::Manifold;
pub use sphere::UnitSpherePolyhedralCone;
