use std::f64::consts::PI;

use vspace_core::{ensure_dim, with_norm, ErrorInfo, Point, VsError};

use crate::body::ConvexBody;
use crate::cone::PolyhedralCone;
use crate::geodesic::{Geodesic, GeodesicSegment};
use crate::manifold::Manifold;

/// Tolerance on `| |x|^2 - 1 |` for points considered on the sphere.
const SPHERE_TOLERANCE: f64 = 1e-10;

/// A polyhedral cone intersected with the unit sphere `||x|| = 1`.
#[derive(Debug, Clone)]
pub struct UnitSpherePolyhedralCone {
    cone: PolyhedralCone,
}

impl UnitSpherePolyhedralCone {
    /// Restricts `cone` to the unit sphere.
    pub fn new(cone: PolyhedralCone) -> Self {
        Self { cone }
    }

    /// Underlying cone.
    pub fn cone(&self) -> &PolyhedralCone {
        &self.cone
    }
}

impl ConvexBody for UnitSpherePolyhedralCone {
    fn dim(&self) -> usize {
        self.cone.dim()
    }

    fn is_inside(&self, point: &Point) -> bool {
        self.cone.is_inside(point) && (point.norm_squared() - 1.0).abs() < SPHERE_TOLERANCE
    }

    fn interior_point(&self) -> Result<Point, VsError> {
        with_norm(&self.cone.interior_point()?, 1.0)
    }

    /// Along `cos(t) c + sin(t) v` each row reads `a cos t + b sin t >= 0`,
    /// which holds on `[atan2(-a, b), atan2(-a, b) + pi]`.
    fn compute_intersection(&self, geodesic: &Geodesic) -> Result<GeodesicSegment, VsError> {
        if !matches!(geodesic, Geodesic::GreatCircle { .. }) {
            return Err(VsError::config(
                "unsupported-geodesic",
                "unit sphere cone only intersects great circles",
            ));
        }
        ensure_dim(self.dim(), geodesic.dim())?;
        if !self.cone.is_inside(geodesic.center()) {
            return Err(VsError::degenerate(
                "center-outside",
                "great circle center lies outside the cone",
            ));
        }

        let constraints = self.cone.constraints();
        let a = constraints * geodesic.center();
        let b = constraints * geodesic.velocity();

        let mut lower = -PI;
        let mut upper = PI;
        for (&a_i, &b_i) in a.iter().zip(b.iter()) {
            let angle = (-a_i).atan2(b_i);
            lower = lower.max(angle);
            upper = upper.min(angle + PI);
        }

        if lower >= upper {
            return Err(VsError::DegenerateGeometry(
                ErrorInfo::new("empty-arc", "great circle does not cross the cone")
                    .with_context("lower", lower)
                    .with_context("upper", upper),
            ));
        }
        geodesic.segment(lower, upper)
    }

    fn manifold(&self) -> Manifold {
        Manifold::Sphere
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linprog::SimplexSolver;
    use nalgebra::DMatrix;
    use std::sync::Arc;

    fn p(values: &[f64]) -> Point {
        Point::from_vec(values.to_vec())
    }

    fn body() -> UnitSpherePolyhedralCone {
        // x >= 0, y >= 0 on the unit circle: the quarter arc [0, pi/2].
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        UnitSpherePolyhedralCone::new(PolyhedralCone::new(a, Arc::new(SimplexSolver::default())).unwrap())
    }

    #[test]
    fn membership_requires_unit_norm() {
        let body = body();
        let s = 0.5f64.sqrt();
        assert!(body.is_inside(&p(&[s, s])));
        assert!(!body.is_inside(&p(&[0.5, 0.5])));
        assert!(!body.is_inside(&p(&[-s, s])));
    }

    #[test]
    fn interior_point_on_sphere() {
        let x = body().interior_point().unwrap();
        assert!(body().is_inside(&x));
    }

    #[test]
    fn quarter_arc_intersection() {
        let s = 0.5f64.sqrt();
        let circle = Geodesic::great_circle(p(&[s, s]), p(&[-s, s])).unwrap();
        let segment = body().compute_intersection(&circle).unwrap();
        assert!((segment.lower() + PI / 4.0).abs() < 1e-12);
        assert!((segment.upper() - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn center_outside_fails() {
        let circle = Geodesic::great_circle(p(&[-1.0, 0.0]), p(&[0.0, 1.0])).unwrap();
        assert!(matches!(
            body().compute_intersection(&circle),
            Err(VsError::DegenerateGeometry(_))
        ));
        let line = Geodesic::line(p(&[1.0, 0.0]), p(&[0.0, 1.0])).unwrap();
        assert!(matches!(
            body().compute_intersection(&line),
            Err(VsError::Configuration(_))
        ));
    }
}
