use vspace_core::{ensure_dim, ErrorInfo, Point, VsError};

/// Relative tolerance used when checking that a great-circle velocity is tangent.
const TANGENT_TOLERANCE: f64 = 1e-8;

/// A manifold's notion of a straight path through `center` with the given velocity.
#[derive(Debug, Clone, PartialEq)]
pub enum Geodesic {
    /// Euclidean line `center + t * velocity`.
    Line {
        /// Point at `t = 0`.
        center: Point,
        /// Direction of travel; never normalized.
        velocity: Point,
    },
    /// Great circle `cos(t) * center + sin(t) * velocity` on the unit sphere.
    GreatCircle {
        /// Point at `t = 0`, unit norm.
        center: Point,
        /// Unit tangent at `center`.
        velocity: Point,
    },
}

impl Geodesic {
    /// Builds a straight line. The velocity must be non-zero.
    pub fn line(center: Point, velocity: Point) -> Result<Self, VsError> {
        ensure_dim(center.len(), velocity.len())?;
        if center.is_empty() {
            return Err(VsError::config("empty-geodesic", "geodesic dimension must be positive"));
        }
        if velocity.norm_squared() == 0.0 {
            return Err(VsError::degenerate(
                "zero-velocity",
                "line direction must be a non-zero vector",
            ));
        }
        Ok(Geodesic::Line { center, velocity })
    }

    /// Builds a great circle through `center` with tangent `velocity`.
    ///
    /// The velocity must be orthogonal to the center; both are normalized.
    pub fn great_circle(center: Point, velocity: Point) -> Result<Self, VsError> {
        ensure_dim(center.len(), velocity.len())?;
        let center_norm = center.norm();
        let velocity_norm = velocity.norm();
        if center_norm == 0.0 || velocity_norm == 0.0 {
            return Err(VsError::degenerate(
                "zero-vector",
                "great circle needs a non-zero center and velocity",
            ));
        }
        let cosine = center.dot(&velocity) / (center_norm * velocity_norm);
        if cosine.abs() > TANGENT_TOLERANCE {
            return Err(VsError::Configuration(
                ErrorInfo::new("non-tangent-velocity", "velocity is not orthogonal to center")
                    .with_context("cosine", cosine),
            ));
        }
        Ok(Geodesic::GreatCircle {
            center: center / center_norm,
            velocity: velocity / velocity_norm,
        })
    }

    /// Point at `t = 0`.
    pub fn center(&self) -> &Point {
        match self {
            Geodesic::Line { center, .. } | Geodesic::GreatCircle { center, .. } => center,
        }
    }

    /// Velocity at `t = 0`.
    pub fn velocity(&self) -> &Point {
        match self {
            Geodesic::Line { velocity, .. } | Geodesic::GreatCircle { velocity, .. } => velocity,
        }
    }

    /// Dimension of the ambient space.
    pub fn dim(&self) -> usize {
        self.center().len()
    }

    /// Position on the geodesic at parameter `t`.
    pub fn point(&self, t: f64) -> Point {
        match self {
            Geodesic::Line { center, velocity } => center + velocity * t,
            Geodesic::GreatCircle { center, velocity } => {
                let point = center * t.cos() + velocity * t.sin();
                let norm = point.norm();
                point / norm
            }
        }
    }

    /// Restricts this geodesic to `lower <= t <= upper`.
    pub fn segment(&self, lower: f64, upper: f64) -> Result<GeodesicSegment, VsError> {
        GeodesicSegment::new(self.clone(), lower, upper)
    }
}

/// A geodesic restricted to a finite, non-empty parameter interval.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodesicSegment {
    geodesic: Geodesic,
    lower: f64,
    upper: f64,
}

impl GeodesicSegment {
    /// Creates the segment, failing unless `lower < upper` and both are finite.
    pub fn new(geodesic: Geodesic, lower: f64, upper: f64) -> Result<Self, VsError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(VsError::DegenerateGeometry(
                ErrorInfo::new("unbounded-segment", "geodesic is unbounded inside the body")
                    .with_context("lower", lower)
                    .with_context("upper", upper)
                    .with_hint("intersect the cone with a ball or sphere"),
            ));
        }
        if lower >= upper {
            return Err(VsError::DegenerateGeometry(
                ErrorInfo::new("empty-segment", "geodesic does not cross the body's interior")
                    .with_context("lower", lower)
                    .with_context("upper", upper),
            ));
        }
        Ok(Self {
            geodesic,
            lower,
            upper,
        })
    }

    /// Lower end of the parameter interval.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper end of the parameter interval.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Underlying geodesic.
    pub fn geodesic(&self) -> &Geodesic {
        &self.geodesic
    }

    /// Point at `lower + proportion * (upper - lower)`, for `proportion` in `[0, 1]`.
    pub fn point(&self, proportion: f64) -> Result<Point, VsError> {
        if !(0.0..=1.0).contains(&proportion) {
            return Err(VsError::Configuration(
                ErrorInfo::new("proportion-out-of-range", "proportion must lie in [0, 1]")
                    .with_context("proportion", proportion),
            ));
        }
        Ok(self
            .geodesic
            .point(self.lower + proportion * (self.upper - self.lower)))
    }

    /// Intersection of two segments of the same geodesic.
    pub fn intersect(&self, other: &GeodesicSegment) -> Result<GeodesicSegment, VsError> {
        if self.geodesic != other.geodesic {
            return Err(VsError::config(
                "different-geodesics",
                "only segments of the same geodesic can be intersected",
            ));
        }
        GeodesicSegment::new(
            self.geodesic.clone(),
            self.lower.max(other.lower),
            self.upper.min(other.upper),
        )
    }
}
