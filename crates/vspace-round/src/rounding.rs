use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use vspace_core::{ErrorInfo, Point, VsError};
use vspace_geom::EuclideanBody;

use crate::ellipsoid::Ellipsoid;

/// Cap on cuts performed by a single fit unless configured otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Result of a weak Löwner-John fit.
#[derive(Debug, Clone)]
pub struct RoundingOutcome {
    /// Fitted ellipsoid.
    pub ellipsoid: Ellipsoid,
    /// Number of effective cuts performed.
    pub iterations: usize,
    /// `false` when the iteration cap stopped the fit early.
    pub converged: bool,
}

/// Shallow-cut ellipsoid method producing an ellipsoid `E` with
/// `E / (n + 1) ⊆ body ⊆ E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingAlgorithm {
    max_iterations: usize,
}

impl Default for RoundingAlgorithm {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl RoundingAlgorithm {
    /// Creates the algorithm with an explicit cut budget.
    pub fn new(max_iterations: usize) -> Result<Self, VsError> {
        vspace_core::ensure_positive("max_iterations", max_iterations)?;
        Ok(Self { max_iterations })
    }

    /// Maximum number of cuts before giving up.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Fits starting from the ball of radius `body.radius()`.
    pub fn fit(&self, body: &dyn EuclideanBody) -> Result<RoundingOutcome, VsError> {
        self.fit_weak_lowner_john_ellipsoid(body, None)
    }

    /// Fits starting from `start`, or from the enclosing ball when `None`.
    ///
    /// The starting ellipsoid must contain the body; bodies without a finite
    /// enclosing radius need an explicit start.
    pub fn fit_weak_lowner_john_ellipsoid(
        &self,
        body: &dyn EuclideanBody,
        start: Option<Ellipsoid>,
    ) -> Result<RoundingOutcome, VsError> {
        let mut ellipsoid = match start {
            Some(ellipsoid) => {
                vspace_core::ensure_dim(body.dim(), ellipsoid.dim())?;
                ellipsoid
            }
            None => containing_ellipsoid(body)?,
        };

        let mut iterations = 0;
        while iterations < self.max_iterations {
            if !attempt_to_reduce(body, &mut ellipsoid)? {
                debug!(iterations, dim = body.dim(), "rounding converged");
                return Ok(RoundingOutcome {
                    ellipsoid,
                    iterations,
                    converged: true,
                });
            }
            iterations += 1;
        }

        warn!(
            max_iterations = self.max_iterations,
            dim = body.dim(),
            "rounding stopped at iteration cap"
        );
        Ok(RoundingOutcome {
            ellipsoid,
            iterations,
            converged: false,
        })
    }
}

/// Ball centred at the origin of radius `body.radius()`.
///
/// Fails with a configuration error for unbounded bodies.
pub fn containing_ellipsoid(body: &dyn EuclideanBody) -> Result<Ellipsoid, VsError> {
    let radius = body.radius();
    if !radius.is_finite() {
        return Err(VsError::Configuration(
            ErrorInfo::new("unbounded-body", "rounding needs a bounded body")
                .with_context("radius", radius)
                .with_hint("intersect the cone with the unit ball"),
        ));
    }
    Ellipsoid::ball(body.dim(), radius)
}

/// Centre plus the `2n` points `c ± sqrt(λ_i) / (n + 1) v_i` along the
/// principal axes of the shrunk ellipsoid.
pub fn probe_points(ellipsoid: &Ellipsoid) -> Result<Vec<Point>, VsError> {
    let n = ellipsoid.dim();
    let center = ellipsoid.center();
    let eigen = SymmetricEigen::new(ellipsoid.scale().clone());

    let mut probes = Vec::with_capacity(2 * n + 1);
    probes.push(center.clone());
    for (i, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(VsError::DegenerateGeometry(
                ErrorInfo::new("singular-ellipsoid", "ellipsoid scale is not positive definite")
                    .with_context("eigenvalue", lambda)
                    .with_context("axis", i),
            ));
        }
        let axis = eigen.eigenvectors.column(i) * (lambda.sqrt() / (n as f64 + 1.0));
        probes.push(center + &axis);
        probes.push(center - &axis);
    }
    Ok(probes)
}

/// Cuts `ellipsoid` with the separating hyperplane of the first probe found
/// outside `body` that yields an effective cut.
///
/// Returns `false` when every probe lies inside, i.e. the fit is done.
pub fn attempt_to_reduce(body: &dyn EuclideanBody, ellipsoid: &mut Ellipsoid) -> Result<bool, VsError> {
    for probe in probe_points(ellipsoid)? {
        if body.is_inside(&probe) {
            continue;
        }
        let hyperplane = body.separating_hyperplane(&probe)?;
        if ellipsoid.cut(&hyperplane)? {
            trace!(margin = hyperplane.margin(ellipsoid.center()), "ellipsoid cut");
            return Ok(true);
        }
    }
    Ok(false)
}
