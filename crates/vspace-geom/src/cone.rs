use std::sync::Arc;

use nalgebra::DMatrix;
use vspace_core::{ensure_dim, ErrorInfo, Point, VsError};

use crate::body::{ConvexBody, EuclideanBody};
use crate::geodesic::{Geodesic, GeodesicSegment};
use crate::hyperplane::Hyperplane;
use crate::linprog::{InequalitySign, LinearProgram, LinearProgramSolver};
use crate::manifold::Manifold;

/// Slack the interior-point program must reach for its optimum to count as
/// strictly interior.
const INTERIOR_SLACK: f64 = 1e-10;

/// Polyhedral cone `{x : A x >= 0}`; each row of `A` is a signed feature
/// vector `y_i x_i` of a labeled point.
#[derive(Debug, Clone)]
pub struct PolyhedralCone {
    constraints: DMatrix<f64>,
    solver: Arc<dyn LinearProgramSolver>,
}

impl PolyhedralCone {
    /// Creates the cone from its constraint matrix.
    pub fn new(constraints: DMatrix<f64>, solver: Arc<dyn LinearProgramSolver>) -> Result<Self, VsError> {
        vspace_core::ensure_positive("dim", constraints.ncols())?;
        Ok(Self {
            constraints,
            solver,
        })
    }

    /// Builds the cone of hypotheses agreeing with every label: row `i` is
    /// `x_i` when `labels[i]` is positive and `-x_i` otherwise.
    pub fn from_labeled_points(
        points: &[Point],
        labels: &[bool],
        solver: Arc<dyn LinearProgramSolver>,
    ) -> Result<Self, VsError> {
        ensure_dim(points.len(), labels.len())?;
        let Some(first) = points.first() else {
            return Err(VsError::config("no-labeled-points", "at least one labeled point is required"));
        };
        let dim = first.len();
        let mut constraints = DMatrix::zeros(points.len(), dim);
        for (row, (point, &label)) in points.iter().zip(labels).enumerate() {
            ensure_dim(dim, point.len())?;
            let sign = if label { 1.0 } else { -1.0 };
            constraints.set_row(row, &(point * sign).transpose());
        }
        Self::new(constraints, solver)
    }

    /// Constraint matrix `A`.
    pub fn constraints(&self) -> &DMatrix<f64> {
        &self.constraints
    }

    /// Narrows `[lower, upper]` to the parameters where `line` stays in the cone.
    ///
    /// Each row's ratio test yields a bound on `t`; a row parallel to the line
    /// that is not strictly satisfied means the line never enters the cone.
    pub(crate) fn line_bounds(
        &self,
        line: &Geodesic,
        mut lower: f64,
        mut upper: f64,
    ) -> Result<(f64, f64), VsError> {
        ensure_dim(self.dim(), line.dim())?;
        let numerator = &self.constraints * line.center();
        let denominator = &self.constraints * line.velocity();

        for (row, (&num, &den)) in numerator.iter().zip(denominator.iter()).enumerate() {
            let value = -num / den;
            if den > 0.0 && value > lower {
                lower = value;
            } else if den < 0.0 && value < upper {
                upper = value;
            } else if den == 0.0 && num <= 0.0 {
                return Err(VsError::DegenerateGeometry(
                    ErrorInfo::new("tangent-constraint", "line does not intercept the cone")
                        .with_context("row", row)
                        .with_context("margin", num),
                ));
            }
        }
        Ok((lower, upper))
    }
}

impl ConvexBody for PolyhedralCone {
    fn dim(&self) -> usize {
        self.constraints.ncols()
    }

    fn is_inside(&self, point: &Point) -> bool {
        if point.len() != self.dim() {
            return false;
        }
        (&self.constraints * point).iter().all(|&margin| margin >= 0.0)
    }

    /// Solves `minimize s s.t. s + <a_i, x> >= 0, -1 <= s, x_i <= 1`.
    ///
    /// An optimum with `s < 0` is strictly inside; the box only keeps the
    /// program bounded.
    fn interior_point(&self) -> Result<Point, VsError> {
        let dim = self.dim();
        let mut program = LinearProgram::new(dim + 1)?;

        let mut objective = vec![0.0; dim + 1];
        objective[0] = 1.0;
        program.set_objective(objective)?;

        for row in self.constraints.row_iter() {
            let mut weights = Vec::with_capacity(dim + 1);
            weights.push(1.0);
            weights.extend(row.iter().copied());
            program.add_constraint(weights, InequalitySign::Geq, 0.0)?;
        }
        program.set_lower(vec![-1.0; dim + 1])?;
        program.set_upper(vec![1.0; dim + 1])?;

        let solution = self.solver.find_minimizer(&program)?;
        let slack = solution[0];
        if slack >= -INTERIOR_SLACK {
            return Err(VsError::InfeasibleRegion(
                ErrorInfo::new("empty-interior", "cone has no strictly interior point")
                    .with_context("slack", slack)
                    .with_context("constraints", self.constraints.nrows())
                    .with_hint("labels may be contradictory for a linear hypothesis class"),
            ));
        }
        Ok(Point::from_iterator(dim, solution[1..].iter().copied()))
    }

    fn compute_intersection(&self, geodesic: &Geodesic) -> Result<GeodesicSegment, VsError> {
        if !matches!(geodesic, Geodesic::Line { .. }) {
            return Err(VsError::config(
                "unsupported-geodesic",
                "polyhedral cone only intersects straight lines",
            ));
        }
        let (lower, upper) = self.line_bounds(geodesic, f64::NEG_INFINITY, f64::INFINITY)?;
        geodesic.segment(lower, upper)
    }

    fn manifold(&self) -> Manifold {
        Manifold::Euclidean
    }

    fn as_euclidean(&self) -> Option<&dyn EuclideanBody> {
        Some(self)
    }
}

impl EuclideanBody for PolyhedralCone {
    fn radius(&self) -> f64 {
        f64::INFINITY
    }

    /// Returns the first violated row, negated.
    fn separating_hyperplane(&self, point: &Point) -> Result<Hyperplane, VsError> {
        ensure_dim(self.dim(), point.len())?;
        let margins = &self.constraints * point;
        match margins.iter().position(|&margin| margin < 0.0) {
            Some(row) => Ok(Hyperplane::centered(
                -self.constraints.row(row).transpose(),
            )),
            None => Err(VsError::config(
                "point-inside",
                "cannot separate a point lying inside the cone",
            )),
        }
    }
}
