//! Linear program abstraction used to bootstrap a first interior point.
//!
//! A problem has the form `minimize <c, x> s.t. A x (<=|>=|=) b, lower <= x <= upper`.
//! Any solver can be plugged in through [`LinearProgramSolver`]; [`SimplexSolver`]
//! is a dense two-phase simplex good enough for the small programs built by
//! [`crate::PolyhedralCone::interior_point`].

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use vspace_core::{ensure_dim, ErrorInfo, VsError};

/// Direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InequalitySign {
    /// `<a, x> <= b`
    Leq,
    /// `<a, x> >= b`
    Geq,
    /// `<a, x> = b`
    Eq,
}

/// One row of the constraint system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Left-hand side coefficients.
    pub weights: Vec<f64>,
    /// Relation between both sides.
    pub sign: InequalitySign,
    /// Right-hand side value.
    pub rhs: f64,
}

/// A bounded linear program over `dim` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl LinearProgram {
    /// Empty program with zero objective and unbounded variables.
    pub fn new(dim: usize) -> Result<Self, VsError> {
        vspace_core::ensure_positive("dim", dim)?;
        Ok(Self {
            objective: vec![0.0; dim],
            constraints: Vec::new(),
            lower: vec![f64::NEG_INFINITY; dim],
            upper: vec![f64::INFINITY; dim],
        })
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.objective.len()
    }

    /// Sets the cost vector `c`.
    pub fn set_objective(&mut self, objective: Vec<f64>) -> Result<(), VsError> {
        ensure_dim(self.dim(), objective.len())?;
        self.objective = objective;
        Ok(())
    }

    /// Adds the constraint `<weights, x> sign rhs`.
    pub fn add_constraint(
        &mut self,
        weights: Vec<f64>,
        sign: InequalitySign,
        rhs: f64,
    ) -> Result<(), VsError> {
        ensure_dim(self.dim(), weights.len())?;
        self.constraints.push(LinearConstraint { weights, sign, rhs });
        Ok(())
    }

    /// Sets the per-variable lower bounds.
    pub fn set_lower(&mut self, lower: Vec<f64>) -> Result<(), VsError> {
        ensure_dim(self.dim(), lower.len())?;
        self.lower = lower;
        Ok(())
    }

    /// Sets the per-variable upper bounds.
    pub fn set_upper(&mut self, upper: Vec<f64>) -> Result<(), VsError> {
        ensure_dim(self.dim(), upper.len())?;
        self.upper = upper;
        Ok(())
    }

    /// Cost vector.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Constraint rows.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Lower bounds.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }
}

/// Solver able to compute a minimizer of a [`LinearProgram`].
pub trait LinearProgramSolver: Debug + Send + Sync {
    /// Returns an optimal point.
    ///
    /// Fails with [`VsError::InfeasibleRegion`] when the feasible set is empty
    /// and [`VsError::Solver`] for unbounded or numerically failed programs.
    fn find_minimizer(&self, problem: &LinearProgram) -> Result<Vec<f64>, VsError>;
}

const PIVOT_TOLERANCE: f64 = 1e-9;
const FEASIBILITY_TOLERANCE: f64 = 1e-8;

/// Dense two-phase simplex using Bland's rule.
///
/// Lower bounds must be finite; variables are shifted to `y = x - lower >= 0`
/// and finite upper bounds become explicit rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplexSolver {
    max_pivots: usize,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self { max_pivots: 50_000 }
    }
}

impl SimplexSolver {
    /// Solver giving up after `max_pivots` pivots per phase.
    pub fn with_max_pivots(max_pivots: usize) -> Result<Self, VsError> {
        vspace_core::ensure_positive("max_pivots", max_pivots)?;
        Ok(Self { max_pivots })
    }
}

struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    num_columns: usize,
}

impl Tableau {
    fn rhs(&self, row: usize) -> f64 {
        self.rows[row][self.num_columns]
    }

    fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        let factor = self.rows[pivot_row][pivot_col];
        for value in self.rows[pivot_row].iter_mut() {
            *value /= factor;
        }
        let pivot_values = self.rows[pivot_row].clone();
        for (index, row) in self.rows.iter_mut().enumerate() {
            if index == pivot_row {
                continue;
            }
            let scale = row[pivot_col];
            if scale == 0.0 {
                continue;
            }
            for (value, pivot_value) in row.iter_mut().zip(&pivot_values) {
                *value -= scale * pivot_value;
            }
        }
        self.basis[pivot_row] = pivot_col;
    }

    fn objective_value(&self, costs: &[f64]) -> f64 {
        self.basis
            .iter()
            .enumerate()
            .map(|(row, &col)| costs[col] * self.rhs(row))
            .sum()
    }

    /// Runs simplex iterations minimizing `costs` over the columns below `allowed`.
    fn optimize(&mut self, costs: &[f64], allowed: usize, max_pivots: usize) -> Result<(), VsError> {
        for _ in 0..max_pivots {
            let entering = (0..allowed).find(|&col| {
                if self.basis.contains(&col) {
                    return false;
                }
                let reduced = costs[col]
                    - self
                        .basis
                        .iter()
                        .enumerate()
                        .map(|(row, &b)| costs[b] * self.rows[row][col])
                        .sum::<f64>();
                reduced < -PIVOT_TOLERANCE
            });
            let Some(col) = entering else {
                return Ok(());
            };

            let mut leaving: Option<(usize, f64)> = None;
            for row in 0..self.rows.len() {
                let coefficient = self.rows[row][col];
                if coefficient <= PIVOT_TOLERANCE {
                    continue;
                }
                let ratio = self.rhs(row) / coefficient;
                leaving = match leaving {
                    None => Some((row, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - PIVOT_TOLERANCE
                            || (ratio <= best_ratio + PIVOT_TOLERANCE
                                && self.basis[row] < self.basis[best])
                        {
                            Some((row, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            let Some((row, _)) = leaving else {
                return Err(VsError::Solver(
                    ErrorInfo::new("unbounded-program", "linear program is unbounded")
                        .with_context("column", col),
                ));
            };
            self.pivot(row, col);
        }
        Err(VsError::Solver(
            ErrorInfo::new("pivot-limit", "simplex did not converge")
                .with_context("max_pivots", max_pivots),
        ))
    }
}

impl LinearProgramSolver for SimplexSolver {
    fn find_minimizer(&self, problem: &LinearProgram) -> Result<Vec<f64>, VsError> {
        let dim = problem.dim();
        if let Some(index) = problem.lower().iter().position(|l| !l.is_finite()) {
            return Err(VsError::Configuration(
                ErrorInfo::new("unbounded-variable", "simplex requires finite lower bounds")
                    .with_context("variable", index),
            ));
        }

        // Shift to y = x - lower and collect rows as (weights, sign, rhs).
        let mut rows: Vec<(Vec<f64>, InequalitySign, f64)> = Vec::new();
        for constraint in problem.constraints() {
            let shift: f64 = constraint
                .weights
                .iter()
                .zip(problem.lower())
                .map(|(w, l)| w * l)
                .sum();
            rows.push((
                constraint.weights.clone(),
                constraint.sign,
                constraint.rhs - shift,
            ));
        }
        for (index, (&lower, &upper)) in problem.lower().iter().zip(problem.upper()).enumerate() {
            if upper.is_finite() {
                if upper < lower {
                    return Err(VsError::InfeasibleRegion(
                        ErrorInfo::new("empty-bounds", "upper bound below lower bound")
                            .with_context("variable", index),
                    ));
                }
                let mut weights = vec![0.0; dim];
                weights[index] = 1.0;
                rows.push((weights, InequalitySign::Leq, upper - lower));
            }
        }

        // Normalize to non-negative right-hand sides.
        for (weights, sign, rhs) in rows.iter_mut() {
            if *rhs < 0.0 {
                weights.iter_mut().for_each(|w| *w = -*w);
                *rhs = -*rhs;
                *sign = match sign {
                    InequalitySign::Leq => InequalitySign::Geq,
                    InequalitySign::Geq => InequalitySign::Leq,
                    InequalitySign::Eq => InequalitySign::Eq,
                };
            }
        }

        let num_slacks = rows
            .iter()
            .filter(|(_, sign, _)| *sign != InequalitySign::Eq)
            .count();
        let num_artificials = rows
            .iter()
            .filter(|(_, sign, _)| *sign != InequalitySign::Leq)
            .count();
        let first_artificial = dim + num_slacks;
        let num_columns = first_artificial + num_artificials;

        let mut tableau = Tableau {
            rows: Vec::with_capacity(rows.len()),
            basis: Vec::with_capacity(rows.len()),
            num_columns,
        };
        let mut next_slack = dim;
        let mut next_artificial = first_artificial;
        for (weights, sign, rhs) in &rows {
            let mut row = vec![0.0; num_columns + 1];
            row[..dim].copy_from_slice(weights);
            row[num_columns] = *rhs;
            match sign {
                InequalitySign::Leq => {
                    row[next_slack] = 1.0;
                    tableau.basis.push(next_slack);
                    next_slack += 1;
                }
                InequalitySign::Geq => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    tableau.basis.push(next_artificial);
                    next_artificial += 1;
                }
                InequalitySign::Eq => {
                    row[next_artificial] = 1.0;
                    tableau.basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            tableau.rows.push(row);
        }

        // Phase one: drive artificial variables to zero.
        if num_artificials > 0 {
            let mut phase_one = vec![0.0; num_columns];
            phase_one[first_artificial..].iter_mut().for_each(|c| *c = 1.0);
            tableau.optimize(&phase_one, num_columns, self.max_pivots)?;
            let infeasibility = tableau.objective_value(&phase_one);
            if infeasibility > FEASIBILITY_TOLERANCE {
                return Err(VsError::InfeasibleRegion(
                    ErrorInfo::new("infeasible-program", "linear program has no feasible point")
                        .with_context("residual", infeasibility),
                ));
            }
            for row in 0..tableau.rows.len() {
                if tableau.basis[row] < first_artificial {
                    continue;
                }
                let replacement = (0..first_artificial)
                    .find(|&col| tableau.rows[row][col].abs() > PIVOT_TOLERANCE);
                if let Some(col) = replacement {
                    tableau.pivot(row, col);
                }
            }
        }

        // Phase two: optimize the real objective over non-artificial columns.
        let mut costs = vec![0.0; num_columns];
        costs[..dim].copy_from_slice(problem.objective());
        tableau.optimize(&costs, first_artificial, self.max_pivots)?;

        let mut solution = problem.lower().to_vec();
        for (row, &col) in tableau.basis.iter().enumerate() {
            if col < dim {
                solution[col] += tableau.rhs(row);
            }
        }
        Ok(solution)
    }
}
