//! Nonlinear program definition and the augmented-Lagrangian solver.
//!
//! `NlpProblem` is the boundary the rest of the system sees: a decision
//! vector, an objective, stacked equality and inequality constraints and
//! per-variable bounds. The solver behind it is an augmented-Lagrangian
//! method with a damped Gauss-Newton inner minimizer; any solver honoring
//! the same contract could replace it.
//!
//! Failure to converge is an expected outcome here (reported as
//! `SolverError::ConvergenceFailed`), not a programming error; callers
//! absorb it into their retry logic.

use crate::error::{SolverError, SolverResult};
use crate::gauss_newton::{self, GaussNewtonConfig};
use crate::jacobian::{finite_difference_gradient, finite_difference_jacobian};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// A finite-dimensional nonlinear program.
///
/// Equality constraints are `c(x) = 0`, inequality constraints are
/// `g(x) >= 0`. Infinite bounds mark free variables.
pub struct NlpProblem<'a> {
    /// Number of decision variables
    pub num_vars: usize,
    /// Objective to minimize
    pub objective: Box<dyn Fn(&DVector<f64>) -> f64 + 'a>,
    /// Stacked equality constraints c(x) = 0
    pub equality: Box<dyn Fn(&DVector<f64>) -> DVector<f64> + 'a>,
    /// Declared equality row count
    pub num_equalities: usize,
    /// Stacked inequality constraints g(x) >= 0
    pub inequality: Box<dyn Fn(&DVector<f64>) -> DVector<f64> + 'a>,
    /// Declared inequality row count
    pub num_inequalities: usize,
    /// Per-variable lower bounds (may be -inf)
    pub lower: DVector<f64>,
    /// Per-variable upper bounds (may be +inf)
    pub upper: DVector<f64>,
}

impl NlpProblem<'_> {
    /// Validate problem setup against a candidate point.
    pub fn validate(&self, x0: &DVector<f64>) -> SolverResult<()> {
        if x0.len() != self.num_vars {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "initial point length mismatch: {} != {}",
                    x0.len(),
                    self.num_vars
                ),
            });
        }
        if self.lower.len() != self.num_vars || self.upper.len() != self.num_vars {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "bounds length mismatch: lower {}, upper {}, vars {}",
                    self.lower.len(),
                    self.upper.len(),
                    self.num_vars
                ),
            });
        }
        for j in 0..self.num_vars {
            if self.lower[j] > self.upper[j] {
                return Err(SolverError::ProblemSetup {
                    what: format!(
                        "variable {} has lower bound {} above upper bound {}",
                        j, self.lower[j], self.upper[j]
                    ),
                });
            }
        }
        let c = (self.equality)(x0);
        if c.len() != self.num_equalities {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "equality row count mismatch: {} != {}",
                    c.len(),
                    self.num_equalities
                ),
            });
        }
        let g = (self.inequality)(x0);
        if g.len() != self.num_inequalities {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "inequality row count mismatch: {} != {}",
                    g.len(),
                    self.num_inequalities
                ),
            });
        }
        Ok(())
    }

    /// Clamp a point into the variable bounds.
    pub fn clamp(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut out = x.clone();
        for j in 0..self.num_vars {
            out[j] = out[j].clamp(self.lower[j], self.upper[j]);
        }
        out
    }
}

/// Augmented-Lagrangian solver configuration.
#[derive(Clone, Copy, Debug)]
pub struct NlpSolverConfig {
    /// Maximum outer (multiplier update) iterations
    pub max_outer_iterations: usize,
    /// Constraint violation accepted as feasible
    pub feasibility_tol: f64,
    /// Augmented-Lagrangian gradient norm accepted as stationary
    pub stationarity_tol: f64,
    /// Initial quadratic penalty weight
    pub initial_penalty: f64,
    /// Penalty multiplier when feasibility stalls
    pub penalty_growth: f64,
    /// Penalty ceiling
    pub max_penalty: f64,
    /// Finite-difference step for gradients and Jacobians
    pub fd_epsilon: f64,
    /// Inner minimizer configuration
    pub gauss_newton: GaussNewtonConfig,
}

impl Default for NlpSolverConfig {
    fn default() -> Self {
        Self {
            max_outer_iterations: 30,
            feasibility_tol: 1e-6,
            stationarity_tol: 1e-4,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
            max_penalty: 1e8,
            fd_epsilon: 1e-7,
            gauss_newton: GaussNewtonConfig::default(),
        }
    }
}

/// A converged solution.
#[derive(Clone, Debug)]
pub struct NlpSolution {
    /// Optimal decision vector
    pub x: DVector<f64>,
    /// Objective value
    pub objective: f64,
    /// Final constraint violation (infinity norm)
    pub feasibility: f64,
    /// Final augmented-Lagrangian gradient norm
    pub stationarity: f64,
    /// Outer iterations used
    pub outer_iterations: usize,
}

/// Solve an NLP from the given starting point.
///
/// Returns `ConvergenceFailed` when the outer budget is exhausted without a
/// feasible stationary point; callers treat that as local infeasibility.
pub fn solve_nlp(
    problem: &NlpProblem<'_>,
    x0: &DVector<f64>,
    config: &NlpSolverConfig,
) -> SolverResult<NlpSolution> {
    problem.validate(x0)?;

    // Fold finite variable bounds into the inequality stack.
    let mut bound_rows: Vec<(usize, f64, bool)> = Vec::new();
    for j in 0..problem.num_vars {
        if problem.lower[j].is_finite() {
            bound_rows.push((j, problem.lower[j], true));
        }
        if problem.upper[j].is_finite() {
            bound_rows.push((j, problem.upper[j], false));
        }
    }
    let num_ineq_total = problem.num_inequalities + bound_rows.len();
    let ineq_all = |x: &DVector<f64>| -> DVector<f64> {
        let g = (problem.inequality)(x);
        let mut out = DVector::zeros(num_ineq_total);
        out.rows_mut(0, g.len()).copy_from(&g);
        for (row, &(j, bound, is_lower)) in bound_rows.iter().enumerate() {
            out[problem.num_inequalities + row] = if is_lower {
                x[j] - bound
            } else {
                bound - x[j]
            };
        }
        out
    };

    let num_eq = problem.num_equalities;
    let eps = config.fd_epsilon;

    let mut x = problem.clamp(x0);
    let mut lambda = DVector::<f64>::zeros(num_eq);
    let mut nu = DVector::<f64>::zeros(num_ineq_total);
    let mut mu = config.initial_penalty;
    let mut best_feasibility = f64::INFINITY;
    let mut last_feasibility = f64::INFINITY;

    for outer in 0..config.max_outer_iterations {
        let lam_k = lambda.clone();
        let nu_k = nu.clone();
        let mu_k = mu;

        let merit = |x: &DVector<f64>| -> f64 {
            let mut value = (problem.objective)(x);
            let c = (problem.equality)(x);
            for i in 0..num_eq {
                value += -lam_k[i] * c[i] + 0.5 * mu_k * c[i] * c[i];
            }
            let g = ineq_all(x);
            for i in 0..num_ineq_total {
                let t = nu_k[i] - mu_k * g[i];
                let t_plus = t.max(0.0);
                value += (t_plus * t_plus - nu_k[i] * nu_k[i]) / (2.0 * mu_k);
            }
            value
        };

        let gradient = |x: &DVector<f64>| -> DVector<f64> {
            let mut grad = finite_difference_gradient(x, &*problem.objective, eps);
            if num_eq > 0 {
                let c = (problem.equality)(x);
                let jac_c = finite_difference_jacobian(x, &*problem.equality, eps);
                let mult = &c * mu_k - &lam_k;
                grad += jac_c.transpose() * mult;
            }
            if num_ineq_total > 0 {
                let g = ineq_all(x);
                let jac_g = finite_difference_jacobian(x, &ineq_all, eps);
                let mut t_plus = DVector::zeros(num_ineq_total);
                for i in 0..num_ineq_total {
                    t_plus[i] = (nu_k[i] - mu_k * g[i]).max(0.0);
                }
                grad -= jac_g.transpose() * t_plus;
            }
            grad
        };

        let curvature = |x: &DVector<f64>| -> DMatrix<f64> {
            let n = x.len();
            let mut hess = DMatrix::zeros(n, n);
            if num_eq > 0 {
                let jac_c = finite_difference_jacobian(x, &*problem.equality, eps);
                hess += jac_c.transpose() * &jac_c * mu_k;
            }
            if num_ineq_total > 0 {
                let g = ineq_all(x);
                let mut jac_g = finite_difference_jacobian(x, &ineq_all, eps);
                for i in 0..num_ineq_total {
                    if nu_k[i] - mu_k * g[i] <= 0.0 {
                        jac_g.row_mut(i).fill(0.0);
                    }
                }
                hess += jac_g.transpose() * &jac_g * mu_k;
            }
            hess
        };

        let inner = gauss_newton::minimize(x, merit, gradient, curvature, &config.gauss_newton)?;
        x = inner.x;

        let c = (problem.equality)(&x);
        let g = ineq_all(&x);
        let eq_violation = if num_eq > 0 { c.amax() } else { 0.0 };
        let ineq_violation = (0..num_ineq_total)
            .map(|i| (-g[i]).max(0.0))
            .fold(0.0_f64, f64::max);
        let feasibility = eq_violation.max(ineq_violation);
        last_feasibility = feasibility;

        debug!(
            outer,
            feasibility,
            stationarity = inner.grad_norm,
            penalty = mu,
            "augmented-Lagrangian outer iteration"
        );

        if feasibility <= config.feasibility_tol && inner.grad_norm <= config.stationarity_tol {
            return Ok(NlpSolution {
                objective: (problem.objective)(&x),
                x,
                feasibility,
                stationarity: inner.grad_norm,
                outer_iterations: outer + 1,
            });
        }

        // First-order multiplier updates.
        lambda -= &c * mu;
        for i in 0..num_ineq_total {
            nu[i] = (nu[i] - mu * g[i]).max(0.0);
        }

        // Grow the penalty when feasibility is not improving fast enough.
        if feasibility > 0.25 * best_feasibility {
            mu = (mu * config.penalty_growth).min(config.max_penalty);
        }
        best_feasibility = best_feasibility.min(feasibility);
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "constraint violation {:.3e} after {} outer iterations",
            last_feasibility, config.max_outer_iterations
        ),
    })
}
