//! Damped Gauss-Newton minimizer.
//!
//! Minimizes a scalar merit function given closures for its gradient and a
//! positive-semidefinite curvature approximation. Steps solve
//! `(H + sigma*I) d = -grad` with an adaptive damping factor sigma:
//! rejected steps grow sigma, accepted steps shrink it.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};

/// Damped Gauss-Newton configuration.
#[derive(Clone, Copy, Debug)]
pub struct GaussNewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Stop when the gradient infinity norm falls below this
    pub grad_tol: f64,
    /// Stop when the accepted step infinity norm falls below this
    pub step_tol: f64,
    /// Initial damping factor
    pub initial_damping: f64,
    /// Damping floor after successful steps
    pub min_damping: f64,
    /// Damping multiplier on a rejected step
    pub damping_growth: f64,
    /// Damping divisor on an accepted step
    pub damping_shrink: f64,
    /// Maximum consecutive rejected steps before giving up
    pub max_rejects: usize,
}

impl Default for GaussNewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            grad_tol: 1e-8,
            step_tol: 1e-11,
            initial_damping: 1e-3,
            min_damping: 1e-10,
            damping_growth: 10.0,
            damping_shrink: 3.0,
            max_rejects: 14,
        }
    }
}

/// Result of one damped Gauss-Newton run.
#[derive(Clone, Debug)]
pub struct GaussNewtonResult {
    /// Final iterate
    pub x: DVector<f64>,
    /// Merit value at the final iterate
    pub merit: f64,
    /// Gradient infinity norm at the final iterate
    pub grad_norm: f64,
    /// Number of accepted iterations
    pub iterations: usize,
}

/// Minimize `merit` starting from `x0`.
///
/// `gradient` and `curvature` are evaluated once per accepted iterate;
/// rejected steps reuse them and only refactor with a larger damping.
pub fn minimize<Fm, Fg, Fh>(
    x0: DVector<f64>,
    merit: Fm,
    gradient: Fg,
    curvature: Fh,
    config: &GaussNewtonConfig,
) -> SolverResult<GaussNewtonResult>
where
    Fm: Fn(&DVector<f64>) -> f64,
    Fg: Fn(&DVector<f64>) -> DVector<f64>,
    Fh: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    let n = x0.len();
    let mut x = x0;
    let mut merit_x = merit(&x);
    if !merit_x.is_finite() {
        return Err(SolverError::Numeric {
            what: "merit not finite at the starting point".to_string(),
        });
    }

    let mut sigma = config.initial_damping;
    let mut iterations = 0;

    for _ in 0..config.max_iterations {
        let grad = gradient(&x);
        let grad_norm = grad.amax();
        if !grad_norm.is_finite() {
            return Err(SolverError::Numeric {
                what: "gradient not finite".to_string(),
            });
        }
        if grad_norm < config.grad_tol {
            return Ok(GaussNewtonResult {
                x,
                merit: merit_x,
                grad_norm,
                iterations,
            });
        }

        let hess = curvature(&x);
        let mut accepted = false;

        for _ in 0..config.max_rejects {
            let damped = &hess + DMatrix::identity(n, n) * sigma;
            let step = match damped.lu().solve(&(-&grad)) {
                Some(step) => step,
                None => {
                    sigma *= config.damping_growth;
                    continue;
                }
            };

            let x_trial = &x + &step;
            let merit_trial = merit(&x_trial);

            if merit_trial.is_finite() && merit_trial < merit_x {
                let step_norm = step.amax();
                x = x_trial;
                merit_x = merit_trial;
                sigma = (sigma / config.damping_shrink).max(config.min_damping);
                iterations += 1;
                accepted = true;

                if step_norm < config.step_tol {
                    return Ok(GaussNewtonResult {
                        x,
                        merit: merit_x,
                        grad_norm,
                        iterations,
                    });
                }
                break;
            }

            sigma *= config.damping_growth;
        }

        if !accepted {
            // Stalled: no descent direction at any damping level.
            let grad_norm = gradient(&x).amax();
            return Ok(GaussNewtonResult {
                x,
                merit: merit_x,
                grad_norm,
                iterations,
            });
        }
    }

    let grad_norm = gradient(&x).amax();
    Ok(GaussNewtonResult {
        x,
        merit: merit_x,
        grad_norm,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobian::finite_difference_gradient;

    #[test]
    fn minimizes_shifted_quadratic() {
        // merit = (x-2)^2 + (y+1)^2
        let merit =
            |x: &DVector<f64>| (x[0] - 2.0) * (x[0] - 2.0) + (x[1] + 1.0) * (x[1] + 1.0);
        let gradient =
            |x: &DVector<f64>| DVector::from_column_slice(&[2.0 * (x[0] - 2.0), 2.0 * (x[1] + 1.0)]);
        let curvature = |_x: &DVector<f64>| DMatrix::from_diagonal_element(2, 2, 2.0);

        let x0 = DVector::from_column_slice(&[10.0, -10.0]);
        let result = minimize(x0, merit, gradient, curvature, &GaussNewtonConfig::default())
            .unwrap();

        assert!((result.x[0] - 2.0).abs() < 1e-6, "x = {}", result.x[0]);
        assert!((result.x[1] + 1.0).abs() < 1e-6, "y = {}", result.x[1]);
    }

    #[test]
    fn survives_indefinite_curvature_via_damping() {
        // Curvature approximation is zero; damping turns the step into
        // scaled gradient descent and the minimizer still makes progress.
        let merit = |x: &DVector<f64>| x[0] * x[0];
        let gradient = |x: &DVector<f64>| finite_difference_gradient(x, |y| y[0] * y[0], 1e-7);
        let curvature = |_x: &DVector<f64>| DMatrix::zeros(1, 1);

        let x0 = DVector::from_element(1, 4.0);
        let config = GaussNewtonConfig {
            max_iterations: 400,
            ..Default::default()
        };
        let result = minimize(x0, merit, gradient, curvature, &config).unwrap();
        assert!(result.merit < 1e-4, "merit = {}", result.merit);
    }

    #[test]
    fn rejects_non_finite_start() {
        let merit = |_x: &DVector<f64>| f64::NAN;
        let gradient = |_x: &DVector<f64>| DVector::zeros(1);
        let curvature = |_x: &DVector<f64>| DMatrix::zeros(1, 1);

        let err = minimize(
            DVector::zeros(1),
            merit,
            gradient,
            curvature,
            &GaussNewtonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }
}
