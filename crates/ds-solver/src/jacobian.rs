//! Finite difference Jacobian and gradient computation.

use nalgebra::{DMatrix, DVector};

/// Compute a Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by a scaled epsilon and computes
/// (f(x+e) - f(x)) / e.
pub fn finite_difference_jacobian<F>(x: &DVector<f64>, f: F, epsilon: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let f_x = f(x);
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let f_perturbed = f(&x_perturbed);
        let df = (f_perturbed - &f_x) / dx;

        for i in 0..m {
            jac[(i, j)] = df[i];
        }
    }

    jac
}

/// Compute a gradient of a scalar function using forward finite differences.
pub fn finite_difference_gradient<F>(x: &DVector<f64>, f: F, epsilon: f64) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x.len();
    let f_x = f(x);

    let mut grad = DVector::zeros(n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;
        grad[j] = (f(&x_perturbed) - f_x) / dx;
    }

    grad
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| DVector::from_element(1, 2.0 * x[0]);

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7);

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let f = |x: &DVector<f64>| DVector::from_element(1, x[0] * x[0]);

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7);

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn gradient_of_sum_of_squares() {
        let f = |x: &DVector<f64>| x.dot(x);

        let x = DVector::from_column_slice(&[1.0, -2.0, 0.5]);
        let grad = finite_difference_gradient(&x, f, 1e-7);

        for i in 0..3 {
            assert!((grad[i] - 2.0 * x[i]).abs() < 1e-5, "component {i}");
        }
    }
}
