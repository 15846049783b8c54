//! Ordinary least squares.
//!
//! The dashboard only fits straight lines (sales against time), but the solver
//! takes any design matrix and solves it via SVD. Nalgebra's `QR::solve`
//! panics on non-square systems, and every design here is tall.
//!
//! `x` is centered before fitting: ordinal day numbers are around 7e5.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearTrend {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a straight line through `(xs[i], ys[i])`.
///
/// Needs at least two distinct x values; returns `None` otherwise.
pub fn fit_linear_trend(xs: &[f64], ys: &[f64]) -> Option<LinearTrend> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }
    if !xs.iter().chain(ys).all(|v| v.is_finite()) {
        return None;
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    if xs.iter().all(|&x| (x - x_mean).abs() < f64::EPSILON) {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] - x_mean });
    let y = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&design, &y)?;

    let slope = beta[1];
    Some(LinearTrend {
        intercept: beta[0] - slope * x_mean,
        slope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn trend_recovers_line_at_large_x() {
        let xs = [734_000.0, 734_031.0, 734_059.0, 734_090.0];
        let ys: Vec<f64> = xs.iter().map(|x| 5.0 - 0.5 * x).collect();
        let fit = fit_linear_trend(&xs, &ys).unwrap();
        assert!((fit.slope + 0.5).abs() < 1e-9);
        assert!((fit.predict(734_100.0) - (5.0 - 0.5 * 734_100.0)).abs() < 1e-4);
    }

    #[test]
    fn trend_minimizes_squared_error() {
        // Points around y = x: (0,0) (1,2) (2,1) (3,3) -> slope 0.8, intercept 0.3
        let fit = fit_linear_trend(&[0.0, 1.0, 2.0, 3.0], &[0.0, 2.0, 1.0, 3.0]).unwrap();
        assert!((fit.slope - 0.8).abs() < 1e-10);
        assert!((fit.intercept - 0.3).abs() < 1e-10);
    }

    #[test]
    fn degenerate_inputs_have_no_trend() {
        assert!(fit_linear_trend(&[1.0], &[1.0]).is_none());
        assert!(fit_linear_trend(&[2.0, 2.0], &[1.0, 3.0]).is_none());
        assert!(fit_linear_trend(&[1.0, 2.0], &[1.0]).is_none());
    }
}
