use log::{debug, info};
use ndarray::Array2;

use crate::config::NmfConfig;
use crate::error::NmfError;
use crate::gradient::{above_zero, below_zero, logical_or, norm2, select};
use crate::init::initialize;
use crate::subproblem::{solve, NlsSubproblem};

/// Iteration budget handed to each inner subproblem solve.
const SUBPROBLEM_MAX_ITER: usize = 1000;
/// Floor under the outer tolerance when deriving the subproblem
/// tolerances.
const SUBPROBLEM_TOL_FLOOR: f64 = 0.001;
/// Shrink factor for a subproblem tolerance that turned out to be looser
/// than necessary.
const TOL_TIGHTENING: f64 = 0.1;

/// A factorization V ≈ W·H with W and H entrywise nonnegative.
#[derive(Debug, Clone)]
pub struct NmfResult {
    /// Left factor, n×k.
    pub w: Array2<f64>,
    /// Right factor, k×m.
    pub h: Array2<f64>,
}

/// Factorize a nonnegative matrix `v` into `W·H` by alternating projected
/// gradients (Lin's method).
///
/// Each outer iteration updates W on the transposed problem, then H on
/// the direct one, reusing the same nonnegative-least-squares subroutine
/// for both. The loop stops once the combined projected-gradient norm
/// falls below `tol` times its initial value, or after `max_iter − 1`
/// iterations; exhausting the budget still returns the best factors
/// found. Callers needing a convergence guarantee should inspect the
/// residual of the returned pair themselves.
pub fn factorize(v: &Array2<f64>, config: &NmfConfig) -> Result<NmfResult, NmfError> {
    let init = initialize(v, config)?;
    let mut w = init.w;
    let mut h = init.h;

    let residual = w.dot(&h) - v;
    let mut grad_w = residual.dot(&h.t());
    let mut grad_h = w.t().dot(&residual);

    let flat: Vec<f64> = grad_w.iter().chain(grad_h.iter()).copied().collect();
    let initgrad = norm2(&flat);
    // Both subproblem tolerances start as a fraction of the initial
    // gradient magnitude.
    let mut tol_w = SUBPROBLEM_TOL_FLOOR.max(config.tol) * initgrad;
    let mut tol_h = tol_w;

    debug!(
        "factorizing {}x{} at rank {}, initial gradient norm {:.6e}",
        v.nrows(),
        v.ncols(),
        init.rank,
        initgrad
    );

    let mut converged = false;
    for iteration in 1..config.max_iter {
        let projnorm = projected_gradient_norm(&grad_w, &w, &grad_h, &h)?;
        debug!(
            "iteration {}: projected gradient norm {:.6e}",
            iteration, projnorm
        );
        if projnorm < config.tol * initgrad {
            info!(
                "converged at iteration {} (projected gradient norm {:.6e})",
                iteration, projnorm
            );
            converged = true;
            break;
        }

        // W is optimized through the transposed problem.
        let NlsSubproblem {
            h: wt,
            grad: grad_wt,
            iterations: iter_w,
        } = solve(
            &v.t().to_owned(),
            &h.t().to_owned(),
            &w.t().to_owned(),
            tol_w,
            SUBPROBLEM_MAX_ITER,
        )?;
        w = wt.t().to_owned();
        grad_w = grad_wt.t().to_owned();
        if iter_w == 1 {
            tol_w *= TOL_TIGHTENING;
        }

        let NlsSubproblem {
            h: h_new,
            grad: grad_h_new,
            iterations: iter_h,
        } = solve(v, &w, &h, tol_h, SUBPROBLEM_MAX_ITER)?;
        h = h_new;
        grad_h = grad_h_new;
        if iter_h == 1 {
            tol_h *= TOL_TIGHTENING;
        }
    }

    if !converged {
        info!("iteration budget of {} exhausted", config.max_iter);
    }

    Ok(NmfResult { w, h })
}

/// Norm of the gradient restricted to directions that remain feasible: an
/// entry counts when its gradient points into the feasible region or the
/// variable is strictly interior.
fn projected_gradient_norm(
    grad_w: &Array2<f64>,
    w: &Array2<f64>,
    grad_h: &Array2<f64>,
    h: &Array2<f64>,
) -> Result<f64, NmfError> {
    let mask_w = logical_or(&below_zero(grad_w), &above_zero(w))?;
    let mask_h = logical_or(&below_zero(grad_h), &above_zero(h))?;
    let mut entries = select(grad_w, &mask_w)?;
    entries.extend(select(grad_h, &mask_h)?);
    Ok(norm2(&entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn relative_residual(v: &Array2<f64>, result: &NmfResult) -> f64 {
        let approx = result.w.dot(&result.h);
        let err = (v - &approx).mapv(|x| x * x).sum().sqrt();
        let denom = v.mapv(|x| x * x).sum().sqrt();
        err / denom
    }

    #[test]
    fn test_known_product_with_supplied_start() {
        // V = [[1,2,3],[4,5,6]] · [[1,2],[3,4],[5,6]]
        let v = array![[22.0, 28.0], [49.0, 64.0]];
        let config = NmfConfig {
            k: Some(3),
            winit: Some(array![[1.0, 1.0, 3.0], [4.0, 5.0, 6.0]]),
            hinit: Some(array![[1.0, 1.0], [3.0, 4.0], [5.0, 6.0]]),
            tol: 0.001,
            max_iter: 10,
            ..Default::default()
        };
        let result = factorize(&v, &config).unwrap();
        let approx = result.w.dot(&result.h);
        for (x, y) in approx.iter().zip(v.iter()) {
            assert!(
                (x - y).abs() < 0.1,
                "entry {} should approximate {} within 0.1",
                x,
                y
            );
        }
    }

    #[test]
    fn test_budget_of_one_returns_initial_pair() {
        let v = array![[22.0, 28.0], [49.0, 64.0]];
        let winit = array![[1.0, 1.0, 3.0], [4.0, 5.0, 6.0]];
        let hinit = array![[1.0, 1.0], [3.0, 4.0], [5.0, 6.0]];
        let config = NmfConfig {
            k: Some(3),
            winit: Some(winit.clone()),
            hinit: Some(hinit.clone()),
            max_iter: 1,
            ..Default::default()
        };
        let result = factorize(&v, &config).unwrap();
        assert_eq!(result.w, winit);
        assert_eq!(result.h, hinit);
    }

    #[test]
    fn test_wrong_shaped_start_is_rejected() {
        let v = array![[22.0, 28.0], [49.0, 64.0]];
        let config = NmfConfig {
            k: Some(3),
            winit: Some(array![[1.0, 1.0], [4.0, 5.0]]),
            hinit: Some(array![[1.0, 1.0], [3.0, 4.0], [5.0, 6.0]]),
            ..Default::default()
        };
        assert!(matches!(
            factorize(&v, &config),
            Err(NmfError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_random_init_keeps_factors_nonnegative() {
        let v = array![
            [1.0, 0.5, 0.0, 2.0],
            [0.2, 1.5, 0.3, 0.0],
            [0.0, 0.7, 2.2, 1.1]
        ];
        let config = NmfConfig {
            k: Some(2),
            seed: Some(3),
            max_iter: 30,
            ..Default::default()
        };
        let result = factorize(&v, &config).unwrap();
        assert_eq!(result.w.dim(), (3, 2));
        assert_eq!(result.h.dim(), (2, 4));
        for &x in result.w.iter().chain(result.h.iter()) {
            assert!(x >= 0.0, "factor entry {} is negative", x);
        }
    }

    #[test]
    fn test_svd_init_path() {
        // Exactly rank 2, so a rank-2 SVD-seeded run can drive the
        // residual close to zero.
        let w_true = array![[1.0, 0.5], [0.5, 1.0], [1.0, 1.0]];
        let h_true = array![[1.0, 0.5, 1.0], [0.5, 1.0, 1.0]];
        let v = w_true.dot(&h_true);
        let config = NmfConfig {
            k: Some(2),
            svd_init: true,
            max_iter: 200,
            tol: 1e-4,
            ..Default::default()
        };
        let result = factorize(&v, &config).unwrap();
        let residual = relative_residual(&v, &result);
        assert!(
            residual < 0.05,
            "SVD-seeded run should recover a rank-2 input, residual {}",
            residual
        );
    }
}
