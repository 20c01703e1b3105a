use log::debug;
use ndarray::Array2;

use crate::error::NmfError;
use crate::gradient::{
    above_zero, all_equal, below_zero, hadamard, logical_or, norm2, replace, select,
};

/// Step-size shrink factor; growing divides by the same constant.
const BETA: f64 = 0.1;
/// Bound on line-search trials per gradient iteration.
const MAX_LINE_SEARCH_STEPS: usize = 20;

/// Outcome of one nonnegative-least-squares subproblem.
pub struct NlsSubproblem {
    /// The optimized factor.
    pub h: Array2<f64>,
    /// Gradient of the objective at `h`.
    pub grad: Array2<f64>,
    /// Gradient iterations actually used. A count of 1 means the starting
    /// point already satisfied the tolerance; the caller uses this to
    /// tighten its tolerance.
    pub iterations: usize,
}

/// Solve min_{H ≥ 0} ‖V − W·H‖² for fixed `w` by projected gradient
/// descent with an adaptive-step line search.
///
/// Runs at most `max_iter − 1` gradient iterations, stopping early once
/// the projected-gradient norm falls below `tol`. Exhausting the budget
/// is not an error; the best factor found so far is returned.
pub fn solve(
    v: &Array2<f64>,
    w: &Array2<f64>,
    hinit: &Array2<f64>,
    tol: f64,
    max_iter: usize,
) -> Result<NlsSubproblem, NmfError> {
    // Reused by every gradient and curvature evaluation below.
    let wtv = w.t().dot(v);
    let wtw = w.t().dot(w);

    let mut h = hinit.clone();
    let mut grad = wtw.dot(&h) - &wtv;
    let mut alpha = 1.0;
    let mut iterations = 1;

    for iter in 1..max_iter {
        iterations = iter;
        grad = wtw.dot(&h) - &wtv;

        let unconstrained = logical_or(&below_zero(&grad), &above_zero(&h))?;
        let projgrad = norm2(&select(&grad, &unconstrained)?);
        if projgrad < tol {
            return Ok(NlsSubproblem { h, grad, iterations });
        }

        // Two-phase line search: the first trial decides whether alpha
        // must shrink until a step is accepted, or may grow until the
        // sufficient-decrease test fails or the projection saturates.
        let mut hp = h.clone();
        let mut decr_alpha = false;
        for step in 1..=MAX_LINE_SEARCH_STEPS {
            let candidate = &h - &(&grad * alpha);
            let hn = replace(&candidate, &below_zero(&candidate), 0.0)?;
            let d = &hn - &h;
            let gradd = hadamard(&d, &grad)?.sum();
            let dqd = hadamard(&wtw.dot(&d), &d)?.sum();
            let suff_decr = 0.99 * gradd + 0.5 * dqd <= 0.0;

            if step == 1 {
                decr_alpha = !suff_decr;
            }

            if decr_alpha {
                if suff_decr {
                    h = hn;
                    break;
                }
                alpha *= BETA;
            } else if !suff_decr || all_equal(&hp, &hn)? {
                h = hp;
                break;
            } else {
                alpha /= BETA;
                hp = hn;
            }
        }
    }

    debug!(
        "subproblem stopped after {} iterations without reaching tol {:.3e}",
        iterations, tol
    );
    Ok(NlsSubproblem { h, grad, iterations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn frobenius(a: &Array2<f64>) -> f64 {
        a.mapv(|x| x * x).sum().sqrt()
    }

    #[test]
    fn test_recovers_exact_factor() {
        // V = W * H_true with H_true >= 0; starting away from H_true the
        // solver should drive the residual near zero.
        let w = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let h_true = array![[1.0, 2.0], [3.0, 0.5]];
        let v = w.dot(&h_true);
        let hinit = array![[0.5, 0.5], [0.5, 0.5]];

        let result = solve(&v, &w, &hinit, 1e-8, 1000).unwrap();
        let residual = frobenius(&(w.dot(&result.h) - &v));
        assert!(residual < 1e-4, "residual too large: {}", residual);
    }

    #[test]
    fn test_result_is_nonnegative() {
        let w = array![[2.0, 1.0], [1.0, 3.0], [0.5, 0.5]];
        let v = array![[1.0, 0.2], [0.3, 2.0], [0.1, 0.1]];
        let hinit = array![[1.0, 1.0], [1.0, 1.0]];

        let result = solve(&v, &w, &hinit, 1e-8, 500).unwrap();
        for &x in result.h.iter() {
            assert!(x >= 0.0, "entry {} is negative", x);
        }
    }

    #[test]
    fn test_loose_tolerance_converges_in_one_iteration() {
        let w = array![[1.0, 0.0], [0.0, 1.0]];
        let v = array![[1.0, 2.0], [3.0, 4.0]];
        let hinit = array![[1.0, 2.0], [3.0, 4.0]];

        let result = solve(&v, &w, &hinit, 1e12, 1000).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.h, hinit);
    }

    #[test]
    fn test_budget_of_one_returns_start_unchanged() {
        let w = array![[1.0, 0.0], [0.0, 1.0]];
        let v = array![[1.0, 2.0], [3.0, 4.0]];
        let hinit = array![[0.1, 0.1], [0.1, 0.1]];

        let result = solve(&v, &w, &hinit, 1e-12, 1).unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.h, hinit);
    }

    #[test]
    fn test_gradient_matches_definition() {
        let w = array![[1.0, 2.0], [0.5, 1.0], [2.0, 0.1]];
        let v = array![[1.0], [2.0], [3.0]];
        let hinit = array![[0.3], [0.7]];

        let result = solve(&v, &w, &hinit, 1e-10, 200).unwrap();
        let expected = w.t().dot(&w).dot(&result.h) - w.t().dot(&v);
        let diff = frobenius(&(&result.grad - &expected));
        assert!(diff < 1e-9, "returned gradient is stale by {}", diff);
    }
}
