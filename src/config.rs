use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration for one factorization run.
///
/// Every recognized field has an explicit default; unset optional fields
/// are resolved against the input matrix at initialization time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NmfConfig {
    /// Target rank. `None` resolves to [`NmfConfig::DEFAULT_RANK`], except
    /// under `svd_init`, where the rank is chosen from the spectrum.
    pub k: Option<usize>,
    /// Caller-supplied starting W (n×k). Used only together with `hinit`.
    pub winit: Option<Array2<f64>>,
    /// Caller-supplied starting H (k×m). Used only together with `winit`.
    pub hinit: Option<Array2<f64>>,
    /// Outer convergence tolerance multiplier.
    pub tol: f64,
    /// Outer iteration budget.
    pub max_iter: usize,
    /// Seed for the random initializer.
    pub seed: Option<u64>,
    /// Upper bound for random initial entries; `None` means the maximum
    /// entry of the input matrix.
    pub max_v: Option<f64>,
    /// Initialize from the singular value decomposition instead of at
    /// random.
    pub svd_init: bool,
}

impl NmfConfig {
    /// Rank used when neither `k` nor an SVD-derived rank is available.
    pub const DEFAULT_RANK: usize = 2;
}

impl Default for NmfConfig {
    fn default() -> Self {
        Self {
            k: None,
            winit: None,
            hinit: None,
            tol: 1e-3,
            max_iter: 100,
            seed: None,
            max_v: None,
            svd_init: false,
        }
    }
}
