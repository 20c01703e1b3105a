use ndarray::Array2;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use crate::config::NmfConfig;
use crate::error::NmfError;
use crate::util::clone_to_dmatrix;

/// Fraction of the singular-value sum the automatic rank must capture.
const ENERGY_THRESHOLD: f64 = 0.9;
/// Strictly positive floor for random initial entries; the projected
/// gradient needs a strictly interior starting point to make early
/// progress.
const RANDOM_FLOOR: f64 = 1e-8;
/// Seed used when the configuration does not supply one.
const DEFAULT_SEED: u64 = 2222;

/// Starting factors plus the rank they were built for.
#[derive(Debug, Clone)]
pub struct InitialFactors {
    pub w: Array2<f64>,
    pub h: Array2<f64>,
    pub rank: usize,
}

/// Produce a starting pair (W, H) for factorizing `v`.
///
/// Caller-supplied matrices win when both are present and are validated
/// against (n, k) / (k, m). Otherwise `svd_init` selects the SVD-based
/// initializer, and the default is a seeded uniform draw over
/// [1e-8, maxV].
pub fn initialize(v: &Array2<f64>, config: &NmfConfig) -> Result<InitialFactors, NmfError> {
    let n = v.nrows();
    let m = v.ncols();

    if let (Some(winit), Some(hinit)) = (&config.winit, &config.hinit) {
        let k = config.k.unwrap_or(NmfConfig::DEFAULT_RANK);
        if winit.dim() != (n, k) {
            return Err(NmfError::ShapeMismatch(format!(
                "initial W must be {}x{}, got {}x{}",
                n,
                k,
                winit.nrows(),
                winit.ncols()
            )));
        }
        if hinit.dim() != (k, m) {
            return Err(NmfError::ShapeMismatch(format!(
                "initial H must be {}x{}, got {}x{}",
                k,
                m,
                hinit.nrows(),
                hinit.ncols()
            )));
        }
        return Ok(InitialFactors {
            w: winit.clone(),
            h: hinit.clone(),
            rank: k,
        });
    }

    if config.svd_init {
        return initialize_svd(v, config.k.unwrap_or(0));
    }

    let k = config.k.unwrap_or(NmfConfig::DEFAULT_RANK);
    let max_v = config
        .max_v
        .unwrap_or_else(|| v.fold(0.0_f64, |acc, &x| acc.max(x)));
    // An all-zero input would leave the uniform range empty.
    let upper = if max_v > RANDOM_FLOOR { max_v } else { 1.0 };
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
    let dist = Uniform::new(RANDOM_FLOOR, upper);
    let w = Array2::random_using((n, k), dist, &mut rng);
    let h = Array2::random_using((k, m), dist, &mut rng);
    Ok(InitialFactors { w, h, rank: k })
}

/// SVD-based starting point: W from √σ-scaled left singular vectors, H
/// from √σ-scaled right singular vectors, both forced nonnegative by
/// absolute value. A `k` of zero picks the smallest rank capturing
/// [`ENERGY_THRESHOLD`] of the singular-value sum.
fn initialize_svd(v: &Array2<f64>, k: usize) -> Result<InitialFactors, NmfError> {
    let n = v.nrows();
    let m = v.ncols();

    let svd = clone_to_dmatrix(v.view()).svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| NmfError::Svd("left singular vectors unavailable".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| NmfError::Svd("right singular vectors unavailable".to_string()))?;
    let singular = &svd.singular_values;

    let rank = if k == 0 {
        let total: f64 = singular.iter().sum();
        let mut captured = 0.0;
        let mut r = 0;
        while r < singular.len() && captured < ENERGY_THRESHOLD * total {
            captured += singular[r];
            r += 1;
        }
        r.max(1)
    } else {
        k
    };
    let rank = rank.min(singular.len());

    let mut w = Array2::zeros((n, rank));
    let mut h = Array2::zeros((rank, m));
    for j in 0..rank {
        let scale = singular[j].sqrt();
        for i in 0..n {
            w[[i, j]] = (u[(i, j)] * scale).abs();
        }
        for c in 0..m {
            h[[j, c]] = (scale * v_t[(j, c)]).abs();
        }
    }

    Ok(InitialFactors { w, h, rank })
}
