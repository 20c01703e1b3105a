use ndarray::{Array2, Zip};

use crate::error::NmfError;

/// Frobenius norm of a flat sequence of values.
pub fn norm2(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Elementwise `< 0` mask.
pub fn below_zero(a: &Array2<f64>) -> Array2<bool> {
    a.mapv(|v| v < 0.0)
}

/// Elementwise `> 0` mask.
pub fn above_zero(a: &Array2<f64>) -> Array2<bool> {
    a.mapv(|v| v > 0.0)
}

/// Elementwise OR of two equal-shaped masks.
pub fn logical_or(a: &Array2<bool>, b: &Array2<bool>) -> Result<Array2<bool>, NmfError> {
    ensure_same_dim(a.dim(), b.dim(), "logical_or masks")?;
    let mut out = a.clone();
    Zip::from(&mut out).and(b).for_each(|o, &bv| *o = *o || bv);
    Ok(out)
}

/// Values of `a` where the mask is true, in row-major order.
pub fn select(a: &Array2<f64>, mask: &Array2<bool>) -> Result<Vec<f64>, NmfError> {
    ensure_same_dim(a.dim(), mask.dim(), "selection mask")?;
    Ok(a.iter()
        .zip(mask.iter())
        .filter(|(_, &keep)| keep)
        .map(|(&v, _)| v)
        .collect())
}

/// New matrix equal to `a` with entries set to `value` where the mask is true.
pub fn replace(a: &Array2<f64>, mask: &Array2<bool>, value: f64) -> Result<Array2<f64>, NmfError> {
    ensure_same_dim(a.dim(), mask.dim(), "replacement mask")?;
    let mut out = a.clone();
    Zip::from(&mut out).and(mask).for_each(|o, &hit| {
        if hit {
            *o = value;
        }
    });
    Ok(out)
}

/// Elementwise product of two equal-shaped matrices.
pub fn hadamard(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>, NmfError> {
    ensure_same_dim(a.dim(), b.dim(), "elementwise product operands")?;
    let mut out = a.clone();
    Zip::from(&mut out).and(b).for_each(|o, &bv| *o *= bv);
    Ok(out)
}

/// Whether two equal-shaped matrices agree in every entry.
pub fn all_equal(a: &Array2<f64>, b: &Array2<f64>) -> Result<bool, NmfError> {
    ensure_same_dim(a.dim(), b.dim(), "equality operands")?;
    Ok(a.iter().zip(b.iter()).all(|(x, y)| x == y))
}

fn ensure_same_dim(
    expected: (usize, usize),
    actual: (usize, usize),
    what: &str,
) -> Result<(), NmfError> {
    if expected != actual {
        return Err(NmfError::ShapeMismatch(format!(
            "{}: expected {}x{}, got {}x{}",
            what, expected.0, expected.1, actual.0, actual.1
        )));
    }
    Ok(())
}
