use std::error::Error;
use std::fmt;

/// Errors surfaced by the factorization routines.
///
/// Running out of iterations is not represented here: both the outer loop
/// and the subproblem solver return their best factors on budget
/// exhaustion.
#[derive(Debug, Clone, PartialEq)]
pub enum NmfError {
    /// Operands with incompatible dimensions (wrong-shaped initial
    /// matrices, mismatched elementwise operands).
    ShapeMismatch(String),
    /// The SVD initializer could not obtain singular vectors.
    Svd(String),
}

impl fmt::Display for NmfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NmfError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            NmfError::Svd(msg) => write!(f, "SVD error: {}", msg),
        }
    }
}

impl Error for NmfError {}
