//! Non-negative matrix factorization by alternating projected gradients.
//!
//! Given a nonnegative matrix V (n×m) and a target rank k, [`factorize`]
//! finds W (n×k) and H (k×m), both entrywise nonnegative, minimizing the
//! squared Frobenius reconstruction error ‖V − W·H‖². Each outer
//! iteration solves two nonnegative-least-squares subproblems with Lin's
//! projected-gradient method and an adaptive-step line search.
//!
//! ```no_run
//! use ndarray::array;
//! use nmf::{factorize, NmfConfig};
//!
//! let v = array![[22.0, 28.0], [49.0, 64.0]];
//! let config = NmfConfig {
//!     k: Some(2),
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let result = factorize(&v, &config).unwrap();
//! let approx = result.w.dot(&result.h);
//! ```

pub mod config;
pub mod error;
pub mod factorize;
pub mod gradient;
pub mod init;
pub mod subproblem;
pub mod util;

pub use config::NmfConfig;
pub use error::NmfError;
pub use factorize::{factorize, NmfResult};
