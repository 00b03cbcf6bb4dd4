//! Primal-dual KKT systems and their inertia-correcting factorization.

mod assembly;
mod kktmatrix;
mod regularization;

pub use assembly::*;
pub use kktmatrix::*;
pub use regularization::*;
