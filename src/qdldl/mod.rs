//! Sparse $LDL^T$ factorization of symmetric matrices with AMD ordering.
//!
//! The factorization does not pivot, so it is only guaranteed to exist
//! for quasidefinite matrices.  For any other symmetric matrix it either
//! succeeds, in which case the signs of `D` give the exact inertia of the
//! input by Sylvester's law, or it stops at the first zero pivot.

#[allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;
