//! Direct factorization backends for symmetric indefinite KKT systems.
//!
//! Every backend factors a square matrix supplied as its upper triangle in
//! CSC format and reports the inertia of the factored matrix, i.e. the
//! number of positive, negative and zero eigenvalues.  The available
//! backends are collected in the [`LinearSolverBackend`] enum, which is
//! constructed from the `direct_solve_method` setting.

use crate::algebra::*;
use enum_dispatch::*;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod config;
mod dense_ldl;
mod qdldl;

pub use self::qdldl::*;
pub use config::*;
pub use dense_ldl::*;

/// Eigenvalue sign counts of a symmetric matrix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Inertia {
    pub positive: usize,
    pub negative: usize,
    pub null: usize,
}

impl Inertia {
    pub fn new(positive: usize, negative: usize, null: usize) -> Self {
        Self {
            positive,
            negative,
            null,
        }
    }

    /// true if the matrix has at least one zero eigenvalue
    pub fn is_singular(&self) -> bool {
        self.null > 0
    }

    /// dimension of the matrix the inertia was computed for
    pub fn dim(&self) -> usize {
        self.positive + self.negative + self.null
    }
}

impl std::fmt::Display for Inertia {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.positive, self.negative, self.null)
    }
}

/// Error type returned by linear solver backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinearSolverError {
    /// A zero pivot was encountered, or a solve was requested
    /// with a factored matrix that has zero eigenvalues
    #[error("Matrix is singular")]
    Singular,
    /// The requested backend does not exist or was not compiled in
    #[error("Linear solver \"{method}\" is not available")]
    Unavailable { method: String },
    /// Non-finite values or a structurally invalid input
    #[error("Numerical breakdown in linear solver: {0}")]
    NumericalBreakdown(String),
}

#[enum_dispatch(LinearSolver<T>)]
pub enum LinearSolverBackend<T>
where
    T: FloatT,
{
    Qdldl(QdldlLinearSolver<T>),
    DenseLdl(DenseLdlLinearSolver<T>),
}

/// Common interface for the factorization backends.
#[enum_dispatch]
pub trait LinearSolver<T>
where
    T: FloatT,
{
    /// Factor the matrix and return its inertia.
    ///
    /// The matrix must be square and hold only its upper triangle.
    fn factorize(&mut self, matrix: &CscMatrix<T>) -> Result<Inertia, LinearSolverError>;

    /// Solve `Ax = b` using the factors from the last successful call
    /// to [`factorize`](LinearSolver::factorize).
    fn solve(&mut self, x: &mut [T], b: &[T]) -> Result<(), LinearSolverError>;

    /// Inertia of the most recent factorization, if any
    fn inertia(&self) -> Option<Inertia>;

    fn name(&self) -> &'static str;
}

// structural checks shared by the backends
fn check_input<T: FloatT>(matrix: &CscMatrix<T>) -> Result<(), LinearSolverError> {
    matrix
        .check_format()
        .map_err(|e| LinearSolverError::NumericalBreakdown(e.to_string()))?;
    if !matrix.is_square() {
        return Err(LinearSolverError::NumericalBreakdown(
            "matrix is not square".to_string(),
        ));
    }
    if !matrix.is_triu() {
        return Err(LinearSolverError::NumericalBreakdown(
            "matrix is not upper triangular".to_string(),
        ));
    }
    if !matrix.nzval.is_finite() {
        return Err(LinearSolverError::NumericalBreakdown(
            "matrix has non-finite entries".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // [ 4  1  0 ]
    // [ 1 -3  2 ]
    // [ 0  2  1 ]
    pub(super) fn test_matrix() -> CscMatrix<f64> {
        CscMatrix::new_from_triplets(
            3,
            3,
            &[0, 0, 1, 1, 2],
            &[0, 1, 1, 2, 2],
            &[4., 1., -3., 2., 1.],
        )
    }

    fn all_backends() -> Vec<LinearSolverBackend<f64>> {
        ["qdldl", "dense"]
            .iter()
            .map(|method| linear_solver_from_settings(method, 0.0).unwrap())
            .collect()
    }

    #[test]
    fn test_indefinite_inertia() {
        let A = test_matrix();
        for mut solver in all_backends() {
            let inertia = solver.factorize(&A).unwrap();
            assert_eq!(inertia, Inertia::new(2, 1, 0), "{}", solver.name());
            assert_eq!(solver.inertia(), Some(inertia));
        }
    }

    #[test]
    fn test_solve() {
        let A = test_matrix();
        let xref = [1., -2., 3.];
        let mut b = [0.; 3];
        A.sym().symv(&mut b, &xref, 1.0, 0.0);

        for mut solver in all_backends() {
            let mut x = [0.; 3];
            solver.factorize(&A).unwrap();
            solver.solve(&mut x, &b).unwrap();
            assert!(x.norm_inf_diff(&xref) < 1e-12, "{}", solver.name());
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        let A = CscMatrix::new_from_triplets(3, 3, &[0, 1, 1], &[0, 0, 1], &[1., 2., 3.]);
        for mut solver in all_backends() {
            assert!(matches!(
                solver.factorize(&A),
                Err(LinearSolverError::NumericalBreakdown(_))
            ));
            assert!(solver.inertia().is_none());
        }
    }
}
