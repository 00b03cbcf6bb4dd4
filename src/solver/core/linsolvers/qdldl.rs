#![allow(non_snake_case)]
use super::*;
use crate::qdldl::*;

/// Sparse LDLᵀ backend built on [`QDLDLFactorisation`].
///
/// The factorization does not pivot, so a singular (or numerically
/// unlucky) matrix fails with [`LinearSolverError::Singular`] rather than
/// reporting a zero eigenvalue count.  The symbolic analysis is kept while
/// the sparsity pattern of successive inputs stays the same, and only
/// the numeric factorization is repeated.
pub struct QdldlLinearSolver<T: FloatT> {
    settings: QDLDLSettings<T>,
    factors: Option<QDLDLFactorisation<T>>,
    // pattern of the matrix held by `factors`
    colptr: Vec<usize>,
    rowval: Vec<usize>,
    inertia: Option<Inertia>,
}

impl<T> QdldlLinearSolver<T>
where
    T: FloatT,
{
    pub fn new(pivot_tolerance: T) -> Self {
        let settings = QDLDLSettings {
            pivot_tolerance,
            ..QDLDLSettings::default()
        };
        Self {
            settings,
            factors: None,
            colptr: vec![],
            rowval: vec![],
            inertia: None,
        }
    }

    fn same_pattern(&self, matrix: &CscMatrix<T>) -> bool {
        self.factors.is_some() && self.colptr == matrix.colptr && self.rowval == matrix.rowval
    }

    fn numeric_refactor(&mut self, matrix: &CscMatrix<T>) -> Result<(), QDLDLError> {
        match self.factors {
            Some(ref mut factors) => {
                factors.update_values(&matrix.nzval);
                factors.refactor()
            }
            None => unreachable!(),
        }
    }

    fn full_factor(&mut self, matrix: &CscMatrix<T>) -> Result<(), QDLDLError> {
        self.factors = None;
        let factors = QDLDLFactorisation::new(matrix, Some(self.settings.clone()))?;
        self.factors = Some(factors);
        self.colptr.clone_from(&matrix.colptr);
        self.rowval.clone_from(&matrix.rowval);
        Ok(())
    }
}

impl<T> LinearSolver<T> for QdldlLinearSolver<T>
where
    T: FloatT,
{
    fn factorize(&mut self, matrix: &CscMatrix<T>) -> Result<Inertia, LinearSolverError> {
        self.inertia = None;
        check_input(matrix)?;

        let result = if self.same_pattern(matrix) {
            self.numeric_refactor(matrix)
        } else {
            self.full_factor(matrix)
        };

        match result {
            Ok(()) => {}
            Err(QDLDLError::ZeroPivot(_)) => return Err(LinearSolverError::Singular),
            Err(e) => return Err(LinearSolverError::NumericalBreakdown(e.to_string())),
        }

        let factors = self.factors.as_ref().ok_or(LinearSolverError::Singular)?;
        if !factors.Dinv.is_finite() {
            return Err(LinearSolverError::NumericalBreakdown(
                "non-finite factors".to_string(),
            ));
        }

        let inertia = Inertia::new(factors.positive_inertia(), factors.negative_inertia(), 0);
        self.inertia = Some(inertia);
        Ok(inertia)
    }

    fn solve(&mut self, x: &mut [T], b: &[T]) -> Result<(), LinearSolverError> {
        // factors are only usable after a successful factorization
        if self.inertia.is_none() {
            return Err(LinearSolverError::Singular);
        }
        let factors = self.factors.as_mut().ok_or(LinearSolverError::Singular)?;

        // NB: QDLDL solves in place
        x.copy_from(b);
        factors.solve(x);

        if x.is_finite() {
            Ok(())
        } else {
            Err(LinearSolverError::NumericalBreakdown(
                "non-finite solution".to_string(),
            ))
        }
    }

    fn inertia(&self) -> Option<Inertia> {
        self.inertia
    }

    fn name(&self) -> &'static str {
        "qdldl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_is_reported() {
        // [1 1]
        // [1 1]
        let A = CscMatrix::new_from_triplets(2, 2, &[0, 0, 1], &[0, 1, 1], &[1., 1., 1.]);
        let mut solver = QdldlLinearSolver::new(0.0);
        assert_eq!(solver.factorize(&A), Err(LinearSolverError::Singular));
        assert!(solver.inertia().is_none());

        let mut x = [0.; 2];
        assert_eq!(solver.solve(&mut x, &[1., 1.]), Err(LinearSolverError::Singular));
    }

    #[test]
    fn test_pattern_reuse() {
        let mut A = CscMatrix::new_from_triplets(2, 2, &[0, 0, 1], &[0, 1, 1], &[1., 1., 1.]);
        let mut solver = QdldlLinearSolver::new(0.0);
        assert!(solver.factorize(&A).is_err());

        // same pattern, now nonsingular and indefinite
        A.nzval[2] = -1.;
        assert_eq!(solver.factorize(&A), Ok(Inertia::new(1, 1, 0)));

        // shift the diagonal while keeping the pattern
        A.nzval[2] = 3.;
        assert_eq!(solver.factorize(&A), Ok(Inertia::new(2, 0, 0)));
        assert!(solver.same_pattern(&A));

        let mut x = [0.; 2];
        solver.solve(&mut x, &[2., 4.]).unwrap();
        assert!(x.norm_inf_diff(&[1., 1.]) < 1e-14);
    }
}
