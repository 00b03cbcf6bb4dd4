#![allow(non_snake_case)]
use super::*;
use faer::linalg::solvers::{Lblt, Solve};
use faer::{Mat, Side};
use num_traits::{FromPrimitive, ToPrimitive};

/// Dense symmetric indefinite backend using faer's Bunch-Kaufman `LBLᵀ`
/// factorization.
///
/// The factorization `P A Pᵀ = L B Lᵀ` has a block diagonal `B` made of
/// 1×1 and 2×2 blocks, and by Sylvester's law the eigenvalue signs of `B`
/// give the exact inertia of `A`.  Eigenvalues of `B` no larger than
/// `max(pivot_tolerance, n·ε·max|A|)` are counted as zero.  Factorizations
/// of singular matrices succeed and report `null > 0`, but any subsequent
/// solve fails with [`LinearSolverError::Singular`].
///
/// Factors are computed in double precision.  Storage and work are O(n²)
/// and O(n³) respectively, so this backend is intended for small problems
/// and for cross-checking the sparse solvers.
pub struct DenseLdlLinearSolver<T: FloatT> {
    pivot_tolerance: T,
    factors: Option<Lblt<f64>>,
    // n x 1 right hand side, solved in place
    rhs: Mat<f64>,
    inertia: Option<Inertia>,
}

impl<T> DenseLdlLinearSolver<T>
where
    T: FloatT,
{
    pub fn new(pivot_tolerance: T) -> Self {
        Self {
            pivot_tolerance,
            factors: None,
            rhs: Mat::zeros(0, 1),
            inertia: None,
        }
    }
}

fn to_f64<T: FloatT>(v: T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

// expand an upper triangular CSC matrix into a full dense matrix
fn dense_symmetric<T: FloatT>(M: &CscMatrix<T>) -> Mat<f64> {
    let mut A = Mat::<f64>::zeros(M.n, M.n);
    for col in 0..M.n {
        for k in M.colptr[col]..M.colptr[col + 1] {
            let row = M.rowval[k];
            let v = to_f64(M.nzval[k]);
            A[(row, col)] = v;
            A[(col, row)] = v;
        }
    }
    A
}

fn count_eigenvalue(inertia: &mut Inertia, λ: f64, tol: f64) {
    if λ.abs() <= tol {
        inertia.null += 1;
    } else if λ > 0. {
        inertia.positive += 1;
    } else {
        inertia.negative += 1;
    }
}

// inertia of the block diagonal factor.  A nonzero subdiagonal entry
// marks the start of a 2x2 block.
fn block_diagonal_inertia(diag: &[f64], subdiag: &[f64], tol: f64) -> Inertia {
    let n = diag.len();
    let mut inertia = Inertia::default();
    let mut k = 0;
    while k < n {
        match subdiag.get(k) {
            Some(&b) if k + 1 < n && b != 0. => {
                let (a, c) = (diag[k], diag[k + 1]);
                let mid = 0.5 * (a + c);
                let rad = (0.5 * (a - c)).hypot(b);
                count_eigenvalue(&mut inertia, mid + rad, tol);
                count_eigenvalue(&mut inertia, mid - rad, tol);
                k += 2;
            }
            _ => {
                count_eigenvalue(&mut inertia, diag[k], tol);
                k += 1;
            }
        }
    }
    inertia
}

impl<T> LinearSolver<T> for DenseLdlLinearSolver<T>
where
    T: FloatT,
{
    fn factorize(&mut self, matrix: &CscMatrix<T>) -> Result<Inertia, LinearSolverError> {
        self.inertia = None;
        self.factors = None;
        check_input(matrix)?;

        let n = matrix.n;
        let A = dense_symmetric(matrix);
        let lblt = Lblt::new(A.as_ref(), Side::Lower);

        let diag: Vec<f64> = lblt.B_diag().column_vector().iter().copied().collect();
        let subdiag: Vec<f64> = lblt.B_subdiag().column_vector().iter().copied().collect();

        // finite input, so non-finite pivots come from eliminating a zero column
        if !diag.is_finite() || !subdiag.is_finite() {
            return Err(LinearSolverError::Singular);
        }

        let nT: T = n.as_T();
        let tol = to_f64(T::max(
            self.pivot_tolerance,
            nT * T::epsilon() * matrix.max_abs(),
        ));
        let inertia = block_diagonal_inertia(&diag, &subdiag, tol);

        self.factors = Some(lblt);
        self.rhs = Mat::zeros(n, 1);
        self.inertia = Some(inertia);
        Ok(inertia)
    }

    fn solve(&mut self, x: &mut [T], b: &[T]) -> Result<(), LinearSolverError> {
        let lblt = match (&self.factors, self.inertia) {
            (Some(lblt), Some(inertia)) if !inertia.is_singular() => lblt,
            _ => return Err(LinearSolverError::Singular),
        };

        let n = self.rhs.nrows();
        assert_eq!(x.len(), n);
        assert_eq!(b.len(), n);

        for (i, &bi) in b.iter().enumerate() {
            self.rhs[(i, 0)] = to_f64(bi);
        }
        lblt.solve_in_place(self.rhs.as_mut());

        for (i, xi) in x.iter_mut().enumerate() {
            *xi = T::from_f64(self.rhs[(i, 0)]).ok_or_else(|| {
                LinearSolverError::NumericalBreakdown("solution not representable".to_string())
            })?;
        }

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
        "dense"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triu(n: usize, entries: &[(usize, usize, f64)]) -> CscMatrix<f64> {
        let I: Vec<usize> = entries.iter().map(|e| e.0).collect();
        let J: Vec<usize> = entries.iter().map(|e| e.1).collect();
        let V: Vec<f64> = entries.iter().map(|e| e.2).collect();
        CscMatrix::new_from_triplets(n, n, &I, &J, &V)
    }

    #[test]
    fn test_two_by_two_pivot() {
        // zero diagonal forces a 2x2 block
        let A = triu(2, &[(0, 0, 0.), (0, 1, 1.), (1, 1, 0.)]);
        let mut solver = DenseLdlLinearSolver::new(0.0);
        assert_eq!(solver.factorize(&A), Ok(Inertia::new(1, 1, 0)));

        let mut x = [0.; 2];
        solver.solve(&mut x, &[3., 5.]).unwrap();
        assert!(x.norm_inf_diff(&[5., 3.]) < 1e-15);
    }

    #[test]
    fn test_block_diagonal_inertia() {
        // blocks [2], [[1 3];[3 1]] (eigenvalues 4, -2), [-1] and [1e-20]
        let diag = [2., 1., 1., -1., 1e-20];
        let subdiag = [0., 3., 0., 0., 0.];
        assert_eq!(
            block_diagonal_inertia(&diag, &subdiag, 1e-16),
            Inertia::new(2, 2, 1)
        );

        // singular 2x2 block [[1 1];[1 1]]
        assert_eq!(
            block_diagonal_inertia(&[1., 1.], &[1., 0.], 1e-16),
            Inertia::new(1, 0, 1)
        );
    }

    #[test]
    fn test_pivoting_solve() {
        // small leading diagonal with large off diagonal entries
        let A = triu(
            3,
            &[
                (0, 0, 1e-3),
                (0, 1, 1.),
                (1, 1, 10.),
                (0, 2, 2.),
                (1, 2, 0.5),
                (2, 2, -4.),
            ],
        );
        let xref = [1., 2., -3.];
        let mut b = [0.; 3];
        A.sym().symv(&mut b, &xref, 1.0, 0.0);

        let mut solver = DenseLdlLinearSolver::new(0.0);
        let inertia = solver.factorize(&A).unwrap();
        assert_eq!(inertia.dim(), 3);
        assert_eq!(inertia.null, 0);

        let mut x = [0.; 3];
        solver.solve(&mut x, &b).unwrap();
        assert!(x.norm_inf_diff(&xref) < 1e-12);
    }

    #[test]
    fn test_singular_counts_null() {
        let A = triu(3, &[(0, 0, -2.), (1, 1, 1.), (1, 2, 1.), (2, 2, 1.)]);
        let mut solver = DenseLdlLinearSolver::new(0.0);
        assert_eq!(solver.factorize(&A), Ok(Inertia::new(1, 1, 1)));

        let mut x = [0.; 3];
        assert_eq!(
            solver.solve(&mut x, &[1., 1., 1.]),
            Err(LinearSolverError::Singular)
        );
    }
}
