#![allow(non_snake_case)]
use crate::algebra::*;
use crate::solver::core::linsolvers::Inertia;

/// Primal-dual KKT matrix with its right hand side.
///
/// Variables are ordered `[x, s, y_eq, y_ineq]`, and the matrix
///
/// ```text
///   [ W + Σx     0     Jcᵀ   Jdᵀ ]
///   [ 0          Σs    0     -I  ]
///   [ Jc         0     0     0   ]
///   [ Jd        -I     0     0   ]
/// ```
///
/// is held as its upper triangle.  Every diagonal entry is structurally
/// present, so regularizing the diagonal never changes the sparsity
/// pattern.
#[derive(Debug, Clone)]
pub struct KktMatrix<T> {
    pub matrix: CscMatrix<T>,
    pub rhs: Vec<T>,
    pub n_primals: usize,
    pub n_eq: usize,
    pub n_ineq: usize,
    /// barrier parameter the system was assembled at
    pub barrier: T,
    // position of each diagonal entry in matrix.nzval
    diag_idx: Vec<usize>,
}

impl<T> KktMatrix<T>
where
    T: FloatT,
{
    /// Assemble a KKT system from its blocks.
    ///
    /// `hessian` is the upper triangle of the Lagrangian Hessian `W`,
    /// `sigma_x` and `sigma_s` the barrier diagonals.  Entries of
    /// `hessian` below the diagonal are reflected into the upper triangle.
    ///
    /// # Panics
    /// Panics if the block dimensions are inconsistent.
    pub fn from_blocks(
        hessian: &CscMatrix<T>,
        jac_eq: &CscMatrix<T>,
        jac_ineq: &CscMatrix<T>,
        sigma_x: &[T],
        sigma_s: &[T],
        rhs: Vec<T>,
        barrier: T,
    ) -> Self {
        let n = hessian.ncols();
        let (m_eq, m_ineq) = (jac_eq.nrows(), jac_ineq.nrows());
        assert_eq!(hessian.size(), (n, n));
        assert_eq!(jac_eq.ncols(), n);
        assert_eq!(jac_ineq.ncols(), n);
        assert_eq!(sigma_x.len(), n);
        assert_eq!(sigma_s.len(), m_ineq);

        let dim = n + m_ineq + m_eq + m_ineq;
        assert_eq!(rhs.len(), dim);

        let (s_off, ye_off, yi_off) = (n, n + m_ineq, n + m_ineq + m_eq);

        let nnz = hessian.nnz() + jac_eq.nnz() + jac_ineq.nnz() + dim + m_ineq;
        let mut I = Vec::with_capacity(nnz);
        let mut J = Vec::with_capacity(nnz);
        let mut V = Vec::with_capacity(nnz);
        let mut push = |row: usize, col: usize, v: T| {
            I.push(usize::min(row, col));
            J.push(usize::max(row, col));
            V.push(v);
        };

        // W + Σx
        for col in 0..n {
            for k in hessian.colptr[col]..hessian.colptr[col + 1] {
                push(hessian.rowval[k], col, hessian.nzval[k]);
            }
        }
        for (i, &σ) in sigma_x.iter().enumerate() {
            push(i, i, σ);
        }

        // Σs and the slack coupling -I
        for (i, &σ) in sigma_s.iter().enumerate() {
            push(s_off + i, s_off + i, σ);
            push(s_off + i, yi_off + i, -T::one());
        }

        // Jcᵀ and Jdᵀ above the diagonal
        for (jac, off) in [(jac_eq, ye_off), (jac_ineq, yi_off)] {
            for col in 0..n {
                for k in jac.colptr[col]..jac.colptr[col + 1] {
                    push(col, off + jac.rowval[k], jac.nzval[k]);
                }
            }
        }

        // structural zeros on the constraint dual diagonal
        for i in ye_off..dim {
            push(i, i, T::zero());
        }

        let matrix = CscMatrix::new_from_triplets(dim, dim, &I, &J, &V);

        // every column holds its diagonal as its last entry
        let diag_idx = (0..dim).map(|col| matrix.colptr[col + 1] - 1).collect();

        Self {
            matrix,
            rhs,
            n_primals: n,
            n_eq: m_eq,
            n_ineq: m_ineq,
            barrier,
            diag_idx,
        }
    }

    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    /// Inertia required of the KKT matrix for the Newton step to be a
    /// descent direction: positive on the primal space, negative on the
    /// constraint dual space and no zero eigenvalues.
    pub fn expected_inertia(&self) -> Inertia {
        Inertia::new(
            self.n_primals + self.n_ineq,
            self.n_eq + self.n_ineq,
            0,
        )
    }

    /// Returns a copy of the system with `primal` added to the `x`
    /// diagonal and `dual` subtracted from the constraint dual diagonal.
    pub fn regularized(&self, primal: T, dual: T) -> Self {
        let mut out = self.clone();
        let nzval = &mut out.matrix.nzval;
        let ye_off = self.n_primals + self.n_ineq;

        for &k in &self.diag_idx[0..self.n_primals] {
            nzval[k] += primal;
        }
        for &k in &self.diag_idx[ye_off..] {
            nzval[k] -= dual;
        }
        out
    }

    /// Diagonal of the KKT matrix
    pub fn diagonal(&self) -> Vec<T> {
        self.diag_idx.iter().map(|&k| self.matrix.nzval[k]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_system() -> KktMatrix<f64> {
        // n = 2, one equality, one inequality
        let H = CscMatrix::new_from_triplets(2, 2, &[0, 0], &[0, 1], &[2., 1.]);
        let Je = CscMatrix::new_from_triplets(1, 2, &[0, 0], &[0, 1], &[1., 1.]);
        let Ji = CscMatrix::new_from_triplets(1, 2, &[0], &[1], &[3.]);
        KktMatrix::from_blocks(&H, &Je, &Ji, &[0.5, 0.], &[4.], vec![0.; 5], 0.1)
    }

    #[test]
    fn test_block_layout() {
        let kkt = small_system();
        let K = &kkt.matrix;

        assert_eq!(kkt.dim(), 5);
        assert!(K.is_triu());
        assert!(K.check_format().is_ok());
        assert_eq!(kkt.expected_inertia(), Inertia::new(3, 2, 0));

        assert_eq!(kkt.diagonal(), vec![2.5, 0., 4., 0., 0.]);
        assert_eq!(K.get_entry((0, 1)), Some(1.));
        // slack coupling
        assert_eq!(K.get_entry((2, 4)), Some(-1.));
        // Jcᵀ
        assert_eq!(K.get_entry((0, 3)), Some(1.));
        assert_eq!(K.get_entry((1, 3)), Some(1.));
        // Jdᵀ
        assert_eq!(K.get_entry((1, 4)), Some(3.));
        assert_eq!(K.get_entry((0, 4)), None);
        assert_eq!(K.get_entry((3, 4)), None);
    }

    #[test]
    fn test_regularized_copy() {
        let kkt = small_system();
        let reg = kkt.regularized(1e-4, 1e-8);

        assert_eq!(reg.matrix.colptr, kkt.matrix.colptr);
        assert_eq!(reg.matrix.rowval, kkt.matrix.rowval);
        assert_eq!(
            reg.diagonal(),
            vec![2.5 + 1e-4, 1e-4, 4., -1e-8, -1e-8]
        );
        // the source is untouched
        assert_eq!(kkt.diagonal(), vec![2.5, 0., 4., 0., 0.]);
    }
}
