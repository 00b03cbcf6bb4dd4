use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

fn _scale_or_reset<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }
}

#[allow(non_snake_case)]
fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert!(x.len() == A.n);
    assert!(y.len() == A.n);
    assert!(A.n == A.m);

    _scale_or_reset(y, b);

    for (col, &xcol) in x.iter().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];
        let rows = &A.rowval[first..last];
        let nzvals = &A.nzval[first..last];

        for (&row, &Aij) in zip(rows, nzvals) {
            y[row] += a * Aij * xcol;

            if row != col {
                //don't double up on the diagonal
                y[col] += a * Aij * x[row];
            }
        }
    }
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    _scale_or_reset(y, b);

    if a == T::zero() {
        return;
    }

    for (j, &xj) in x.iter().enumerate() {
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += a * A.nzval[i] * xj;
        }
    }
}

// sparse matrix-vector multiply, transposed
#[allow(non_snake_case)]
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    _scale_or_reset(y, b);

    if a == T::zero() {
        return;
    }

    for (j, yj) in y.iter_mut().enumerate() {
        for k in A.colptr[j]..A.colptr[j + 1] {
            *yj += a * A.nzval[k] * x[A.rowval[k]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        // [1.  ⋅   2.]
        // [⋅   3.  ⋅ ]
        CscMatrix::new(2, 3, vec![0, 1, 2, 3], vec![0, 1, 0], vec![1., 3., 2.])
    }

    #[test]
    fn test_gemv() {
        let A = test_matrix();
        let x = vec![1., 2., 3.];
        let mut y = vec![1., 1.];
        A.gemv(&mut y, &x, 1.0, 2.0);
        assert_eq!(y, vec![9., 8.]);

        let mut z = vec![0.; 3];
        A.t().gemv(&mut z, &[1., -1.], 2.0, 0.0);
        assert_eq!(z, vec![2., -6., 4.]);
    }

    #[test]
    fn test_symv() {
        // triu of [2 1; 1 4]
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![2., 1., 4.]);
        let mut y = vec![0.; 2];
        P.sym().symv(&mut y, &[1., 1.], 1.0, 0.0);
        assert_eq!(y, vec![3., 5.]);
    }
}
