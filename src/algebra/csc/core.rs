#![allow(non_snake_case)]

use crate::algebra::{Adjoint, CscMatrix, FloatT, MatrixShape, ShapedMatrix, SparseFormatError, Symmetric};
use itertools::Itertools;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use ipoa::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Responsibility for ensuring these conditions hold
    /// is left to the caller.
    ///
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// Assemble a matrix from (row, column, value) triplets.
    ///
    /// Entries are sorted by column and then by row.  Repeated
    /// (row, column) pairs are summed into a single entry.  Explicit
    /// zeros are kept as structural entries.
    ///
    /// # Panics
    /// Panics if the triplet vectors have different lengths or if any
    /// index is out of bounds.
    ///
    /// ```no_run
    /// use ipoa::algebra::CscMatrix;
    ///
    /// // [1.  0.]
    /// // [2.  3.]
    /// let A : CscMatrix<f64> = CscMatrix::new_from_triplets(
    ///     2, 2, &[0, 1, 1], &[0, 0, 1], &[1., 2., 3.]);
    /// assert_eq!(A.nnz(), 3);
    /// ```
    pub fn new_from_triplets(m: usize, n: usize, I: &[usize], J: &[usize], V: &[T]) -> Self {
        assert_eq!(I.len(), J.len());
        assert_eq!(I.len(), V.len());
        assert!(I.iter().all(|&i| i < m), "triplet row index out of bounds");
        assert!(J.iter().all(|&j| j < n), "triplet column index out of bounds");

        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(I.len());
        let mut nzval = Vec::with_capacity(I.len());

        let mut last = None;
        for k in (0..I.len()).sorted_by_key(|&k| (J[k], I[k])) {
            let entry = (I[k], J[k]);
            if last == Some(entry) {
                if let Some(v) = nzval.last_mut() {
                    *v += V[k];
                }
                continue;
            }
            rowval.push(entry.0);
            nzval.push(V[k]);
            colptr[entry.1 + 1] += 1;
            last = Some(entry);
        }

        //cumsum the column counts
        for col in 0..n {
            colptr[col + 1] += colptr[col];
        }

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```no_run
    /// use ipoa::algebra::CscMatrix;
    /// let m = 3;
    /// let n = 4;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(m,n,0);
    /// ```
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// An m x n matrix with no structural entries
    pub fn zeros(m: usize, n: usize) -> Self {
        CscMatrix::new(m, n, vec![0; n + 1], vec![], vec![])
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowval);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        (0..self.n).all(|col| {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            rows.iter().all(|&row| row <= col)
        })
    }

    /// Returns the position in `nzval` of the given (row,col) entry,
    /// or None if it is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn entry_index(&self, idx: (usize, usize)) -> Option<usize> {
        let (row, col) = idx;
        assert!(row < self.nrows() && col < self.ncols());

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        self.rowval[first..last]
            .binary_search(&row)
            .ok()
            .map(|k| first + k)
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        self.entry_index(idx).map(|k| self.nzval[k])
    }

    /// Largest absolute value of any stored entry
    pub fn max_abs(&self) -> T {
        self.nzval.iter().fold(T::zero(), |m, &v| T::max(m, v.abs()))
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
    fn is_square(&self) -> bool {
        self.m == self.n
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::new(
        6,                                                                 // m
        5,                                                                 // n
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    );

    assert_eq!(A.get_entry((1, 0)), Some(1.));
    assert_eq!(A.get_entry((5, 1)), Some(9.));
    assert_eq!(A.get_entry((4, 4)), Some(14.));
    assert_eq!(A.entry_index((3, 2)), Some(9));

    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((2, 3)).is_none());
    assert!(A.get_entry((3, 4)).is_none());
    assert!(!A.is_triu());
}

#[test]
fn test_csc_from_triplets() {
    // [1.  ⋅   ⋅ ]
    // [⋅   0.  5.]
    // [2.  ⋅   ⋅ ]
    // with the (1,2) entry given as two parts and an explicit zero at (1,1)
    let I = [2, 0, 1, 1, 1];
    let J = [0, 0, 2, 1, 2];
    let V = [2., 1., 3., 0., 2.];
    let A = CscMatrix::<f64>::new_from_triplets(3, 3, &I, &J, &V);

    assert!(A.check_format().is_ok());
    assert_eq!(A.colptr, vec![0, 2, 3, 4]);
    assert_eq!(A.rowval, vec![0, 2, 1, 1]);
    assert_eq!(A.nzval, vec![1., 2., 0., 5.]);
    assert_eq!(A.max_abs(), 5.);
}
