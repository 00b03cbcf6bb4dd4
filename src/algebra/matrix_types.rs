// All matrices passed between the model, the KKT assembler and
// the linear solvers are in standard compressed sparse column format.

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transposed) view of a matrix
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Symmetric view of a matrix holding only its upper triangle
#[derive(Debug, Clone, Copy)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}
