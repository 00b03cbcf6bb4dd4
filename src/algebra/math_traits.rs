use super::FloatT;

// All vector and matrix arithmetic used by the interior point
// iteration goes through these traits, implemented generically
// for floats of type FloatT.

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)

pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Apply an elementwise operation on a vector.
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries.
    fn negate(&mut self) -> &mut Self;

    /// Infinity norm.  Returns zero for an empty vector.
    fn norm_inf(&self) -> Self::T;

    /// Max absolute difference between `self` and `b`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    /// Maximum value in vector
    fn maximum(&self) -> Self::T;

    /// Checks if all elements are finite, i.e. no Infs or NaNs
    fn is_finite(&self) -> bool;

    //blas-like vector ops
    //--------------------

    /// BLAS-like shift and scale in place.  Produces `self = a*x+b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;
}

/// Matrix-vector products for matrices of [`FloatT`](crate::algebra::FloatT)

pub trait MatrixVectorMultiply {
    type T: FloatT;

    /// BLAS-like general matrix-vector multiply.  Produces `y = a*self*x + b*y`
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

pub trait SymMatrixVectorMultiply {
    type T: FloatT;

    /// BLAS-like symmetric matrix-vector multiply.  Produces `y = a*self*x + b*y`.
    /// The matrix source data should be triu.
    fn symv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}
