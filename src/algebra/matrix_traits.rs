use crate::algebra::{Adjoint, MatrixShape, Symmetric};

pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn shape(&self) -> MatrixShape;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

impl<M> ShapedMatrix for Adjoint<'_, M>
where
    M: ShapedMatrix,
{
    fn nrows(&self) -> usize {
        self.src.ncols()
    }
    fn ncols(&self) -> usize {
        self.src.nrows()
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::T
    }
}

impl<M> ShapedMatrix for Symmetric<'_, M>
where
    M: ShapedMatrix,
{
    fn nrows(&self) -> usize {
        self.src.nrows()
    }
    fn ncols(&self) -> usize {
        self.src.ncols()
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}
