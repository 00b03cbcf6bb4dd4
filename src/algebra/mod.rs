//! Linear algebra types and operations used by the solvers.
//!
//! Matrices are held in compressed sparse column format, with symmetric
//! matrices (e.g. Hessians and KKT systems) stored as their upper triangle.

mod csc;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
mod vecmath;

pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
pub use matrix_types::*;
