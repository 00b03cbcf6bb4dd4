mod core;
mod matrix_math;
