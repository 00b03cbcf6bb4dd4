//! Solver implementations built on the core components.

pub mod interior_point;
