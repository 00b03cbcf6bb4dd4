//! Primal-dual interior point solver for smooth nonlinear programs.
//!
//! A problem is supplied as an [`NlpModel`](crate::solver::core::traits::NlpModel)
//! wrapped in an [`InteriorPointInterface`], which owns the iterate.  The
//! [`InteriorPointSolver`] drives the iteration, factoring each KKT system
//! with inertia correction.

mod info;
mod info_print;
mod interface;
mod settings;
mod solver;

pub use info::*;
pub use interface::*;
pub use settings::*;
pub use solver::*;
