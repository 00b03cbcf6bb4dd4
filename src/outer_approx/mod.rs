//! Outer approximation loop for mixed-integer nonlinear programs.
//!
//! The loop alternates between a mixed-integer master problem, which
//! gives an optimistic bound and an integer assignment, and an NLP with
//! the integers fixed at that assignment, which gives a feasible bound
//! and the point at which new cuts are added to the master.  Both problems
//! are solved externally through the [`MinlpProblem`] trait.
//!
//! ```no_run
//! # use ipoa::outer_approx::*;
//! # fn run(problem: &mut dyn MinlpProblem) -> Result<(), OaError> {
//! let mut config = OaConfigBuilder::default()
//!     .iteration_limit(20)
//!     .add_nogood_cuts(true)
//!     .build()
//!     .unwrap();
//!
//! config.set_after_master_solve(|_, data| {
//!     println!("LB after iteration {}: {}", data.mip_iter, data.lb);
//!     Ok(())
//! });
//!
//! let results = solve(problem, &mut config)?;
//! println!("{:?}", results.termination_condition);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod callbacks;
mod config;
mod data;
pub mod handlers;
mod iterate;
mod traits;

pub use callbacks::*;
pub use config::*;
pub use data::*;
pub use iterate::*;
pub use traits::*;

/// Error type returned by the outer approximation loop
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OaError {
    #[error("strategy {0} is not implemented")]
    NotImplemented(OaStrategy),
    #[error("sub-solver failed: {0}")]
    SubSolver(String),
    #[error("callback failed: {0}")]
    Callback(#[from] CallbackError),
}
