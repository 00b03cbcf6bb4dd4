use crate::solver::core::linsolvers::LinearSolverError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// The requested linear solver is not available
    #[error(transparent)]
    LinearSolver(#[from] LinearSolverError),
}
