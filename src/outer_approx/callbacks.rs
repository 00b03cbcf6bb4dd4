use super::{MinlpProblem, SolveData};
use thiserror::Error;

/// Error returned by a user callback.  It stops the solve and is passed
/// back to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl From<&str> for CallbackError {
    fn from(msg: &str) -> Self {
        CallbackError(msg.to_string())
    }
}

pub type CallbackFcn =
    Box<dyn FnMut(&dyn MinlpProblem, &SolveData) -> Result<(), CallbackError> + Send>;

// ---------------------------------
// enum for managing callbacks
// ---------------------------------

#[derive(Default)]
pub enum Callback {
    #[default]
    None,
    Rust(CallbackFcn),
}

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&dyn MinlpProblem, &SolveData) -> Result<(), CallbackError> + Send + 'static,
    {
        Callback::Rust(Box::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Callback::None)
    }

    pub(crate) fn call(
        &mut self,
        problem: &dyn MinlpProblem,
        data: &SolveData,
    ) -> Result<(), CallbackError> {
        match self {
            Callback::None => Ok(()),
            Callback::Rust(f) => f(problem, data),
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::None => write!(f, "Callback::None"),
            Callback::Rust(_) => write!(f, "Callback::Rust(..)"),
        }
    }
}

/// Callbacks run after each phase of an outer approximation iteration
#[derive(Debug, Default)]
pub struct OaCallbacks {
    pub after_master_solve: Callback,
    pub after_subproblem_solve: Callback,
}
