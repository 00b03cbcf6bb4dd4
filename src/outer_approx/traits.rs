use super::{MipSolverArgs, OaConfig, OaError, SolveData};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of optimization of the MINLP objective
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Termination condition reported by a sub-solver, and by the outer
/// approximation loop itself.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationCondition {
    Optimal,
    LocallyOptimal,
    Infeasible,
    MaxIterations,
    MaxTimeLimit,
    /// A feasible point was found but its optimality is not established.
    Feasible,
    Other,
    #[default]
    Unknown,
}

impl std::fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of a master or fixed-integer NLP solve.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubSolverResults {
    pub termination_condition: TerminationCondition,
    /// best proven lower bound on the sub-problem objective
    pub lower_bound: f64,
    /// best proven upper bound on the sub-problem objective
    pub upper_bound: f64,
    /// objective value at the returned point
    pub objective: f64,
    /// values of all variables at the returned point, empty if none
    pub solution: Vec<f64>,
}

impl SubSolverResults {
    /// Results with no bounds and no solution
    pub fn new(termination_condition: TerminationCondition) -> Self {
        Self {
            termination_condition,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            objective: f64::NAN,
            solution: vec![],
        }
    }
}

/// The MINLP as seen by the outer approximation loop.
///
/// Implementors own the master problem (a MILP relaxation carrying the
/// accumulated cuts) and the fixed-integer NLP subproblem, and solve both
/// with external solvers.  The loop never inspects either model directly.
pub trait MinlpProblem {
    fn objective_sense(&self) -> ObjectiveSense;

    /// Solve the master problem with the given solver arguments.
    fn solve_master(
        &mut self,
        data: &SolveData,
        args: &MipSolverArgs,
    ) -> Result<SubSolverResults, OaError>;

    /// Solve the NLP with integer variables fixed at the values of the
    /// most recent master solution.
    fn solve_fixed_nlp(
        &mut self,
        data: &SolveData,
        config: &OaConfig,
    ) -> Result<SubSolverResults, OaError>;

    /// Values of the integer variables in the most recent master solution
    fn master_integer_values(&self) -> Vec<f64>;

    /// Add linearizations of the nonlinear constraints at the most recent
    /// NLP solution to the master problem.  Constraints whose duals are
    /// below `zero_tolerance` in magnitude may be skipped.
    fn add_oa_cuts(&mut self, data: &SolveData, zero_tolerance: f64) -> Result<(), OaError>;

    /// Add a cut separating the most recent infeasible integer assignment.
    fn add_feasibility_cut(&mut self, data: &SolveData, zero_tolerance: f64)
        -> Result<(), OaError>;

    /// Add a cut excluding the current integer assignment.
    fn add_nogood_cut(&mut self, data: &SolveData) -> Result<(), OaError>;

    fn deactivate_last_nogood_cut(&mut self) -> Result<(), OaError>;

    /// True if the master solver keeps its model between solves and must
    /// be reloaded after the master problem is modified.
    fn is_persistent(&self) -> bool {
        false
    }

    /// Reload the master problem into a persistent master solver.
    fn set_instance(&mut self) -> Result<(), OaError> {
        Ok(())
    }
}
