use super::{Callback, CallbackError, MinlpProblem, OaCallbacks, SolveData};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decomposition strategy of the MINLP loop.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OaStrategy {
    /// outer approximation
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "OA"))]
    OA,
    /// global outer approximation
    #[cfg_attr(feature = "serde", serde(rename = "GOA"))]
    GOA,
    /// extended cutting plane
    #[cfg_attr(feature = "serde", serde(rename = "ECP"))]
    ECP,
    /// generalized Benders decomposition
    #[cfg_attr(feature = "serde", serde(rename = "GBD"))]
    GBD,
    /// feasibility pump
    #[cfg_attr(feature = "serde", serde(rename = "FP"))]
    FP,
}

impl std::fmt::Display for OaStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Arguments forwarded to the master (MILP) solver
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MipSolverArgs {
    /// solver option statements appended to the generated model
    pub add_options: Vec<String>,
    /// named solver options
    pub options: Vec<(String, String)>,
}

/// Settings of the outer approximation loop

#[derive(Builder, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OaConfig {
    ///maximum number of master iterations
    #[builder(default = "50")]
    pub iteration_limit: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///the loop stops once `LB + bound_tolerance >= UB`
    #[builder(default = "1e-4")]
    pub bound_tolerance: f64,

    ///dual values below this are treated as zero when generating cuts
    #[builder(default = "1e-8")]
    pub zero_tolerance: f64,

    ///stop when the master problem returns the same integer assignment twice
    #[builder(default = "true")]
    pub cycling_check: bool,

    #[builder(default = "OaStrategy::OA")]
    pub strategy: OaStrategy,

    ///cuts are added inside the master solver and no NLP is solved by the loop
    #[builder(default = "false")]
    pub single_tree: bool,

    ///exclude each visited integer assignment from the master problem
    #[builder(default = "false")]
    pub add_nogood_cuts: bool,

    ///name of the master solver
    #[builder(default = r#""glpk".to_string()"#)]
    pub mip_solver: String,

    #[builder(default)]
    pub mip_solver_args: MipSolverArgs,

    #[builder(setter(skip))]
    #[cfg_attr(feature = "serde", serde(skip))]
    pub callbacks: OaCallbacks,
}

impl Default for OaConfig {
    fn default() -> OaConfig {
        OaConfigBuilder::default().build().unwrap()
    }
}

impl OaConfig {
    pub fn set_after_master_solve<F>(&mut self, f: F)
    where
        F: FnMut(&dyn MinlpProblem, &SolveData) -> Result<(), CallbackError> + Send + 'static,
    {
        self.callbacks.after_master_solve = Callback::new(f);
    }

    pub fn set_after_subproblem_solve<F>(&mut self, f: F)
    where
        F: FnMut(&dyn MinlpProblem, &SolveData) -> Result<(), CallbackError> + Send + 'static,
    {
        self.callbacks.after_subproblem_solve = Callback::new(f);
    }

    pub fn call_after_master_solve(
        &mut self,
        problem: &dyn MinlpProblem,
        data: &SolveData,
    ) -> Result<(), CallbackError> {
        self.callbacks.after_master_solve.call(problem, data)
    }

    pub fn call_after_subproblem_solve(
        &mut self,
        problem: &dyn MinlpProblem,
        data: &SolveData,
    ) -> Result<(), CallbackError> {
        self.callbacks.after_subproblem_solve.call(problem, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OaConfig::default();
        assert_eq!(config.iteration_limit, 50);
        assert_eq!(config.strategy, OaStrategy::OA);
        assert!(config.callbacks.after_master_solve.is_none());
        assert!(config.callbacks.after_subproblem_solve.is_none());

        let config = OaConfigBuilder::default()
            .strategy(OaStrategy::GOA)
            .add_nogood_cuts(true)
            .build()
            .unwrap();
        assert_eq!(config.strategy, OaStrategy::GOA);
        assert!(config.add_nogood_cuts);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() {
        let config = OaConfigBuilder::default()
            .strategy(OaStrategy::GOA)
            .iteration_limit(7)
            .time_limit(60.)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""strategy":"GOA""#));

        let back: OaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.iteration_limit, 7);
        assert_eq!(back.strategy, OaStrategy::GOA);
        assert!(back.callbacks.after_master_solve.is_none());
    }
}
