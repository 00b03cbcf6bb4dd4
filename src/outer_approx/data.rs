use super::{ObjectiveSense, TerminationCondition};
use crate::timers::Timers;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Final record of an outer approximation solve
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OaResults {
    pub termination_condition: TerminationCondition,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// number of master iterations performed
    pub iterations: u32,
    /// wall clock time of the solve (seconds)
    pub solve_time: f64,
    /// objective of the incumbent, if a feasible point was found
    pub best_objective: Option<f64>,
    pub best_solution: Option<Vec<f64>>,
}

impl Default for OaResults {
    fn default() -> Self {
        Self {
            termination_condition: TerminationCondition::Unknown,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
            iterations: 0,
            solve_time: 0.,
            best_objective: None,
            best_solution: None,
        }
    }
}

/// Mutable state of an outer approximation solve, passed to every phase
/// of the loop.
#[derive(Debug)]
pub struct SolveData {
    pub objective_sense: ObjectiveSense,
    /// lower bound on the MINLP objective
    pub lb: f64,
    /// upper bound on the MINLP objective
    pub ub: f64,
    pub lb_progress: Vec<f64>,
    pub ub_progress: Vec<f64>,
    pub mip_iter: u32,
    pub mip_subiter: u32,
    /// rounded integer assignment of the previous master solution
    pub prev_int_sol: Option<Vec<i64>>,
    pub curr_int_sol: Vec<i64>,
    pub best_objective: Option<f64>,
    pub best_solution: Option<Vec<f64>>,
    pub results: OaResults,
    pub timers: Timers,
}

impl SolveData {
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective_sense,
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
            lb_progress: vec![f64::NEG_INFINITY],
            ub_progress: vec![f64::INFINITY],
            mip_iter: 0,
            mip_subiter: 0,
            prev_int_sol: None,
            curr_int_sol: vec![],
            best_objective: None,
            best_solution: None,
            results: OaResults::default(),
            timers: Timers::default(),
        }
    }

    /// Append a lower bound to the progress record.  A value below the
    /// last recorded one is recorded as the last one instead.  Returns the
    /// recorded value.
    pub fn push_lb(&mut self, lb: f64) -> f64 {
        let lb = match self.lb_progress.last() {
            Some(&prev) if !(lb >= prev) => prev,
            _ => lb,
        };
        self.lb_progress.push(lb);
        lb
    }

    /// Append an upper bound to the progress record.  A value above the
    /// last recorded one is recorded as the last one instead.  Returns the
    /// recorded value.
    pub fn push_ub(&mut self, ub: f64) -> f64 {
        let ub = match self.ub_progress.last() {
            Some(&prev) if !(ub <= prev) => prev,
            _ => ub,
        };
        self.ub_progress.push(ub);
        ub
    }

    /// `LB + bound_tolerance >= UB`
    pub fn bounds_converged(&self, bound_tolerance: f64) -> bool {
        self.lb + bound_tolerance >= self.ub
    }

    /// Record `solution` as the incumbent if `objective` improves on it.
    /// Returns true if the incumbent changed.
    pub fn update_incumbent(&mut self, objective: f64, solution: &[f64]) -> bool {
        let improved = match (self.best_objective, self.objective_sense) {
            (None, _) => true,
            (Some(best), ObjectiveSense::Minimize) => objective < best,
            (Some(best), ObjectiveSense::Maximize) => objective > best,
        };
        if improved {
            self.best_objective = Some(objective);
            self.best_solution = Some(solution.to_vec());
        }
        improved
    }

    pub(crate) fn elapsed(&self) -> f64 {
        self.timers.elapsed("main").as_secs_f64()
    }

    /// Copy the final bounds, counters and incumbent into the results record.
    pub(crate) fn finalize(&mut self) -> OaResults {
        let mut results = self.results.clone();
        results.lower_bound = self.lb;
        results.upper_bound = self.ub;
        results.iterations = self.mip_iter;
        results.solve_time = self.elapsed();
        results.best_objective = self.best_objective;
        results.best_solution = self.best_solution.clone();
        self.results = results.clone();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamping() {
        let mut data = SolveData::new(ObjectiveSense::Minimize);

        assert_eq!(data.push_lb(1.0), 1.0);
        assert_eq!(data.push_lb(0.5), 1.0);
        assert_eq!(data.push_lb(f64::NAN), 1.0);
        assert_eq!(data.push_lb(2.0), 2.0);
        assert_eq!(data.lb_progress, vec![f64::NEG_INFINITY, 1.0, 1.0, 1.0, 2.0]);

        assert_eq!(data.push_ub(5.0), 5.0);
        assert_eq!(data.push_ub(6.0), 5.0);
        assert_eq!(data.push_ub(4.0), 4.0);
        assert_eq!(data.ub_progress, vec![f64::INFINITY, 5.0, 5.0, 4.0]);
    }

    #[test]
    fn test_incumbent() {
        let mut data = SolveData::new(ObjectiveSense::Maximize);
        assert!(data.update_incumbent(1.0, &[1.0, 0.0]));
        assert!(!data.update_incumbent(0.5, &[0.0, 0.0]));
        assert!(data.update_incumbent(3.0, &[1.0, 1.0]));
        assert_eq!(data.best_objective, Some(3.0));
        assert_eq!(data.best_solution, Some(vec![1.0, 1.0]));

        data.lb = 2.99995;
        data.ub = 3.0;
        assert!(data.bounds_converged(1e-4));
        assert!(!data.bounds_converged(1e-6));
    }
}
