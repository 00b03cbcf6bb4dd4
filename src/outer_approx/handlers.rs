//! Responses to the termination conditions of the master and NLP solves.

use super::*;
use tracing::{debug, info, warn};

// ---------------------------------
// master problem
// ---------------------------------

/// Tighten the optimistic bound with the master solution's bound.
pub fn handle_master_optimal(master: &SubSolverResults, data: &mut SolveData) {
    match data.objective_sense {
        ObjectiveSense::Minimize => {
            data.lb = f64::max(data.lb, master.lower_bound);
            data.push_lb(data.lb);
        }
        ObjectiveSense::Maximize => {
            data.ub = f64::min(data.ub, master.upper_bound);
            data.push_ub(data.ub);
        }
    }
    info!(
        "MILP {}: OBJ: {}  LB: {}  UB: {}",
        data.mip_iter, master.objective, data.lb, data.ub
    );
}

/// The master problem has no remaining integer assignment.  The
/// optimistic bound collapses and the incumbent, if any, is optimal.
pub fn handle_master_infeasible(data: &mut SolveData) {
    info!("MILP master problem is infeasible. Problem may have no more feasible integer configurations.");
    if data.mip_iter == 1 {
        warn!("Initial master problem is infeasible. The initial cuts may be of poor quality.");
    }

    match data.objective_sense {
        ObjectiveSense::Minimize => {
            data.lb = f64::INFINITY;
            data.push_lb(data.ub);
        }
        ObjectiveSense::Maximize => {
            data.ub = f64::NEG_INFINITY;
            data.push_ub(data.lb);
        }
    }

    data.results.termination_condition = match data.best_objective {
        Some(_) => TerminationCondition::Optimal,
        None => TerminationCondition::Infeasible,
    };
}

/// The master solve stopped early.  A bound reported by the master
/// solver is still valid and is used if finite.
pub fn handle_master_other(master: &SubSolverResults, data: &mut SolveData) {
    warn!(
        "MILP master problem returned {} at iteration {}",
        master.termination_condition, data.mip_iter
    );

    match master.termination_condition {
        TerminationCondition::MaxTimeLimit
        | TerminationCondition::MaxIterations
        | TerminationCondition::Feasible => match data.objective_sense {
            ObjectiveSense::Minimize if master.lower_bound.is_finite() => {
                data.lb = f64::max(data.lb, master.lower_bound);
                data.push_lb(data.lb);
            }
            ObjectiveSense::Maximize if master.upper_bound.is_finite() => {
                data.ub = f64::min(data.ub, master.upper_bound);
                data.push_ub(data.ub);
            }
            _ => (),
        },
        _ => (),
    }
}

// ---------------------------------
// fixed NLP subproblem
// ---------------------------------

/// Update the feasible bound and the incumbent from an optimal NLP
/// solution, then add cuts at that solution.
pub fn handle_nlp_optimal(
    problem: &mut dyn MinlpProblem,
    nlp: &SubSolverResults,
    data: &mut SolveData,
    config: &OaConfig,
) -> Result<(), OaError> {
    let improved = match data.objective_sense {
        ObjectiveSense::Minimize => {
            let improved = nlp.objective < data.ub;
            data.ub = f64::min(data.ub, nlp.objective);
            data.push_ub(data.ub);
            improved
        }
        ObjectiveSense::Maximize => {
            let improved = nlp.objective > data.lb;
            data.lb = f64::max(data.lb, nlp.objective);
            data.push_lb(data.lb);
            improved
        }
    };
    if improved {
        data.update_incumbent(nlp.objective, &nlp.solution);
        debug!("new incumbent with objective {}", nlp.objective);
    }

    info!(
        "NLP {}: OBJ: {}  LB: {}  UB: {}",
        data.mip_iter, nlp.objective, data.lb, data.ub
    );

    problem.add_oa_cuts(data, config.zero_tolerance)?;
    if config.add_nogood_cuts {
        problem.add_nogood_cut(data)?;
    }
    Ok(())
}

/// Cut off the infeasible integer assignment.
pub fn handle_nlp_infeasible(
    problem: &mut dyn MinlpProblem,
    data: &mut SolveData,
    config: &OaConfig,
) -> Result<(), OaError> {
    info!("NLP subproblem was locally infeasible.");

    problem.add_feasibility_cut(data, config.zero_tolerance)?;
    if config.add_nogood_cuts {
        problem.add_nogood_cut(data)?;
    }
    Ok(())
}

/// The NLP solve stopped early.  Only a no-good cut can be added.
pub fn handle_nlp_other(
    problem: &mut dyn MinlpProblem,
    condition: TerminationCondition,
    data: &mut SolveData,
    config: &OaConfig,
) -> Result<(), OaError> {
    warn!(
        "NLP subproblem returned {} at iteration {}",
        condition, data.mip_iter
    );

    if config.add_nogood_cuts {
        problem.add_nogood_cut(data)?;
    }
    Ok(())
}

/// Dispatch an NLP result to its handler
pub(crate) fn handle_nlp(
    problem: &mut dyn MinlpProblem,
    nlp: &SubSolverResults,
    data: &mut SolveData,
    config: &OaConfig,
) -> Result<(), OaError> {
    match nlp.termination_condition {
        TerminationCondition::Optimal | TerminationCondition::LocallyOptimal => {
            handle_nlp_optimal(problem, nlp, data, config)
        }
        TerminationCondition::Infeasible => handle_nlp_infeasible(problem, data, config),
        other => handle_nlp_other(problem, other, data, config),
    }
}
