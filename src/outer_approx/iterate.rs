use super::handlers::*;
use super::*;
use tracing::{debug, info};

/// Solve a MINLP by outer approximation.
///
/// Returns the results record once the loop terminates.  Errors of the
/// sub-solvers and of the user callbacks stop the solve and are returned.
pub fn solve(problem: &mut dyn MinlpProblem, config: &mut OaConfig) -> Result<OaResults, OaError> {
    let mut data = SolveData::new(problem.objective_sense());

    data.timers.start_as_current("main");
    let outcome = iteration_loop(problem, &mut data, config);
    data.timers.stop_current();
    outcome?;

    let results = data.finalize();
    info!(
        "outer approximation finished with {} after {} iterations. LB: {}  UB: {}",
        results.termination_condition, results.iterations, results.lower_bound, results.upper_bound
    );
    Ok(results)
}

/// Main loop of the outer approximation method.
///
/// Each iteration solves the master problem and then, unless cuts are
/// generated inside the master solver, the NLP with the integer variables
/// fixed at the master solution.  The termination condition is recorded
/// in `data.results`.
pub fn iteration_loop(
    problem: &mut dyn MinlpProblem,
    data: &mut SolveData,
    config: &mut OaConfig,
) -> Result<(), OaError> {
    if !matches!(config.strategy, OaStrategy::OA | OaStrategy::GOA) {
        return Err(OaError::NotImplemented(config.strategy));
    }

    let last_iter_cuts;

    // the iteration limit is one of the termination criteria
    loop {
        info!("---Master Iteration {}---", data.mip_iter);

        if algorithm_should_terminate(problem, data, config, false) {
            last_iter_cuts = true;
            break;
        }

        data.mip_subiter = 0;

        // solve the MILP master problem
        data.mip_iter += 1;
        let master = problem.solve_master(data, &config.mip_solver_args)?;
        match master.termination_condition {
            TerminationCondition::Optimal => handle_master_optimal(&master, data),
            TerminationCondition::Infeasible => {
                handle_master_infeasible(data);
                last_iter_cuts = true;
                break;
            }
            _ => handle_master_other(&master, data),
        }
        config.call_after_master_solve(&*problem, data)?;

        if algorithm_should_terminate(problem, data, config, true) {
            last_iter_cuts = false;
            break;
        }

        if !config.single_tree {
            // cuts are generated by the handlers
            let nlp = problem.solve_fixed_nlp(data, config)?;
            handle_nlp(problem, &nlp, data, config)?;
            config.call_after_subproblem_solve(&*problem, data)?;
        }
    }

    // no-good cuts make the last bound unreliable.  Nothing to fix
    // if the master problem was never solved.
    if config.add_nogood_cuts && data.mip_iter > 0 {
        bound_fix(problem, data, config, last_iter_cuts)?;
    }
    Ok(())
}

/// Check the termination criteria in order of precedence: bound
/// convergence, iteration limit, time limit and, if `check_cycling`,
/// a repeated integer assignment from the master problem.
///
/// Sets the termination condition in `data.results` and returns true
/// if the loop should stop.
pub fn algorithm_should_terminate(
    problem: &dyn MinlpProblem,
    data: &mut SolveData,
    config: &OaConfig,
    check_cycling: bool,
) -> bool {
    if data.bounds_converged(config.bound_tolerance) {
        info!(
            "exiting on bound convergence. LB: {} + (tol {}) >= UB: {}",
            data.lb, config.bound_tolerance, data.ub
        );
        data.results.termination_condition = TerminationCondition::Optimal;
        return true;
    }

    if data.mip_iter >= config.iteration_limit {
        info!(
            "unable to converge bounds after {} master iterations. LB: {}  UB: {}",
            data.mip_iter, data.lb, data.ub
        );
        data.results.termination_condition = TerminationCondition::MaxIterations;
        return true;
    }

    let elapsed = data.elapsed();
    if elapsed >= config.time_limit {
        info!(
            "unable to converge bounds before time limit of {} seconds. Elapsed: {} seconds. LB: {}  UB: {}",
            config.time_limit, elapsed, data.lb, data.ub
        );
        data.results.termination_condition = TerminationCondition::MaxTimeLimit;
        return true;
    }

    if config.cycling_check && data.mip_iter >= 1 && check_cycling {
        data.curr_int_sol = problem
            .master_integer_values()
            .iter()
            .map(|v| v.round() as i64)
            .collect();

        if data.prev_int_sol.as_ref() == Some(&data.curr_int_sol) {
            info!(
                "cycling after {} master iterations. Convergence to an optimal solution is not guaranteed. LB: {}  UB: {}",
                data.mip_iter, data.lb, data.ub
            );
            data.results.termination_condition = TerminationCondition::Feasible;
            return true;
        }

        data.prev_int_sol = Some(data.curr_int_sol.clone());
    }

    false
}

/// Correct the final bound after a loop with no-good cuts.
///
/// The last no-good cut may exclude the optimal assignment, so the master
/// is solved again without it and the optimistic bound is recomputed from
/// that solve and all but the last recorded bound.
pub fn bound_fix(
    problem: &mut dyn MinlpProblem,
    data: &mut SolveData,
    config: &mut OaConfig,
    last_iter_cuts: bool,
) -> Result<(), OaError> {
    config.zero_tolerance = 1e-4;

    if !last_iter_cuts {
        let nlp = problem.solve_fixed_nlp(data, config)?;
        handle_nlp(problem, &nlp, data, config)?;
    }

    problem.deactivate_last_nogood_cut()?;

    if problem.is_persistent() {
        problem.set_instance()?;
    }
    let mut args = config.mip_solver_args.clone();
    if config.mip_solver == "gams" {
        args.add_options.push("option optcr=0.0;".to_string());
    }

    let master = problem.solve_master(data, &args)?;
    debug!("bound correction master returned {}", master.termination_condition);

    match data.objective_sense {
        ObjectiveSense::Minimize => {
            let prior = &data.lb_progress[..data.lb_progress.len().saturating_sub(1)];
            data.lb = prior.iter().fold(master.lower_bound, |acc, &v| f64::max(acc, v));
            data.push_lb(data.lb);
        }
        ObjectiveSense::Maximize => {
            let prior = &data.ub_progress[..data.ub_progress.len().saturating_sub(1)];
            data.ub = prior.iter().fold(master.upper_bound, |acc, &v| f64::min(acc, v));
            data.push_ub(data.ub);
        }
    }

    if data.bounds_converged(config.bound_tolerance) {
        data.results.termination_condition = TerminationCondition::Optimal;
    }
    Ok(())
}
