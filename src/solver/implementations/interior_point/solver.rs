use super::*;
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::kkt::{factorize as factorize_regularized, *};
use crate::solver::core::linsolvers::*;
use crate::solver::core::traits::NlpModel;
use crate::solver::core::SettingsError;
use crate::timers::*;
use std::io::Write;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of the interior point solver at termination

#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InteriorPointStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Primal and dual infeasibility and complementarity are within tolerance.
    Optimal,
    /// Iteration limit reached before convergence.
    MaxIterations,
    /// Time limit reached before convergence.
    MaxTime,
    /// No regularization coefficient gave the KKT system the required inertia.
    RegularizationFailure,
    /// The linear solver failed or the step was not finite.
    NumericalError,
}

impl std::fmt::Display for InteriorPointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Primal-dual interior point solver with KKT inertia correction.
///
/// The solver holds the settings, the linear solver backend and solve
/// statistics.  The problem, the iterate and finally the solution live
/// in an [`InteriorPointInterface`] passed to [`solve`](Self::solve).
pub struct InteriorPointSolver<T: FloatT = f64> {
    pub settings: InteriorPointSettings<T>,
    pub info: InteriorPointInfo<T>,
    pub timers: Option<Timers>,
    linsolver: LinearSolverBackend<T>,
    // KKT dimension of the interface being solved
    kkt_dim: Option<usize>,
    reg_coef: T,
}

impl<T> InteriorPointSolver<T>
where
    T: FloatT,
{
    pub fn new(settings: InteriorPointSettings<T>) -> Result<Self, SettingsError> {
        settings.validate()?;
        let linsolver =
            linear_solver_from_settings(&settings.direct_solve_method, settings.pivot_tolerance)?;

        Ok(Self {
            settings,
            info: InteriorPointInfo::new(),
            timers: Some(Timers::default()),
            linsolver,
            kkt_dim: None,
            reg_coef: T::zero(),
        })
    }

    /// Record the dimensions of the problem held by `interface`.
    /// Subsequent calls to [`factorize`](Self::factorize) reject KKT
    /// systems of any other size.
    pub fn set_interface<M: NlpModel<T>>(&mut self, interface: &InteriorPointInterface<T, M>) {
        self.kkt_dim = Some(interface.kkt_dim());
    }

    /// Factor a KKT system with the configured backend, regularizing it
    /// if enabled.  On success the backend holds the factors of the
    /// returned (possibly regularized) system.
    pub fn factorize(
        &mut self,
        kkt: &KktMatrix<T>,
    ) -> Result<Regularization<T>, RegularizationError> {
        if let Some(expected) = self.kkt_dim {
            if kkt.dim() != expected {
                return Err(RegularizationError::DimensionMismatch {
                    expected,
                    found: kkt.dim(),
                });
            }
        }

        let reg = if self.settings.regularize_kkt {
            factorize_regularized(&mut self.linsolver, kkt, &self.settings.regularization())?
        } else {
            let inertia = self.linsolver.factorize(&kkt.matrix)?;
            if inertia.is_singular() {
                return Err(LinearSolverError::Singular.into());
            }
            Regularization {
                coefficient: T::zero(),
                dual_coefficient: T::zero(),
                inertia,
                kkt: kkt.clone(),
            }
        };

        self.reg_coef = reg.coefficient;
        Ok(reg)
    }

    /// primal coefficient of the most recent factorization
    pub fn regularization_coefficient(&self) -> T {
        self.reg_coef
    }

    pub fn linear_solver(&self) -> &LinearSolverBackend<T> {
        &self.linsolver
    }

    /// Run the interior point iteration from the point held by `interface`.
    /// The final iterate is left in `interface`.
    pub fn solve<M: NlpModel<T>>(
        &mut self,
        interface: &mut InteriorPointInterface<T, M>,
    ) -> InteriorPointStatus {
        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_default();

        self.set_interface(interface);
        self.info.reset(&mut timers);

        let dims = (
            interface.n_primals(),
            interface.n_eq_constraints(),
            interface.n_ineq_constraints(),
        );
        notimeit! {timers; {
            let name = self.linsolver.name();
            self.print(|info, settings| {
                info.print_configuration(settings, dims, name)?;
                info.print_status_header(settings)
            });
        }}

        let tol = self.settings.tol;
        let max_iter = self.settings.max_iter;
        let time_limit = self.settings.time_limit;

        let mut μ = self.settings.mu_init;
        let status;
        let mut iter: u32 = 0;
        interface.set_barrier_parameter(μ);

        timeit! {timers => "solve"; {

        // ----------
        // main loop
        // ----------

        loop {
            // convergence is checked on the original problem
            let residuals = interface.check_convergence(T::zero());
            self.info.save_residuals(interface.objective(), &residuals);
            self.info.iterations = iter;
            self.info.μ = μ;

            notimeit!{timers; {
                self.print(|info, settings| info.print_status(settings));
            }}

            if residuals.max() <= tol {
                status = InteriorPointStatus::Optimal;
                break;
            }
            if iter >= max_iter {
                status = InteriorPointStatus::MaxIterations;
                break;
            }
            if timers.elapsed("solve").as_secs_f64() >= time_limit {
                status = InteriorPointStatus::MaxTime;
                break;
            }

            // reduce μ once the barrier problem is solved well enough
            if interface.check_convergence(μ).max() <= self.settings.barrier_tol_factor * μ {
                μ = self.update_barrier_parameter(μ);
                interface.set_barrier_parameter(μ);
            }

            iter += 1;

            let kkt;
            timeit!{timers => "kkt assembly"; {
                kkt = interface.evaluate_primal_dual_kkt_matrix();
            }}

            let reg;
            timeit!{timers => "kkt factor"; {
                reg = self.factorize(&kkt);
            }}
            let reg = match reg {
                Ok(reg) => reg,
                Err(e) => {
                    warn!("interior point iteration {} stopped: {}", iter, e);
                    status = match e {
                        RegularizationError::Exhausted { .. } => {
                            InteriorPointStatus::RegularizationFailure
                        }
                        _ => InteriorPointStatus::NumericalError,
                    };
                    break;
                }
            };

            let mut sol = vec![T::zero(); kkt.dim()];
            let solved;
            timeit!{timers => "kkt solve"; {
                solved = self.linsolver.solve(&mut sol, &reg.kkt.rhs);
            }}
            if let Err(e) = solved {
                warn!("interior point iteration {} stopped: {}", iter, e);
                status = InteriorPointStatus::NumericalError;
                break;
            }

            interface.set_primal_dual_kkt_solution(&sol);
            if !interface.step().is_finite() {
                status = InteriorPointStatus::NumericalError;
                break;
            }

            let τ = T::max(self.settings.tau_min, T::one() - μ);
            let (α_primal, α_dual) = interface.fraction_to_the_boundary(τ);
            interface.take_step(α_primal, α_dual);

            self.info.save_step(α_primal, α_dual, reg.coefficient);
        }
        // ----------
        // ----------

        }} // end "solve" timer

        self.info.finalize(status, &timers);

        self.print(|info, settings| info.print_footer(settings));

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);

        status
    }

    fn update_barrier_parameter(&self, μ: T) -> T {
        let s = &self.settings;
        T::max(
            s.mu_min,
            T::min(s.mu_linear_decrease * μ, μ.powf(s.mu_superlinear_power)),
        )
    }

    // printing failures are reported but never stop the solver
    fn print<F>(&mut self, f: F)
    where
        F: FnOnce(&mut InteriorPointInfo<T>, &InteriorPointSettings<T>) -> std::io::Result<()>,
    {
        if let Err(e) = f(&mut self.info, &self.settings) {
            warn!("failed to write solver output: {}", e);
        }
    }
}

impl<T> ConfigurablePrintTarget for InteriorPointSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.info.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}
