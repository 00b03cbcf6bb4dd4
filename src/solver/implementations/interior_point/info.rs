use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::timers::*;

/// Progress and final statistics of an interior point solve

#[derive(Default, Debug)]
pub struct InteriorPointInfo<T> {
    pub iterations: u32,
    pub objective: T,
    pub primal_inf: T,
    pub dual_inf: T,
    pub complementarity: T,
    pub μ: T,
    pub step_primal: T,
    pub step_dual: T,
    pub regularization: T,
    pub solve_time: f64,
    pub status: InteriorPointStatus,

    // target stream for printing
    pub(crate) stream: PrintTarget,
}

impl<T> InteriorPointInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self, timers: &mut Timers) {
        self.status = InteriorPointStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;
        self.step_primal = T::zero();
        self.step_dual = T::zero();
        self.regularization = T::zero();

        timers.reset_timer("solve");
    }

    pub(crate) fn save_residuals(&mut self, objective: T, residuals: &Residuals<T>) {
        self.objective = objective;
        self.primal_inf = residuals.primal_inf;
        self.dual_inf = residuals.dual_inf;
        self.complementarity = residuals.complementarity;
    }

    pub(crate) fn save_step(&mut self, α_primal: T, α_dual: T, regularization: T) {
        self.step_primal = α_primal;
        self.step_dual = α_dual;
        self.regularization = regularization;
    }

    pub(crate) fn finalize(&mut self, status: InteriorPointStatus, timers: &Timers) {
        self.status = status;
        self.solve_time = timers.elapsed("solve").as_secs_f64();
    }
}
