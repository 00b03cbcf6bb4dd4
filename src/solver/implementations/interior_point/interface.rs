use crate::algebra::*;
use crate::solver::core::kkt::{assemble, KktMatrix};
use crate::solver::core::traits::NlpModel;
use crate::solver::core::*;
use itertools::izip;
use thiserror::Error;

/// Error type returned when constructing an [`InteriorPointInterface`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteriorPointError {
    /// a lower bound is not strictly below its upper bound
    #[error("Invalid {kind} bounds at index {index}: lower bound must be below upper bound")]
    InvalidBounds { kind: &'static str, index: usize },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Infinity norms of the optimality conditions of the barrier problem
#[derive(Debug, Default, Clone, Copy)]
pub struct Residuals<T> {
    pub primal_inf: T,
    pub dual_inf: T,
    pub complementarity: T,
}

impl<T: FloatT> Residuals<T> {
    pub fn max(&self) -> T {
        T::max(self.primal_inf, T::max(self.dual_inf, self.complementarity))
    }
}

/// Owns an [`NlpModel`] together with the bounds, the current iterate
/// and the latest Newton step of an interior point solve.
pub struct InteriorPointInterface<T: FloatT, M> {
    model: M,
    bounds: Bounds<T>,
    iterate: Iterate<T>,
    step: Iterate<T>,
}

// Move starting values strictly inside their bounds.  Values on or
// outside a one-sided bound are moved one unit inside it.  Values on or
// outside a two-sided bound are moved to the midpoint.
fn process_init<T: FloatT>(v: &mut [T], l: &[T], u: &[T]) -> Result<(), usize> {
    if let Some(index) = izip!(l, u).position(|(&l, &u)| !(l < u)) {
        return Err(index);
    }
    for (v, &l, &u) in izip!(v.iter_mut(), l, u) {
        if !(*v > l && *v < u) {
            *v = match (l.is_finite(), u.is_finite()) {
                (true, true) => (l + u) / (2.).as_T(),
                (true, false) => l + T::one(),
                (false, true) => u - T::one(),
                (false, false) => *v,
            };
        }
    }
    Ok(())
}

// bound multipliers start at one on finite bounds
fn init_bound_duals<T: FloatT>(z: &mut [T], bound: &[T]) {
    for (z, b) in z.iter_mut().zip(bound) {
        *z = if b.is_finite() { T::one() } else { T::zero() };
    }
}

// Newton step in bound multipliers recovered from the primal step
//   dz_l = μ/(v-l) - z_l - z_l/(v-l) dv
//   dz_u = μ/(u-v) - z_u + z_u/(u-v) dv
#[allow(clippy::too_many_arguments)]
fn bound_dual_step<T: FloatT>(
    dz_l: &mut [T],
    dz_u: &mut [T],
    μ: T,
    v: &[T],
    dv: &[T],
    l: &[T],
    u: &[T],
    z_l: &[T],
    z_u: &[T],
) {
    for (dzl, dzu, &v, &dv, &l, &u, &zl, &zu) in
        izip!(dz_l.iter_mut(), dz_u.iter_mut(), v, dv, l, u, z_l, z_u)
    {
        *dzl = T::zero();
        *dzu = T::zero();
        if l.is_finite() {
            *dzl = μ / (v - l) - zl - zl / (v - l) * dv;
        }
        if u.is_finite() {
            *dzu = μ / (u - v) - zu + zu / (u - v) * dv;
        }
    }
}

// largest α in (0,1] keeping v + α dv at least a fraction (1-τ) of
// its current distance away from each finite bound
fn max_step_to_bounds<T: FloatT>(τ: T, v: &[T], dv: &[T], l: &[T], u: &[T]) -> T {
    let mut α = T::one();
    for (&v, &dv, &l, &u) in izip!(v, dv, l, u) {
        if l.is_finite() && dv < T::zero() {
            α = T::min(α, -τ * (v - l) / dv);
        }
        if u.is_finite() && dv > T::zero() {
            α = T::min(α, τ * (u - v) / dv);
        }
    }
    α
}

// as above, for nonnegative quantities
fn max_step_nonnegative<T: FloatT>(τ: T, z: &[T], dz: &[T]) -> T {
    izip!(z, dz)
        .filter(|(_, &dz)| dz < T::zero())
        .fold(T::one(), |α, (&z, &dz)| T::min(α, -τ * z / dz))
}

impl<T, M> InteriorPointInterface<T, M>
where
    T: FloatT,
    M: NlpModel<T>,
{
    /// Wrap a model and compute a strictly interior starting point.
    pub fn new(model: M) -> Result<Self, InteriorPointError> {
        let bounds = Bounds::from_model(&model);
        let (n, m_eq, m_ineq) = (
            model.n_primals(),
            model.n_eq_constraints(),
            model.n_ineq_constraints(),
        );

        let mut it = Iterate::new(n, m_eq, m_ineq);

        model.initial_primals(&mut it.x);
        process_init(&mut it.x, &bounds.xl, &bounds.xu)
            .map_err(|index| InteriorPointError::InvalidBounds {
                kind: "primal",
                index,
            })?;

        // slacks start at the constraint values
        model.ineq_constraints(&it.x, &mut it.s);
        process_init(&mut it.s, &bounds.dl, &bounds.du)
            .map_err(|index| InteriorPointError::InvalidBounds {
                kind: "inequality",
                index,
            })?;

        model.initial_duals_eq(&mut it.y_eq);
        model.initial_duals_ineq(&mut it.y_ineq);

        init_bound_duals(&mut it.z_xl, &bounds.xl);
        init_bound_duals(&mut it.z_xu, &bounds.xu);
        init_bound_duals(&mut it.z_sl, &bounds.dl);
        init_bound_duals(&mut it.z_su, &bounds.du);

        Ok(Self {
            model,
            bounds,
            iterate: it,
            step: Iterate::new(n, m_eq, m_ineq),
        })
    }

    pub fn n_primals(&self) -> usize {
        self.iterate.x.len()
    }

    pub fn n_eq_constraints(&self) -> usize {
        self.iterate.y_eq.len()
    }

    pub fn n_ineq_constraints(&self) -> usize {
        self.iterate.y_ineq.len()
    }

    /// dimension of the primal-dual KKT system
    pub fn kkt_dim(&self) -> usize {
        self.n_primals() + 2 * self.n_ineq_constraints() + self.n_eq_constraints()
    }

    pub fn set_barrier_parameter(&mut self, μ: T) {
        self.iterate.mu = μ;
    }

    pub fn barrier_parameter(&self) -> T {
        self.iterate.mu
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn bounds(&self) -> &Bounds<T> {
        &self.bounds
    }

    pub fn iterate(&self) -> &Iterate<T> {
        &self.iterate
    }

    pub fn iterate_mut(&mut self) -> &mut Iterate<T> {
        &mut self.iterate
    }

    /// most recent Newton step
    pub fn step(&self) -> &Iterate<T> {
        &self.step
    }

    pub fn objective(&self) -> T {
        self.model.objective(&self.iterate.x)
    }

    /// KKT system of the barrier problem at the current iterate
    pub fn evaluate_primal_dual_kkt_matrix(&self) -> KktMatrix<T> {
        assemble(&self.model, &self.bounds, &self.iterate)
    }

    /// Store the solution of the KKT system as the current step, and
    /// recover the steps in the bound multipliers from it.
    ///
    /// # Panics
    /// Panics if `sol` does not have the KKT system dimension.
    pub fn set_primal_dual_kkt_solution(&mut self, sol: &[T]) {
        assert_eq!(sol.len(), self.kkt_dim());

        let (n, m_eq, m_ineq) = (
            self.n_primals(),
            self.n_eq_constraints(),
            self.n_ineq_constraints(),
        );
        let (dx, rest) = sol.split_at(n);
        let (ds, rest) = rest.split_at(m_ineq);
        let (dy_eq, dy_ineq) = rest.split_at(m_eq);

        let step = &mut self.step;
        step.x.copy_from(dx);
        step.s.copy_from(ds);
        step.y_eq.copy_from(dy_eq);
        step.y_ineq.copy_from(dy_ineq);

        let (it, b) = (&self.iterate, &self.bounds);
        bound_dual_step(
            &mut step.z_xl, &mut step.z_xu, it.mu, &it.x, &step.x, &b.xl, &b.xu, &it.z_xl,
            &it.z_xu,
        );
        bound_dual_step(
            &mut step.z_sl, &mut step.z_su, it.mu, &it.s, &step.s, &b.dl, &b.du, &it.z_sl,
            &it.z_su,
        );
    }

    /// Residuals of the optimality conditions of the barrier problem
    /// with parameter `μ`.  With `μ = 0` these are the residuals of the
    /// original problem.
    pub fn check_convergence(&self, μ: T) -> Residuals<T> {
        let it = &self.iterate;
        let b = &self.bounds;

        // primal feasibility
        let mut c = vec![T::zero(); self.n_eq_constraints()];
        let mut d = vec![T::zero(); self.n_ineq_constraints()];
        self.model.eq_constraints(&it.x, &mut c);
        self.model.ineq_constraints(&it.x, &mut d);
        d.axpby(-T::one(), &it.s, T::one());
        let primal_inf = T::max(c.norm_inf(), d.norm_inf());

        // stationarity of the Lagrangian
        let mut grad_x = vec![T::zero(); self.n_primals()];
        self.model.objective_grad(&it.x, &mut grad_x);
        self.model
            .jacobian_eq(&it.x)
            .t()
            .gemv(&mut grad_x, &it.y_eq, T::one(), T::one());
        self.model
            .jacobian_ineq(&it.x)
            .t()
            .gemv(&mut grad_x, &it.y_ineq, T::one(), T::one());
        grad_x.axpby(-T::one(), &it.z_xl, T::one());
        grad_x.axpby(T::one(), &it.z_xu, T::one());

        let grad_s = izip!(&it.y_ineq, &it.z_sl, &it.z_su)
            .map(|(&y, &zl, &zu)| (-y - zl + zu).abs())
            .fold(T::zero(), T::max);
        let dual_inf = T::max(grad_x.norm_inf(), grad_s);

        // perturbed complementarity on finite bounds
        let compl = |v: &[T], l: &[T], u: &[T], z_l: &[T], z_u: &[T]| {
            izip!(v, l, u, z_l, z_u).fold(T::zero(), |acc, (&v, &l, &u, &zl, &zu)| {
                let mut acc = acc;
                if l.is_finite() {
                    acc = T::max(acc, ((v - l) * zl - μ).abs());
                }
                if u.is_finite() {
                    acc = T::max(acc, ((u - v) * zu - μ).abs());
                }
                acc
            })
        };
        let complementarity = T::max(
            compl(&it.x, &b.xl, &b.xu, &it.z_xl, &it.z_xu),
            compl(&it.s, &b.dl, &b.du, &it.z_sl, &it.z_su),
        );

        Residuals {
            primal_inf,
            dual_inf,
            complementarity,
        }
    }

    /// Largest primal and dual step lengths in `(0,1]` along the current
    /// step that keep every bounded quantity at least a fraction `1-τ`
    /// of its distance away from its bound.
    pub fn fraction_to_the_boundary(&self, τ: T) -> (T, T) {
        let (it, dt, b) = (&self.iterate, &self.step, &self.bounds);

        let α_primal = T::min(
            max_step_to_bounds(τ, &it.x, &dt.x, &b.xl, &b.xu),
            max_step_to_bounds(τ, &it.s, &dt.s, &b.dl, &b.du),
        );

        let α_dual = [
            max_step_nonnegative(τ, &it.z_xl, &dt.z_xl),
            max_step_nonnegative(τ, &it.z_xu, &dt.z_xu),
            max_step_nonnegative(τ, &it.z_sl, &dt.z_sl),
            max_step_nonnegative(τ, &it.z_su, &dt.z_su),
        ]
        .into_iter()
        .fold(T::one(), T::min);

        (α_primal, α_dual)
    }

    /// Move the primals and slacks by `α_primal` times the current step,
    /// and the duals and bound multipliers by `α_dual` times the step
    pub fn take_step(&mut self, α_primal: T, α_dual: T) {
        self.iterate.add_step(&self.step, α_primal, α_dual);
    }

    /// Push the current primal values back into the model
    pub fn load_primals_into_model(&mut self) {
        self.model.load_primals(&self.iterate.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_init() {
        let inf = f64::INFINITY;
        let l = [0., -inf, 0., -inf, 0.];
        let u = [inf, 1., 2., inf, 2.];
        let mut v = [-3., 5., 2., 7., 0.5];
        process_init(&mut v, &l, &u).unwrap();
        assert_eq!(v, [1., 0., 1., 7., 0.5]);

        let mut v = [0.; 2];
        assert_eq!(process_init(&mut v, &[0., 1.], &[1., 1.]), Err(1));
    }

    #[test]
    fn test_step_lengths() {
        // distance 1 to the bound, full step would cross it
        let α: f64 = max_step_to_bounds(0.9, &[1.], &[-2.], &[0.], &[f64::INFINITY]);
        assert!((α - 0.45).abs() < 1e-15);
        let α: f64 = max_step_to_bounds(0.9, &[1.], &[4.], &[0.], &[2.]);
        assert!((α - 0.225).abs() < 1e-15);
        // moving away from all bounds
        let α: f64 = max_step_to_bounds(0.9, &[1.], &[1.], &[0.], &[f64::INFINITY]);
        assert_eq!(α, 1.);

        let α: f64 = max_step_nonnegative(0.99, &[1., 2.], &[-4., 1.]);
        assert!((α - 0.2475).abs() < 1e-15);
    }

    #[test]
    fn test_bound_dual_step() {
        let (mut dzl, mut dzu) = ([0.; 2], [0.; 2]);
        bound_dual_step(
            &mut dzl,
            &mut dzu,
            0.1,
            &[0.5, 0.5],
            &[0.1, 0.1],
            &[0., f64::NEG_INFINITY],
            &[1., 1.],
            &[1., 0.],
            &[1., 1.],
        );
        // 0.1/0.5 - 1 - 0.1/0.5
        assert!((dzl[0] + 1.0).abs() < 1e-15);
        assert_eq!(dzl[1], 0.);
        // 0.1/0.5 - 1 + 0.1/0.5
        assert!((dzu[0] + 0.6).abs() < 1e-15);
        assert!((dzu[1] + 0.6).abs() < 1e-15);
    }
}
