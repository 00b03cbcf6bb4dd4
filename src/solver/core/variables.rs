use super::traits::NlpModel;
use crate::algebra::*;
use itertools::izip;

/// Variable and constraint bounds of an NLP.  Absent bounds are `±∞`.
#[derive(Debug, Clone)]
pub struct Bounds<T> {
    pub xl: Vec<T>,
    pub xu: Vec<T>,
    pub dl: Vec<T>,
    pub du: Vec<T>,
}

impl<T> Bounds<T>
where
    T: FloatT,
{
    pub fn from_model<M: NlpModel<T>>(model: &M) -> Self {
        let n = model.n_primals();
        let m = model.n_ineq_constraints();
        let mut bounds = Self {
            xl: vec![T::zero(); n],
            xu: vec![T::zero(); n],
            dl: vec![T::zero(); m],
            du: vec![T::zero(); m],
        };
        model.primal_bounds(&mut bounds.xl, &mut bounds.xu);
        model.ineq_bounds(&mut bounds.dl, &mut bounds.du);
        bounds
    }
}

/// Primal-dual point of the interior point method.
///
/// The same layout holds a Newton direction, in which case every field
/// is the step in the corresponding quantity and `mu` is unused.
#[derive(Debug, Clone)]
pub struct Iterate<T> {
    /// primal variables
    pub x: Vec<T>,
    /// slacks, one per inequality constraint
    pub s: Vec<T>,
    /// equality constraint duals
    pub y_eq: Vec<T>,
    /// inequality constraint duals
    pub y_ineq: Vec<T>,
    /// multipliers of the bounds `x >= xl`, `x <= xu`
    pub z_xl: Vec<T>,
    pub z_xu: Vec<T>,
    /// multipliers of the bounds `s >= dl`, `s <= du`
    pub z_sl: Vec<T>,
    pub z_su: Vec<T>,
    /// barrier parameter
    pub mu: T,
}

impl<T> Iterate<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m_eq: usize, m_ineq: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            s: vec![T::zero(); m_ineq],
            y_eq: vec![T::zero(); m_eq],
            y_ineq: vec![T::zero(); m_ineq],
            z_xl: vec![T::zero(); n],
            z_xu: vec![T::zero(); n],
            z_sl: vec![T::zero(); m_ineq],
            z_su: vec![T::zero(); m_ineq],
            mu: T::zero(),
        }
    }

    /// Take a step with separate primal (x, s) and dual (y, z) lengths
    pub fn add_step(&mut self, step: &Iterate<T>, α_primal: T, α_dual: T) {
        self.x.axpby(α_primal, &step.x, T::one());
        self.s.axpby(α_primal, &step.s, T::one());
        self.y_eq.axpby(α_dual, &step.y_eq, T::one());
        self.y_ineq.axpby(α_dual, &step.y_ineq, T::one());
        self.z_xl.axpby(α_dual, &step.z_xl, T::one());
        self.z_xu.axpby(α_dual, &step.z_xu, T::one());
        self.z_sl.axpby(α_dual, &step.z_sl, T::one());
        self.z_su.axpby(α_dual, &step.z_su, T::one());
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.s.is_finite()
            && self.y_eq.is_finite()
            && self.y_ineq.is_finite()
            && self.z_xl.is_finite()
            && self.z_xu.is_finite()
            && self.z_sl.is_finite()
            && self.z_su.is_finite()
    }
}

// Primal barrier Hessian contributions `z_l/(v-l) + z_u/(u-v)`,
// counting only finite bounds.
pub(crate) fn barrier_sigma<T: FloatT>(
    sigma: &mut [T],
    v: &[T],
    l: &[T],
    u: &[T],
    z_l: &[T],
    z_u: &[T],
) {
    for (σ, &v, &l, &u, &zl, &zu) in izip!(sigma.iter_mut(), v, l, u, z_l, z_u) {
        *σ = T::zero();
        if l.is_finite() {
            *σ += zl / (v - l);
        }
        if u.is_finite() {
            *σ += zu / (u - v);
        }
    }
}

// Gradient of the log barrier `-μ Σ ln(v-l) + ln(u-v)`, i.e.
// `-μ/(v-l) + μ/(u-v)` over finite bounds, added to `g`.
pub(crate) fn add_barrier_grad<T: FloatT>(g: &mut [T], μ: T, v: &[T], l: &[T], u: &[T]) {
    for (g, &v, &l, &u) in izip!(g.iter_mut(), v, l, u) {
        if l.is_finite() {
            *g -= μ / (v - l);
        }
        if u.is_finite() {
            *g += μ / (u - v);
        }
    }
}

#[test]
fn test_barrier_terms_skip_infinite_bounds() {
    let v = [0.5, 2.0, 0.0];
    let l = [0.0, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let u = [1.0, 4.0, f64::INFINITY];

    let mut g = [0.; 3];
    add_barrier_grad(&mut g, 0.1, &v, &l, &u);
    assert!(g.norm_inf_diff(&[0.0, 0.05, 0.0]) < 1e-15);

    let mut sigma = [0.; 3];
    barrier_sigma(&mut sigma, &v, &l, &u, &[1., 1., 1.], &[2., 3., 1.]);
    assert!(sigma.norm_inf_diff(&[6.0, 1.5, 0.0]) < 1e-15);
}
