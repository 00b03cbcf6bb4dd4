use super::KktMatrix;
use crate::algebra::*;
use crate::solver::core::traits::NlpModel;
use crate::solver::core::variables::*;

/// Build the primal-dual KKT system of the barrier problem at `iterate`.
///
/// The right hand side is the negated gradient of the barrier Lagrangian
///
/// ```text
///   r_x  = -(∇f + Jcᵀy_eq + Jdᵀy_ineq - μ/(x-xl) + μ/(xu-x))
///   r_s  = -(-y_ineq - μ/(s-dl) + μ/(du-s))
///   r_ye = -c(x)
///   r_yi = -(d(x) - s)
/// ```
///
/// with barrier terms present only for finite bounds.
pub fn assemble<T, M>(model: &M, bounds: &Bounds<T>, iterate: &Iterate<T>) -> KktMatrix<T>
where
    T: FloatT,
    M: NlpModel<T> + ?Sized,
{
    let it = iterate;
    let (n, m_eq, m_ineq) = (it.x.len(), it.y_eq.len(), it.y_ineq.len());

    let hessian = model.hessian_lag(&it.x, &it.y_eq, &it.y_ineq);
    let jac_eq = model.jacobian_eq(&it.x);
    let jac_ineq = model.jacobian_ineq(&it.x);

    let mut sigma_x = vec![T::zero(); n];
    let mut sigma_s = vec![T::zero(); m_ineq];
    barrier_sigma(&mut sigma_x, &it.x, &bounds.xl, &bounds.xu, &it.z_xl, &it.z_xu);
    barrier_sigma(&mut sigma_s, &it.s, &bounds.dl, &bounds.du, &it.z_sl, &it.z_su);

    let mut rhs = vec![T::zero(); n + m_ineq + m_eq + m_ineq];
    let (r_x, rest) = rhs.split_at_mut(n);
    let (r_s, rest) = rest.split_at_mut(m_ineq);
    let (r_ye, r_yi) = rest.split_at_mut(m_eq);

    // gradient of the barrier Lagrangian in x
    model.objective_grad(&it.x, r_x);
    jac_eq.t().gemv(r_x, &it.y_eq, T::one(), T::one());
    jac_ineq.t().gemv(r_x, &it.y_ineq, T::one(), T::one());
    add_barrier_grad(r_x, it.mu, &it.x, &bounds.xl, &bounds.xu);
    r_x.negate();

    // ... and in s
    r_s.copy_from(&it.y_ineq).negate();
    add_barrier_grad(r_s, it.mu, &it.s, &bounds.dl, &bounds.du);
    r_s.negate();

    // primal residuals
    model.eq_constraints(&it.x, r_ye);
    r_ye.negate();
    model.ineq_constraints(&it.x, r_yi);
    r_yi.axpby(T::one(), &it.s, -T::one());

    KktMatrix::from_blocks(
        &hessian, &jac_eq, &jac_ineq, &sigma_x, &sigma_s, rhs, it.mu,
    )
}
