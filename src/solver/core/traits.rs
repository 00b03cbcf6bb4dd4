//! Model evaluation interface required by the interior point solver.
//!
//! The solver never builds or parses models itself.  Any type that can
//! evaluate the functions and derivatives of
//!
//! ```text
//!   minimize    f(x)
//!   subject to  c(x) = 0
//!               dl <= d(x) <= du
//!               xl <= x <= xu
//! ```
//!
//! can be solved by implementing [`NlpModel`].  Absent bounds are given
//! as `±infinity`.

use crate::algebra::*;

/// A nonlinear program with equality and two-sided inequality constraints.
pub trait NlpModel<T: FloatT = f64> {
    /// number of primal variables `n`
    fn n_primals(&self) -> usize;

    /// number of equality constraints
    fn n_eq_constraints(&self) -> usize;

    /// number of inequality constraints
    fn n_ineq_constraints(&self) -> usize;

    /// lower and upper bounds on the primal variables
    fn primal_bounds(&self, xl: &mut [T], xu: &mut [T]);

    /// lower and upper bounds on the inequality constraint values
    fn ineq_bounds(&self, dl: &mut [T], du: &mut [T]);

    /// starting point for the primal variables
    fn initial_primals(&self, x: &mut [T]);

    /// starting point for the equality constraint duals.  Zero by default.
    fn initial_duals_eq(&self, y: &mut [T]) {
        y.set(T::zero());
    }

    /// starting point for the inequality constraint duals.  Zero by default.
    fn initial_duals_ineq(&self, y: &mut [T]) {
        y.set(T::zero());
    }

    fn objective(&self, x: &[T]) -> T;

    fn objective_grad(&self, x: &[T], grad: &mut [T]);

    fn eq_constraints(&self, x: &[T], c: &mut [T]);

    fn ineq_constraints(&self, x: &[T], d: &mut [T]);

    /// Jacobian of the equality constraints, `n_eq_constraints x n_primals`
    fn jacobian_eq(&self, x: &[T]) -> CscMatrix<T>;

    /// Jacobian of the inequality constraints, `n_ineq_constraints x n_primals`
    fn jacobian_ineq(&self, x: &[T]) -> CscMatrix<T>;

    /// Upper triangle of the Hessian of the Lagrangian
    /// `∇²f(x) + Σ y_eq[i] ∇²c_i(x) + Σ y_ineq[i] ∇²d_i(x)`
    fn hessian_lag(&self, x: &[T], y_eq: &[T], y_ineq: &[T]) -> CscMatrix<T>;

    /// Receive the final primal solution
    fn load_primals(&mut self, x: &[T]);
}
