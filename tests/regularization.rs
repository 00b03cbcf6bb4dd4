#![allow(non_snake_case)]

use ipoa::{algebra::*, solver::linsolvers::*, solver::*};

// variables [x1, x2, x3, f3, F]
//   min  F²
//   s.t. x1 + x2 + x3 = 1
//        F x1 = 1,  F x2 = 2,  F x3 = f3
struct BilinearModel {
    x: Vec<f64>,
}

const F: usize = 4;
const F3: usize = 3;

fn make_model() -> BilinearModel {
    BilinearModel { x: vec![0.; 5] }
}

impl NlpModel for BilinearModel {
    fn n_primals(&self) -> usize {
        5
    }
    fn n_eq_constraints(&self) -> usize {
        4
    }
    fn n_ineq_constraints(&self) -> usize {
        0
    }
    fn primal_bounds(&self, xl: &mut [f64], xu: &mut [f64]) {
        xl.fill(f64::NEG_INFINITY);
        xu.fill(f64::INFINITY);
    }
    fn ineq_bounds(&self, _dl: &mut [f64], _du: &mut [f64]) {}

    fn initial_primals(&self, x: &mut [f64]) {
        x.copy_from_slice(&self.x);
    }

    fn objective(&self, x: &[f64]) -> f64 {
        x[F] * x[F]
    }

    fn objective_grad(&self, x: &[f64], grad: &mut [f64]) {
        grad.fill(0.);
        grad[F] = 2. * x[F];
    }

    fn eq_constraints(&self, x: &[f64], c: &mut [f64]) {
        c[0] = x[0] + x[1] + x[2] - 1.;
        c[1] = x[F] * x[0] - 1.;
        c[2] = x[F] * x[1] - 2.;
        c[3] = x[F] * x[2] - x[F3];
    }

    fn ineq_constraints(&self, _x: &[f64], _d: &mut [f64]) {}

    fn jacobian_eq(&self, x: &[f64]) -> CscMatrix<f64> {
        let I = [0, 0, 0, 1, 1, 2, 2, 3, 3, 3];
        let J = [0, 1, 2, 0, F, 1, F, 2, F3, F];
        let V = [1., 1., 1., x[F], x[0], x[F], x[1], x[F], -1., x[2]];
        CscMatrix::new_from_triplets(4, 5, &I, &J, &V)
    }

    fn jacobian_ineq(&self, _x: &[f64]) -> CscMatrix<f64> {
        CscMatrix::zeros(0, 5)
    }

    fn hessian_lag(&self, _x: &[f64], y_eq: &[f64], _y_ineq: &[f64]) -> CscMatrix<f64> {
        let I = [0, 1, 2, F];
        let J = [F, F, F, F];
        let V = [y_eq[1], y_eq[2], y_eq[3], 2.];
        CscMatrix::new_from_triplets(5, 5, &I, &J, &V)
    }

    fn load_primals(&mut self, x: &[f64]) {
        self.x.copy_from_slice(x);
    }
}

fn solver_with_method(method: &str) -> InteriorPointSolver<f64> {
    let settings = InteriorPointSettingsBuilder::default()
        .direct_solve_method(method.to_string())
        .verbose(false)
        .build()
        .unwrap();
    InteriorPointSolver::new(settings).unwrap()
}

fn _test_regularization(method: &str) {
    let mut interface = InteriorPointInterface::new(make_model()).unwrap();
    let mut solver = solver_with_method(method);
    solver.set_interface(&interface);

    interface.set_barrier_parameter(1e-1);

    // KKT system before any iterations
    let kkt = interface.evaluate_primal_dual_kkt_matrix();
    let reg = solver.factorize(&kkt).unwrap();

    assert!((reg.coefficient - 1e-4).abs() < 1e-12);
    assert_eq!(solver.regularization_coefficient(), reg.coefficient);
    assert!(reg.dual_coefficient > 0.);

    let desired_n_neg_evals = interface.n_eq_constraints() + interface.n_ineq_constraints();

    let inertia = solver.linear_solver().inertia().unwrap();
    assert_eq!(inertia.null, 0);
    assert_eq!(inertia.negative, desired_n_neg_evals);
    assert_eq!(inertia, reg.inertia);

    // the input system is left untouched
    let kkt2 = interface.evaluate_primal_dual_kkt_matrix();
    assert_eq!(kkt.matrix.nzval, kkt2.matrix.nzval);

    // an already regularized system needs no further regularization
    let reg2 = solver.factorize(&reg.kkt).unwrap();
    assert_eq!(reg2.coefficient, 0.);
    assert_eq!(reg2.inertia, reg.inertia);
}

#[test]
fn test_regularization_qdldl() {
    _test_regularization("qdldl");
}

#[test]
fn test_regularization_dense() {
    _test_regularization("dense");
}

#[test]
fn test_regularization_auto() {
    _test_regularization("auto");
}

// 3 equality and 3 inequality constraints on the first three of four
// variables, with no curvature.  The fourth variable makes the
// unregularized system singular.
fn eq_ineq_kkt() -> KktMatrix<f64> {
    let H = CscMatrix::<f64>::zeros(4, 4);
    let J = CscMatrix::new_from_triplets(3, 4, &[0, 1, 2], &[0, 1, 2], &[1., 1., 1.]);
    let sigma_x = [0.; 4];
    let sigma_s = [1.; 3];
    let rhs = vec![1.; 4 + 3 + 3 + 3];
    KktMatrix::from_blocks(&H, &J, &J, &sigma_x, &sigma_s, rhs, 0.1)
}

fn _test_eq_ineq_regularization(method: &str) {
    let kkt = eq_ineq_kkt();
    assert_eq!(kkt.expected_inertia(), Inertia::new(7, 6, 0));

    let mut linsolver = linear_solver_from_settings::<f64>(method, 1e-30).unwrap();
    let settings = RegularizationSettings::default();

    let reg = kkt::factorize(&mut linsolver, &kkt, &settings).unwrap();
    assert!((reg.coefficient - 1e-4).abs() < 1e-12);
    assert_eq!(reg.inertia.null, 0);
    assert_eq!(reg.inertia.negative, 6);
    assert_eq!(reg.kkt.rhs, kkt.rhs);

    // the backend holds the regularized factors
    let mut x = vec![0.; kkt.dim()];
    linsolver.solve(&mut x, &reg.kkt.rhs).unwrap();
    let mut r = reg.kkt.rhs.clone();
    reg.kkt.matrix.sym().symv(&mut r, &x, 1., -1.);
    assert!(r.norm_inf() < 1e-8);
}

#[test]
fn test_eq_ineq_regularization_qdldl() {
    _test_eq_ineq_regularization("qdldl");
}

#[test]
fn test_eq_ineq_regularization_dense() {
    _test_eq_ineq_regularization("dense");
}

#[test]
fn test_dimension_mismatch() {
    let interface = InteriorPointInterface::new(make_model()).unwrap();
    let mut solver = solver_with_method("qdldl");
    solver.set_interface(&interface);

    let kkt = eq_ineq_kkt();
    assert!(matches!(
        solver.factorize(&kkt),
        Err(RegularizationError::DimensionMismatch {
            expected: 9,
            found: 13
        })
    ));
}

#[test]
fn test_unregularized_singular_is_error() {
    let settings = InteriorPointSettingsBuilder::default()
        .regularize_kkt(false)
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let mut interface = InteriorPointInterface::new(make_model()).unwrap();

    let kkt = interface.evaluate_primal_dual_kkt_matrix();
    assert_eq!(
        solver.factorize(&kkt).unwrap_err(),
        RegularizationError::LinearSolver(LinearSolverError::Singular)
    );

    let status = solver.solve(&mut interface);
    assert_eq!(status, InteriorPointStatus::NumericalError);
}
