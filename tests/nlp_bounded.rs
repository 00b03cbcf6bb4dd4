#![allow(non_snake_case)]

use ipoa::{algebra::*, solver::*};

//   max  x² + y²
//   s.t. y <= exp(-x)
//        0 <= x, y <= 1
// written as a minimization, starting from (0.1, 0.1)
#[derive(Default)]
struct ExpBoundedModel {
    solution: Vec<f64>,
}

impl NlpModel for ExpBoundedModel {
    fn n_primals(&self) -> usize {
        2
    }
    fn n_eq_constraints(&self) -> usize {
        0
    }
    fn n_ineq_constraints(&self) -> usize {
        1
    }
    fn primal_bounds(&self, xl: &mut [f64], xu: &mut [f64]) {
        xl.fill(0.);
        xu.fill(1.);
    }
    fn ineq_bounds(&self, dl: &mut [f64], du: &mut [f64]) {
        dl[0] = f64::NEG_INFINITY;
        du[0] = 0.;
    }
    fn initial_primals(&self, x: &mut [f64]) {
        x.fill(0.1);
    }

    fn objective(&self, x: &[f64]) -> f64 {
        -x[0] * x[0] - x[1] * x[1]
    }

    fn objective_grad(&self, x: &[f64], grad: &mut [f64]) {
        grad[0] = -2. * x[0];
        grad[1] = -2. * x[1];
    }

    fn eq_constraints(&self, _x: &[f64], _c: &mut [f64]) {}

    fn ineq_constraints(&self, x: &[f64], d: &mut [f64]) {
        d[0] = x[1] - f64::exp(-x[0]);
    }

    fn jacobian_eq(&self, _x: &[f64]) -> CscMatrix<f64> {
        CscMatrix::zeros(0, 2)
    }

    fn jacobian_ineq(&self, x: &[f64]) -> CscMatrix<f64> {
        CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![f64::exp(-x[0]), 1.])
    }

    fn hessian_lag(&self, x: &[f64], _y_eq: &[f64], y_ineq: &[f64]) -> CscMatrix<f64> {
        // d²(-x² - y²) + y_ineq d²(y - exp(-x))
        let H11 = -2. - y_ineq[0] * f64::exp(-x[0]);
        CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![H11, -2.])
    }

    fn load_primals(&mut self, x: &[f64]) {
        self.solution = x.to_vec();
    }
}

fn _test_regularization_2(method: &str) {
    let settings = InteriorPointSettingsBuilder::default()
        .direct_solve_method(method.to_string())
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let mut interface = InteriorPointInterface::new(ExpBoundedModel::default()).unwrap();

    let status = solver.solve(&mut interface);
    assert_eq!(status, InteriorPointStatus::Optimal);
    assert_eq!(solver.info.status, InteriorPointStatus::Optimal);
    assert!(solver.info.iterations > 0);

    interface.load_primals_into_model();
    let model = interface.into_model();
    assert!((model.solution[0] - 1.).abs() < 1e-4);
    assert!((model.solution[1] - f64::exp(-1.)).abs() < 1e-4);
}

#[test]
fn test_regularization_2_qdldl() {
    _test_regularization_2("qdldl");
}

#[test]
fn test_regularization_2_dense() {
    _test_regularization_2("dense");
}

#[test]
fn test_interior_start() {
    let interface = InteriorPointInterface::new(ExpBoundedModel::default()).unwrap();
    let it = interface.iterate();

    assert_eq!(it.x, vec![0.1, 0.1]);
    // slack starts at d(x0) < 0, strictly inside (-inf, 0]
    assert!((it.s[0] - (0.1 - f64::exp(-0.1))).abs() < 1e-15);
    assert_eq!(it.z_xl, vec![1., 1.]);
    assert_eq!(it.z_xu, vec![1., 1.]);
    assert_eq!(it.z_sl, vec![0.]);
    assert_eq!(it.z_su, vec![1.]);
    assert_eq!(interface.kkt_dim(), 4);
}

#[test]
fn test_max_iterations() {
    let settings = InteriorPointSettingsBuilder::default()
        .max_iter(2)
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let mut interface = InteriorPointInterface::new(ExpBoundedModel::default()).unwrap();

    assert_eq!(solver.solve(&mut interface), InteriorPointStatus::MaxIterations);
    assert_eq!(solver.info.iterations, 2);
}

#[test]
fn test_time_limit() {
    let settings = InteriorPointSettingsBuilder::default()
        .time_limit(0.)
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let mut interface = InteriorPointInterface::new(ExpBoundedModel::default()).unwrap();

    assert_eq!(solver.solve(&mut interface), InteriorPointStatus::MaxTime);
    assert_eq!(solver.info.iterations, 0);
}

// min -x², unbounded below with negative curvature everywhere
struct ConcaveModel;

impl NlpModel for ConcaveModel {
    fn n_primals(&self) -> usize {
        1
    }
    fn n_eq_constraints(&self) -> usize {
        0
    }
    fn n_ineq_constraints(&self) -> usize {
        0
    }
    fn primal_bounds(&self, xl: &mut [f64], xu: &mut [f64]) {
        xl[0] = f64::NEG_INFINITY;
        xu[0] = f64::INFINITY;
    }
    fn ineq_bounds(&self, _dl: &mut [f64], _du: &mut [f64]) {}
    fn initial_primals(&self, x: &mut [f64]) {
        x[0] = 1.;
    }
    fn objective(&self, x: &[f64]) -> f64 {
        -x[0] * x[0]
    }
    fn objective_grad(&self, x: &[f64], grad: &mut [f64]) {
        grad[0] = -2. * x[0];
    }
    fn eq_constraints(&self, _x: &[f64], _c: &mut [f64]) {}
    fn ineq_constraints(&self, _x: &[f64], _d: &mut [f64]) {}
    fn jacobian_eq(&self, _x: &[f64]) -> CscMatrix<f64> {
        CscMatrix::zeros(0, 1)
    }
    fn jacobian_ineq(&self, _x: &[f64]) -> CscMatrix<f64> {
        CscMatrix::zeros(0, 1)
    }
    fn hessian_lag(&self, _x: &[f64], _y_eq: &[f64], _y_ineq: &[f64]) -> CscMatrix<f64> {
        CscMatrix::new(1, 1, vec![0, 1], vec![0], vec![-2.])
    }
    fn load_primals(&mut self, _x: &[f64]) {}
}

#[test]
fn test_regularization_failure() {
    // a single attempt at 1e-4 cannot fix a curvature of -2
    let settings = InteriorPointSettingsBuilder::default()
        .regularization_max_iter(1)
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let mut interface = InteriorPointInterface::new(ConcaveModel).unwrap();

    assert_eq!(
        solver.solve(&mut interface),
        InteriorPointStatus::RegularizationFailure
    );

    let kkt = interface.evaluate_primal_dual_kkt_matrix();
    match solver.factorize(&kkt) {
        Err(RegularizationError::Exhausted {
            attempts,
            last_inertia,
        }) => {
            assert_eq!(attempts, 1);
            assert_eq!(last_inertia.map(|i| i.negative), Some(1));
        }
        _ => panic!("expected regularization to be exhausted"),
    }
}

#[test]
fn test_regularization_growth() {
    // 1e-4, 1e-2, 1 are too small, 1e2 gives a positive pivot
    let settings = InteriorPointSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = InteriorPointSolver::new(settings).unwrap();
    let interface = InteriorPointInterface::new(ConcaveModel).unwrap();
    solver.set_interface(&interface);

    let kkt = interface.evaluate_primal_dual_kkt_matrix();
    let reg = solver.factorize(&kkt).unwrap();
    assert!((reg.coefficient - 1e2).abs() < 1e-9);
    assert_eq!(reg.dual_coefficient, 0.);
    assert_eq!(reg.inertia.positive, 1);
}

#[test]
fn test_invalid_bounds() {
    struct BadBounds;
    impl NlpModel for BadBounds {
        fn n_primals(&self) -> usize {
            2
        }
        fn n_eq_constraints(&self) -> usize {
            0
        }
        fn n_ineq_constraints(&self) -> usize {
            0
        }
        fn primal_bounds(&self, xl: &mut [f64], xu: &mut [f64]) {
            xl.copy_from_slice(&[0., 1.]);
            xu.copy_from_slice(&[1., 1.]);
        }
        fn ineq_bounds(&self, _dl: &mut [f64], _du: &mut [f64]) {}
        fn initial_primals(&self, x: &mut [f64]) {
            x.fill(0.);
        }
        fn objective(&self, _x: &[f64]) -> f64 {
            0.
        }
        fn objective_grad(&self, _x: &[f64], grad: &mut [f64]) {
            grad.fill(0.);
        }
        fn eq_constraints(&self, _x: &[f64], _c: &mut [f64]) {}
        fn ineq_constraints(&self, _x: &[f64], _d: &mut [f64]) {}
        fn jacobian_eq(&self, _x: &[f64]) -> CscMatrix<f64> {
            CscMatrix::zeros(0, 2)
        }
        fn jacobian_ineq(&self, _x: &[f64]) -> CscMatrix<f64> {
            CscMatrix::zeros(0, 2)
        }
        fn hessian_lag(&self, _x: &[f64], _y_eq: &[f64], _y_ineq: &[f64]) -> CscMatrix<f64> {
            CscMatrix::zeros(2, 2)
        }
        fn load_primals(&mut self, _x: &[f64]) {}
    }

    assert!(matches!(
        InteriorPointInterface::new(BadBounds),
        Err(InteriorPointError::InvalidBounds {
            kind: "primal",
            index: 1
        })
    ));
}
