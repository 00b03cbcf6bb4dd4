#![allow(non_snake_case)]

use ipoa::{algebra::*, io::ConfigurablePrintTarget, solver::*};

// min (x - 2)²  s.t.  0 <= x <= 1
struct ClampedQuadratic;

impl NlpModel for ClampedQuadratic {
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
        xl[0] = 0.;
        xu[0] = 1.;
    }
    fn ineq_bounds(&self, _dl: &mut [f64], _du: &mut [f64]) {}
    fn initial_primals(&self, x: &mut [f64]) {
        x[0] = 0.5;
    }
    fn objective(&self, x: &[f64]) -> f64 {
        (x[0] - 2.) * (x[0] - 2.)
    }
    fn objective_grad(&self, x: &[f64], grad: &mut [f64]) {
        grad[0] = 2. * (x[0] - 2.);
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
        CscMatrix::new(1, 1, vec![0, 1], vec![0], vec![2.])
    }
    fn load_primals(&mut self, _x: &[f64]) {}
}

fn test_print_solver() -> (InteriorPointSolver<f64>, InteriorPointInterface<f64, ClampedQuadratic>) {
    let settings = InteriorPointSettings::default();
    let solver = InteriorPointSolver::new(settings).unwrap();
    let interface = InteriorPointInterface::new(ClampedQuadratic).unwrap();
    (solver, interface)
}

#[test]
fn test_print_to_stdout() {
    let (mut solver, mut interface) = test_print_solver();
    solver.print_to_stdout();
    solver.solve(&mut interface);
}

#[test]
fn test_print_to_buffer() {
    let (mut solver, mut interface) = test_print_solver();
    solver.print_to_buffer();
    let status = solver.solve(&mut interface);
    assert_eq!(status, InteriorPointStatus::Optimal);

    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("ipoa"));
    assert!(result.contains("direct / qdldl"));
    assert!(result.contains("Terminated with status = Optimal"));
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let (mut solver, mut interface) = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    solver.solve(&mut interface);

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("ipoa"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let (mut solver, mut interface) = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    solver.print_to_stream(stream);
    solver.solve(&mut interface);

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("ipoa"));
}

#[test]
fn test_print_to_sink() {
    let (mut solver, mut interface) = test_print_solver();
    solver.print_to_sink();
    solver.solve(&mut interface);
    // no output
}

#[test]
fn test_quiet_solver_prints_nothing() {
    let (mut solver, mut interface) = test_print_solver();
    solver.settings.verbose = false;
    solver.print_to_buffer();
    solver.solve(&mut interface);
    assert!(solver.get_print_buffer().unwrap().is_empty());
}
