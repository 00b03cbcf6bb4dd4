use super::*;

/// Names accepted by the `direct_solve_method` setting.
pub const DIRECT_SOLVE_METHODS: [&str; 3] = ["auto", "qdldl", "dense"];

/// Construct a linear solver backend from its settings name.
///
/// `"auto"` currently selects the sparse `"qdldl"` backend.
pub fn linear_solver_from_settings<T>(
    method: &str,
    pivot_tolerance: T,
) -> Result<LinearSolverBackend<T>, LinearSolverError>
where
    T: FloatT,
{
    validate_direct_solve_method(method)?;
    let solver: LinearSolverBackend<T> = match method {
        "dense" => DenseLdlLinearSolver::new(pivot_tolerance).into(),
        _ => QdldlLinearSolver::new(pivot_tolerance).into(),
    };
    Ok(solver)
}

pub fn validate_direct_solve_method(method: &str) -> Result<(), LinearSolverError> {
    if DIRECT_SOLVE_METHODS.contains(&method) {
        Ok(())
    } else {
        Err(LinearSolverError::Unavailable {
            method: method.to_string(),
        })
    }
}

#[test]
fn test_backend_selection() {
    let solver = linear_solver_from_settings::<f64>("auto", 0.0).unwrap();
    assert_eq!(solver.name(), "qdldl");
    let solver = linear_solver_from_settings::<f64>("dense", 0.0).unwrap();
    assert_eq!(solver.name(), "dense");

    assert!(matches!(
        linear_solver_from_settings::<f64>("ma27", 0.0),
        Err(LinearSolverError::Unavailable { method }) if method == "ma27"
    ));
}
