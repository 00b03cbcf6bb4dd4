use super::KktMatrix;
use crate::algebra::*;
use crate::solver::core::linsolvers::*;
use derive_builder::Builder;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by the inertia-correcting factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegularizationError {
    /// No tried coefficient produced the required inertia
    #[error("KKT regularization failed after {attempts} attempts (last inertia {last_inertia:?})")]
    Exhausted {
        attempts: u32,
        last_inertia: Option<Inertia>,
    },
    /// The KKT system does not belong to the problem being solved
    #[error("KKT system has dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error(transparent)]
    LinearSolver(#[from] LinearSolverError),
}

/// Parameters of the inertia correction scheme.
#[derive(Builder, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegularizationSettings<T: FloatT> {
    /// first primal coefficient tried
    #[builder(default = "(1e-4).as_T()")]
    pub initial_coefficient: T,

    /// multiplier applied to the primal coefficient after each failure
    #[builder(default = "(100.).as_T()")]
    pub growth_factor: T,

    /// number of primal coefficients tried before giving up
    #[builder(default = "10")]
    pub max_iter: u32,

    /// dual coefficient is `dual_base * μ^dual_exponent`
    #[builder(default = "(1e-8).as_T()")]
    pub dual_base: T,

    #[builder(default = "(0.25).as_T()")]
    pub dual_exponent: T,

    /// use the reported inertia.  If false, only singular
    /// factorizations trigger regularization
    #[builder(default = "true")]
    pub compute_inertia: bool,
}

impl<T> Default for RegularizationSettings<T>
where
    T: FloatT,
{
    fn default() -> RegularizationSettings<T> {
        RegularizationSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Coefficients of the current factorization attempt
#[derive(Debug, Clone, Default)]
pub struct RegularizationState<T> {
    pub primal: T,
    pub dual: T,
    pub last_inertia: Option<Inertia>,
    pub attempts: u32,
}

/// Outcome of a successful inertia-correcting factorization
#[derive(Debug, Clone)]
pub struct Regularization<T> {
    /// primal coefficient added to the `x` diagonal, zero if none was needed
    pub coefficient: T,
    /// dual coefficient subtracted from the constraint dual diagonal
    pub dual_coefficient: T,
    pub inertia: Inertia,
    /// the factored system.  Its right hand side is the input's.
    pub kkt: KktMatrix<T>,
}

fn is_acceptable(inertia: Inertia, expected: Inertia, compute_inertia: bool) -> bool {
    if compute_inertia {
        inertia == expected
    } else {
        !inertia.is_singular()
    }
}

/// Factor `kkt`, regularizing its diagonal until the inertia is correct.
///
/// The unregularized matrix is tried first.  If that factorization is
/// singular a dual coefficient `δc = dual_base * μ^dual_exponent` is
/// subtracted from the constraint dual diagonal.  Then primal coefficients
/// `initial_coefficient * growth_factor^k` are added to the `x` diagonal
/// until one gives the required inertia.  `kkt` itself is never modified.
/// On success the linear solver holds the factors of the returned system.
pub fn factorize<T, S>(
    linsolver: &mut S,
    kkt: &KktMatrix<T>,
    settings: &RegularizationSettings<T>,
) -> Result<Regularization<T>, RegularizationError>
where
    T: FloatT,
    S: LinearSolver<T> + ?Sized,
{
    let expected = kkt.expected_inertia();
    let mut state = RegularizationState::<T>::default();

    let is_singular = match linsolver.factorize(&kkt.matrix) {
        Ok(inertia) if is_acceptable(inertia, expected, settings.compute_inertia) => {
            return Ok(Regularization {
                coefficient: T::zero(),
                dual_coefficient: T::zero(),
                inertia,
                kkt: kkt.clone(),
            });
        }
        Ok(inertia) => {
            state.last_inertia = Some(inertia);
            inertia.is_singular()
        }
        Err(LinearSolverError::Singular) => true,
        Err(e) => return Err(e.into()),
    };

    if is_singular {
        state.dual = settings.dual_base * kkt.barrier.powf(settings.dual_exponent);
    }
    state.primal = settings.initial_coefficient;

    while state.attempts < settings.max_iter {
        state.attempts += 1;
        let candidate = kkt.regularized(state.primal, state.dual);

        match linsolver.factorize(&candidate.matrix) {
            Ok(inertia) => {
                debug!(
                    "regularization attempt {}: δ = {:.1e}, δc = {:.1e}, inertia {}",
                    state.attempts, state.primal, state.dual, inertia
                );
                state.last_inertia = Some(inertia);
                if is_acceptable(inertia, expected, settings.compute_inertia) {
                    return Ok(Regularization {
                        coefficient: state.primal,
                        dual_coefficient: state.dual,
                        inertia,
                        kkt: candidate,
                    });
                }
            }
            Err(LinearSolverError::Singular) => {
                debug!(
                    "regularization attempt {}: δ = {:.1e}, δc = {:.1e}, singular",
                    state.attempts, state.primal, state.dual
                );
                state.last_inertia = None;
            }
            Err(e) => return Err(e.into()),
        }
        state.primal *= settings.growth_factor;
    }

    warn!(
        "KKT regularization exhausted after {} attempts (expected inertia {})",
        state.attempts, expected
    );
    Err(RegularizationError::Exhausted {
        attempts: state.attempts,
        last_inertia: state.last_inertia,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2 primals, 1 equality, no inequalities.
    // W = diag(w, w), Jc = [1 1]
    fn system(w: f64) -> KktMatrix<f64> {
        let H = CscMatrix::new_from_triplets(2, 2, &[0, 1], &[0, 1], &[w, w]);
        let Je = CscMatrix::new_from_triplets(1, 2, &[0, 0], &[0, 1], &[1., 1.]);
        let Ji = CscMatrix::<f64>::zeros(0, 2);
        KktMatrix::from_blocks(&H, &Je, &Ji, &[0., 0.], &[], vec![1.; 3], 0.1)
    }

    #[test]
    fn test_no_regularization_needed() {
        let kkt = system(1.);
        let mut solver = DenseLdlLinearSolver::new(0.0);
        let reg = factorize(&mut solver, &kkt, &RegularizationSettings::default()).unwrap();
        assert_eq!(reg.coefficient, 0.);
        assert_eq!(reg.dual_coefficient, 0.);
        assert_eq!(reg.inertia, Inertia::new(2, 1, 0));
    }

    #[test]
    fn test_wrong_inertia_skips_dual() {
        // nonsingular with too many negative eigenvalues.
        // needs δ > 1, i.e. the third coefficient 1e-4 * 100^2
        let kkt = system(-0.5);
        let mut solver = DenseLdlLinearSolver::new(0.0);
        let reg = factorize(&mut solver, &kkt, &RegularizationSettings::default()).unwrap();
        assert!((reg.coefficient - 1.).abs() < 1e-12);
        assert_eq!(reg.dual_coefficient, 0.);
        assert_eq!(reg.inertia, kkt.expected_inertia());
        assert_eq!(solver.inertia(), Some(reg.inertia));
    }

    #[test]
    fn test_exhausted() {
        let kkt = system(-1e6);
        let settings = RegularizationSettingsBuilder::default()
            .max_iter(3_u32)
            .build()
            .unwrap();
        let mut solver = DenseLdlLinearSolver::new(0.0);
        let err = factorize(&mut solver, &kkt, &settings).unwrap_err();
        assert!(matches!(
            err,
            RegularizationError::Exhausted {
                attempts: 3,
                last_inertia: Some(_)
            }
        ));
    }

    #[test]
    fn test_inertia_ignored() {
        let kkt = system(-0.5);
        let settings = RegularizationSettingsBuilder::default()
            .compute_inertia(false)
            .build()
            .unwrap();
        let mut solver = DenseLdlLinearSolver::new(0.0);
        let reg = factorize(&mut solver, &kkt, &settings).unwrap();
        assert_eq!(reg.coefficient, 0.);
        assert_eq!(reg.inertia, Inertia::new(1, 2, 0));
    }
}
