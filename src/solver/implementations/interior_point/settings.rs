use crate::algebra::*;
use crate::solver::core::kkt::RegularizationSettings;
use crate::solver::core::linsolvers::validate_direct_solve_method;
use crate::solver::core::SettingsError;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Settings for the [`InteriorPointSolver`](super::InteriorPointSolver)

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteriorPointSettings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "1000")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///tolerance on primal infeasibility, dual infeasibility and complementarity
    #[builder(default = "(1e-8).as_T()")]
    pub tol: T,

    ///initial barrier parameter
    #[builder(default = "(0.1).as_T()")]
    pub mu_init: T,

    ///smallest barrier parameter
    #[builder(default = "(1e-9).as_T()")]
    pub mu_min: T,

    ///linear barrier reduction factor
    #[builder(default = "(0.2).as_T()")]
    pub mu_linear_decrease: T,

    ///superlinear barrier reduction power
    #[builder(default = "(1.5).as_T()")]
    pub mu_superlinear_power: T,

    ///barrier is reduced once the barrier problem error is below this multiple of μ
    #[builder(default = "(0.1).as_T()")]
    pub barrier_tol_factor: T,

    ///lower bound on the fraction to the boundary parameter τ
    #[builder(default = "(0.9).as_T()")]
    pub tau_min: T,

    ///enable KKT inertia correction
    #[builder(default = "true")]
    pub regularize_kkt: bool,

    ///use the inertia reported by the linear solver.  If false,
    ///only singular factorizations trigger regularization
    #[builder(default = "true")]
    pub compute_inertia: bool,

    ///first primal regularization coefficient
    #[builder(default = "(1e-4).as_T()")]
    pub regularization_initial: T,

    ///primal regularization growth factor
    #[builder(default = "(100.).as_T()")]
    pub regularization_growth: T,

    ///maximum number of primal regularization coefficients tried
    #[builder(default = "10")]
    pub regularization_max_iter: u32,

    ///dual regularization is `base * μ^exponent`
    #[builder(default = "(1e-8).as_T()")]
    pub dual_regularization_base: T,

    #[builder(default = "(0.25).as_T()")]
    pub dual_regularization_exponent: T,

    ///direct linear solver method ("auto", "qdldl" or "dense")
    #[builder(default = r#""auto".to_string()"#)]
    pub direct_solve_method: String,

    ///pivots at or below this magnitude are treated as zero
    #[builder(default = "(1e-30).as_T()")]
    pub pivot_tolerance: T,
}

impl<T> Default for InteriorPointSettings<T>
where
    T: FloatT,
{
    fn default() -> InteriorPointSettings<T> {
        InteriorPointSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> InteriorPointSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_direct_solve_method(&self.direct_solve_method)?;

        check_positive(self.tol, "tol")?;
        check_positive(self.mu_init, "mu_init")?;
        check_positive(self.mu_min, "mu_min")?;
        check_unit_interval(self.mu_linear_decrease, "mu_linear_decrease")?;
        check_unit_interval(self.tau_min, "tau_min")?;
        check_positive(self.regularization_initial, "regularization_initial")?;
        check_positive(self.mu_superlinear_power - T::one(), "mu_superlinear_power")?;
        check_positive(self.regularization_growth - T::one(), "regularization_growth")?;

        if !(self.pivot_tolerance >= T::zero()) {
            return Err(SettingsError::BadFieldValue("pivot_tolerance"));
        }
        if self.time_limit.is_nan() || self.time_limit < 0. {
            return Err(SettingsError::BadFieldValue("time_limit"));
        }
        Ok(())
    }

    /// Parameters of the inertia correction derived from these settings
    pub fn regularization(&self) -> RegularizationSettings<T> {
        RegularizationSettings {
            initial_coefficient: self.regularization_initial,
            growth_factor: self.regularization_growth,
            max_iter: self.regularization_max_iter,
            dual_base: self.dual_regularization_base,
            dual_exponent: self.dual_regularization_exponent,
            compute_inertia: self.compute_inertia,
        }
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for InteriorPointSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        InteriorPointSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> InteriorPointSettingsBuilder<T>
where
    T: FloatT,
{
    /// check that the specified direct_solve_method is valid
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(ref direct_solve_method) = self.direct_solve_method {
            validate_direct_solve_method(direct_solve_method)?;
        }
        if let Some(tau_min) = self.tau_min {
            check_unit_interval(tau_min, "tau_min")?;
        }
        Ok(())
    }
}

fn check_positive<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn check_unit_interval<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() && v < T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    InteriorPointSettingsBuilder::<f64>::default().build().unwrap();

    // fail on unknown direct solve method
    assert!(InteriorPointSettingsBuilder::<f64>::default()
        .direct_solve_method("foo".to_string())
        .build()
        .is_err());

    assert!(InteriorPointSettingsBuilder::<f64>::default()
        .tau_min(1.5)
        .build()
        .is_err());

    // directly construct bad settings and manually check
    let settings = InteriorPointSettings::<f64> {
        mu_init: 0.,
        ..InteriorPointSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("mu_init"))
    );

    let settings = InteriorPointSettings::<f64> {
        direct_solve_method: "ma57".to_string(),
        ..InteriorPointSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SettingsError::LinearSolver(_))
    ));

    let reg = InteriorPointSettings::<f64>::default().regularization();
    assert_eq!(reg.initial_coefficient, 1e-4);
    assert_eq!(reg.growth_factor, 100.);
    assert_eq!(reg.max_iter, 10);
}
