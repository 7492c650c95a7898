use crate::algebra::*;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Solver configuration.
///
/// Construct directly, via [`Settings::default`](Settings::default),
/// or through [`SettingsBuilder`](SettingsBuilder) for a validated
/// subset of non-default choices.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "200")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///maximum interior point step length
    #[builder(default = "(0.99).as_T()")]
    pub max_step_fraction: T,

    ///absolute duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub eps_abs: T,

    ///relative duality gap and residual tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub eps_rel: T,

    ///infeasibility certificate tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub eps_infeasible: T,

    ///κ/τ tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub tol_ktratio: T,

    ///reduced absolute gap tolerance for the "almost solved" band
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_eps_abs: T,

    ///reduced relative gap and residual tolerance
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_eps_rel: T,

    ///reduced infeasibility certificate tolerance
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_eps_infeasible: T,

    ///reduced κ/τ tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub reduced_tol_ktratio: T,

    ///enable data equilibration pre-scaling
    #[builder(default = "true")]
    pub equilibrate_enable: bool,

    ///maximum equilibration scaling iterations
    #[builder(default = "10")]
    pub equilibrate_max_iter: u32,

    ///minimum equilibration scaling allowed
    #[builder(default = "(1e-4).as_T()")]
    pub equilibrate_min_scaling: T,

    ///maximum equilibration scaling allowed
    #[builder(default = "(1e+4).as_T()")]
    pub equilibrate_max_scaling: T,

    ///line search backtracking factor
    #[builder(default = "(0.8).as_T()")]
    pub linesearch_backtrack_step: T,

    ///step length below which the solver gives up
    #[builder(default = "(1e-4).as_T()")]
    pub min_terminate_step_length: T,

    ///direct linear solver backend ("qdldl")
    #[builder(default = r#""qdldl".to_string()"#)]
    pub direct_solve_method: String,

    ///enable KKT static regularization
    #[builder(default = "true")]
    pub static_regularization_enable: bool,

    ///KKT static regularization parameter
    #[builder(default = "(1e-8).as_T()")]
    pub static_regularization_eps: T,

    ///enable dynamic regularization inside the LDL factorisation
    #[builder(default = "true")]
    pub dynamic_regularization_enable: bool,

    ///dynamic regularization pivot threshold
    #[builder(default = "(1e-13).as_T()")]
    pub dynamic_regularization_eps: T,

    ///dynamic regularization pivot replacement
    #[builder(default = "(2e-7).as_T()")]
    pub dynamic_regularization_delta: T,

    ///KKT direct solve with iterative refinement
    #[builder(default = "true")]
    pub iterative_refinement_enable: bool,

    ///iterative refinement relative tolerance
    #[builder(default = "(1e-10).as_T()")]
    pub iterative_refinement_reltol: T,

    ///iterative refinement absolute tolerance
    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_abstol: T,

    ///iterative refinement maximum iterations
    #[builder(default = "10")]
    pub iterative_refinement_max_iter: u32,

    ///iterative refinement stalling tolerance
    #[builder(default = "(2.0).as_T()")]
    pub iterative_refinement_stop_ratio: T,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        SettingsBuilder::<T>::default().build().unwrap()
    }
}

// pre-build check used by the builder
impl<T> SettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), String> {
        if let Some(ref direct_solve_method) = self.direct_solve_method {
            validate_direct_solve_method(direct_solve_method.as_str())?;
        }
        Ok(())
    }
}

// post-build check for settings assembled by hand
impl<T> Settings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid
    pub fn validate(&self) -> Result<(), String> {
        validate_direct_solve_method(&self.direct_solve_method)
    }
}

fn validate_direct_solve_method(direct_solve_method: &str) -> Result<(), String> {
    match direct_solve_method {
        "qdldl" => Ok(()),
        _ => Err(format!(
            "Invalid direct_solve_method: {:?}",
            direct_solve_method
        )),
    }
}

#[test]
fn test_settings_validate() {
    //standard settings build cleanly
    SettingsBuilder::<f64>::default().build().unwrap();

    //unknown solve methods are rejected
    assert!(SettingsBuilder::<f64>::default()
        .direct_solve_method("foo".to_string())
        .build()
        .is_err());
}
