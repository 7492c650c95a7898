#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::cones::{ConeSet, SupportedCone};
use std::time::Instant;

/// User supplied early-termination check, called once per iteration
pub trait TerminationCallbackFn<T>: FnMut(&SolveInfo<T>) -> bool + Send {}
impl<T, F: FnMut(&SolveInfo<T>) -> bool + Send> TerminationCallbackFn<T> for F {}

/// Solver for conic programs in the standard form
/// ```text
/// minimize    (1/2) x'Px + q'x
/// subject to  Ax + s = b,  s ∈ K
/// ```
pub struct Solver<T: FloatT = f64> {
    pub data: ProblemData<T>,
    pub variables: Variables<T>,
    pub residuals: Residuals<T>,
    pub kktsystem: KKTSystem<T>,
    pub cones: ConeSet<T>,
    pub info: SolveInfo<T>,
    pub solution: Solution<T>,
    pub settings: Settings<T>,

    //step directions and the fallback copy of the best iterate
    step_lhs: Variables<T>,
    step_rhs: Variables<T>,
    prev_vars: Variables<T>,

    termination_callback: Option<Box<dyn TerminationCallbackFn<T>>>,
}

impl<T> Solver<T>
where
    T: FloatT,
{
    /// Create a solver for the given problem data and settings.
    ///
    /// # Panics
    /// Panics if the dimensions of the problem data and the cone
    /// specification are inconsistent.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_specs: &[SupportedCone<T>],
        settings: Settings<T>,
    ) -> Self {
        _check_dimensions(P, q, A, b, cone_specs);

        let cones = ConeSet::<T>::new(cone_specs);
        let mut data = ProblemData::<T>::new(P, q, A, b);

        //equilibrate once at setup, so that repeated solves don't
        //rescale repeatedly
        data.equilibrate(&cones, &settings);

        let variables = Variables::<T>::new(data.n, data.m);
        let residuals = Residuals::<T>::new(data.n, data.m);
        let kktsystem = KKTSystem::<T>::new(&data, &cones, &settings);

        let step_rhs = Variables::<T>::new(data.n, data.m);
        let step_lhs = Variables::<T>::new(data.n, data.m);
        let prev_vars = Variables::<T>::new(data.n, data.m);

        let info = SolveInfo::<T>::new();
        let solution = Solution::<T>::new(data.n, data.m);

        Self {
            data,
            variables,
            residuals,
            kktsystem,
            cones,
            info,
            solution,
            settings,
            step_lhs,
            step_rhs,
            prev_vars,
            termination_callback: None,
        }
    }

    /// Install a callback that can stop the solver between iterations.
    ///
    /// The solver terminates with
    /// [`CallbackTerminated`](SolverStatus::CallbackTerminated) status
    /// when the callback returns true.
    pub fn set_termination_callback(&mut self, callback: impl TerminationCallbackFn<T> + 'static) {
        self.termination_callback = Some(Box::new(callback));
    }

    /// Remove an installed termination callback.
    pub fn unset_termination_callback(&mut self) {
        self.termination_callback = None;
    }

    /// Run the solver.  Results are placed in
    /// [`solution`](Solver::solution).
    pub fn solve(&mut self) {
        let start_time = Instant::now();
        let mut iter: u32 = 0;

        self.info.reset();

        if !self.default_start() {
            self.info.status = SolverStatus::NumericalError;
        } else {
            // ----------
            // main loop
            // ----------
            loop {
                //residuals and centrality of the current iterate
                //--------------
                self.residuals.update(&self.variables, &self.data);
                let μ = self.variables.calc_mu(&self.residuals, &self.cones);

                //convergence checks, keeping the previous iterate
                //recoverable in case progress stalls
                //--------------
                self.info
                    .save_prev_iterate(&self.variables, &mut self.prev_vars);
                self.info.update(
                    &self.data,
                    &self.variables,
                    &self.residuals,
                    start_time.elapsed().as_secs_f64(),
                );

                let mut isdone =
                    self.info
                        .check_termination(&self.residuals, &self.settings, iter);

                if !isdone {
                    if let Some(callback) = self.termination_callback.as_mut() {
                        if callback(&self.info) {
                            self.info.status = SolverStatus::CallbackTerminated;
                            isdone = true;
                        }
                    }
                }

                if isdone {
                    if self.info.status == SolverStatus::InsufficientProgress {
                        //fall back to the previous (better) iterate
                        self.info
                            .reset_to_prev_iterate(&mut self.variables, &self.prev_vars);
                    }
                    break;
                }
                iter += 1;

                //update the scalings
                //--------------
                if !self.variables.scale_cones(&mut self.cones, μ) {
                    self.info.status = SolverStatus::NumericalError;
                    break;
                }

                //update the KKT system and its constant RHS cache
                //--------------
                if !self
                    .kktsystem
                    .update(&self.data, &self.cones, &self.settings)
                {
                    self.info.status = SolverStatus::NumericalError;
                    break;
                }

                //affine (predictor) step
                //--------------
                self.step_rhs
                    .affine_step_rhs(&self.residuals, &self.variables, &self.cones);

                if !self.kktsystem.solve(
                    &mut self.step_lhs,
                    &self.step_rhs,
                    &self.data,
                    &self.variables,
                    &mut self.cones,
                    StepDirection::Affine,
                    &self.settings,
                ) {
                    self.info.status = SolverStatus::NumericalError;
                    break;
                }

                //centering parameter from the affine step length
                //--------------
                let α_aff = self.variables.calc_step_length(
                    &self.step_lhs,
                    &mut self.cones,
                    &self.settings,
                    StepDirection::Affine,
                );
                let σ = _centering_parameter(α_aff);

                //combined (corrector) step
                //--------------
                self.step_rhs.combined_step_rhs(
                    &self.residuals,
                    &self.variables,
                    &mut self.cones,
                    &mut self.step_lhs,
                    σ,
                    μ,
                );

                if !self.kktsystem.solve(
                    &mut self.step_lhs,
                    &self.step_rhs,
                    &self.data,
                    &self.variables,
                    &mut self.cones,
                    StepDirection::Combined,
                    &self.settings,
                ) {
                    self.info.status = SolverStatus::NumericalError;
                    break;
                }

                //final step length, with a geometric backtrack for
                //asymmetric cones until the barrier is defined at the
                //shifted point
                //--------------
                let mut α = self.variables.calc_step_length(
                    &self.step_lhs,
                    &mut self.cones,
                    &self.settings,
                    StepDirection::Combined,
                );

                if !self.cones.is_symmetric() {
                    let backtrack = self.settings.linesearch_backtrack_step;
                    let αmin = self.settings.min_terminate_step_length;

                    while !self
                        .variables
                        .barrier(&self.step_lhs, α, &mut self.cones)
                        .is_finite()
                    {
                        α *= backtrack;
                        if α < αmin {
                            self.info.status = SolverStatus::InsufficientProgress;
                            break;
                        }
                    }
                    if self.info.status == SolverStatus::InsufficientProgress {
                        self.info
                            .reset_to_prev_iterate(&mut self.variables, &self.prev_vars);
                        break;
                    }
                }

                //update the iterate, atomically across all variables
                //--------------
                self.variables.add_step(&self.step_lhs, α);
                self.variables.rescale();

                self.info.save_scalars(μ, α, σ, iter);
            } //end main loop
        }

        self.info.finalize(
            &self.residuals,
            &self.settings,
            start_time.elapsed().as_secs_f64(),
        );
        self.solution
            .post_process(&self.data, &mut self.variables, &self.info);
        self.solution.finalize(&self.info);
    }

    //starting point: for fully symmetric problems an initial KKT
    //solve shifted into the cone interiors, otherwise the canonical
    //unit point of the asymmetric cones
    fn default_start(&mut self) -> bool {
        if self.cones.is_symmetric() {
            //identity scalings (or zero for the zero cone)
            self.cones.set_identity_scaling();

            let is_success = self
                .kktsystem
                .update(&self.data, &self.cones, &self.settings)
                && self.kktsystem.solve_initial_point(
                    &mut self.variables,
                    &self.data,
                    &self.settings,
                );
            if !is_success {
                return false;
            }

            self.variables.symmetric_initialization(&mut self.cones);
        } else {
            self.variables.unit_initialization(&self.cones);
        }
        true
    }
}

// Mehrotra heuristic σ = (1-α)³, clipped into [0,1]
fn _centering_parameter<T: FloatT>(α: T) -> T {
    T::powi(T::one() - α, 3).clip(T::zero(), T::one())
}

fn _check_dimensions<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    b: &[T],
    cone_specs: &[SupportedCone<T>],
) {
    let m = b.len();
    let n = q.len();
    let p = cone_specs.iter().fold(0, |acc, cone| acc + cone.nvars());

    assert_eq!(m, A.nrows(), "A and b have incompatible dimensions.");
    assert_eq!(
        p, m,
        "Constraint dimensions inconsistent with size of cones."
    );
    assert_eq!(n, A.ncols(), "A and q have incompatible dimensions.");
    assert_eq!(n, P.ncols(), "P and q have incompatible dimensions.");
    assert!(P.is_square(), "P is not square.");
}
