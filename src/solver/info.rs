use super::*;
use crate::algebra::*;

// ---------------
// solver status and per-iteration progress information
// ---------------

/// Reported solver status
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run)
    #[default]
    Unsolved,
    /// Solved to full accuracy
    Solved,
    /// Primal infeasibility certificate found
    PrimalInfeasible,
    /// Dual infeasibility certificate found
    DualInfeasible,
    /// Solved to reduced accuracy
    AlmostSolved,
    /// Primal infeasibility certificate found at reduced accuracy
    AlmostPrimalInfeasible,
    /// Dual infeasibility certificate found at reduced accuracy
    AlmostDualInfeasible,
    /// Iteration limit reached
    MaxIterations,
    /// Time limit reached
    TimeLimit,
    /// Solver terminated with a numerical error
    NumericalError,
    /// Solver terminated due to lack of progress
    InsufficientProgress,
    /// Solver terminated by a user supplied callback
    CallbackTerminated,
}

impl SolverStatus {
    pub(crate) fn is_infeasible(&self) -> bool {
        matches!(
            *self,
            SolverStatus::PrimalInfeasible
                | SolverStatus::DualInfeasible
                | SolverStatus::AlmostPrimalInfeasible
                | SolverStatus::AlmostDualInfeasible
        )
    }

    pub(crate) fn is_errored(&self) -> bool {
        matches!(
            *self,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Progress and convergence information, refreshed every iteration
#[derive(Default, Debug, Clone)]
pub struct SolveInfo<T> {
    /// centrality parameter
    pub μ: T,
    /// most recent centering parameter
    pub σ: T,
    /// most recent step length
    pub step_length: T,
    /// iteration count
    pub iterations: u32,
    /// primal objective (unscaled)
    pub cost_primal: T,
    /// dual objective (unscaled)
    pub cost_dual: T,
    /// relative primal residual
    pub res_primal: T,
    /// relative dual residual
    pub res_dual: T,
    /// primal infeasibility certificate residual
    pub res_primal_inf: T,
    /// dual infeasibility certificate residual
    pub res_dual_inf: T,
    /// absolute duality gap
    pub gap_abs: T,
    /// relative duality gap
    pub gap_rel: T,
    /// κ/τ ratio
    pub ktratio: T,

    //previous iterate, for progress checks
    prev_cost_primal: T,
    prev_cost_dual: T,
    prev_res_primal: T,
    prev_res_dual: T,
    prev_gap_abs: T,
    prev_gap_rel: T,

    /// total solve time (seconds)
    pub solve_time: f64,
    /// solver status
    pub status: SolverStatus,
}

impl<T> SolveInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;
    }

    pub(crate) fn update(
        &mut self,
        data: &ProblemData<T>,
        variables: &Variables<T>,
        residuals: &Residuals<T>,
        solve_time: f64,
    ) {
        //optimality checks are made against the unscaled and
        //pre-homogenization x and z, so the equilibration and τ must
        //both be backed out here
        let τinv = T::recip(variables.τ);

        let dinv = &data.equilibration.dinv;
        let einv = &data.equilibration.einv;
        let cscale = data.equilibration.c;

        //dot products are invariant under equilibration, but the
        //objective scaling c must still be removed
        let xPx_τinvsq_over2 = residuals.dot_xPx * τinv * τinv / (2.).as_T();
        self.cost_primal = (residuals.dot_qx * τinv + xPx_τinvsq_over2) / cscale;
        self.cost_dual = (-residuals.dot_bz * τinv - xPx_τinvsq_over2) / cscale;

        //unscaled variable norms
        let normx = variables.x.norm_scaled(dinv) * τinv;
        let normz = variables.z.norm_scaled(einv) * τinv;
        let norms = variables.s.norm_scaled(einv) * τinv;

        //primal and dual residuals, unscaled and relative
        self.res_primal = residuals.rz.norm_scaled(einv) * τinv
            / T::max(T::one(), data.normb + normx + norms);
        self.res_dual =
            residuals.rx.norm_scaled(dinv) * τinv / T::max(T::one(), data.normq + normx + normz);

        //certificate residuals, unscaled
        self.res_primal_inf = residuals.rx_inf.norm_scaled(dinv) / T::max(T::one(), normz);
        self.res_dual_inf = T::max(
            residuals.Px.norm_scaled(dinv) / T::max(T::one(), normx),
            residuals.rz_inf.norm_scaled(einv) / T::max(T::one(), normx + norms),
        );

        //absolute and relative gaps
        self.gap_abs = T::abs(self.cost_primal - self.cost_dual);
        self.gap_rel = self.gap_abs
            / T::max(
                T::one(),
                T::min(T::abs(self.cost_primal), T::abs(self.cost_dual)),
            );

        self.ktratio = variables.κ / variables.τ;

        self.solve_time = solve_time;
    }

    pub(crate) fn check_termination(
        &mut self,
        residuals: &Residuals<T>,
        settings: &Settings<T>,
        iter: u32,
    ) -> bool {
        //optimality or infeasibility
        //---------------------
        self.check_convergence_full(residuals, settings);

        //poor progress
        //----------------------
        if self.status == SolverStatus::Unsolved
            && iter > 1u32
            && (self.res_dual > self.prev_res_dual || self.res_primal > self.prev_res_primal)
        {
            //poor progress at high tolerance
            if self.ktratio < T::epsilon() * (100.).as_T()
                && (self.prev_gap_abs < settings.eps_abs || self.prev_gap_rel < settings.eps_rel)
            {
                self.status = SolverStatus::InsufficientProgress;
            }

            //residuals diverging out of the feasibility tolerance
            let tol_feas = T::max(settings.eps_abs, settings.eps_rel);
            if (self.res_dual > tol_feas && self.res_dual > self.prev_res_dual * (100.).as_T())
                || (self.res_primal > tol_feas
                    && self.res_primal > self.prev_res_primal * (100.).as_T())
            {
                self.status = SolverStatus::InsufficientProgress;
            }
        }

        //iteration or time limits
        //----------------------
        if self.status == SolverStatus::Unsolved {
            if settings.max_iter == self.iterations {
                self.status = SolverStatus::MaxIterations;
            } else if self.solve_time > settings.time_limit {
                self.status = SolverStatus::TimeLimit;
            }
        }

        //true when a final status has been settled on
        self.status != SolverStatus::Unsolved
    }

    pub(crate) fn finalize(
        &mut self,
        residuals: &Residuals<T>,
        settings: &Settings<T>,
        solve_time: f64,
    ) {
        //if the iteration or time limit was hit, or the solver went
        //numerically bad, check whether the reduced accuracy band was
        //reached
        if self.status.is_errored()
            || matches!(self.status, SolverStatus::MaxIterations)
            || matches!(self.status, SolverStatus::TimeLimit)
        {
            self.check_convergence_almost(residuals, settings);
        }

        self.solve_time = solve_time;
    }

    pub(crate) fn save_scalars(&mut self, μ: T, α: T, σ: T, iter: u32) {
        self.μ = μ;
        self.step_length = α;
        self.σ = σ;
        self.iterations = iter;
    }

    pub(crate) fn save_prev_iterate(
        &mut self,
        variables: &Variables<T>,
        prev_variables: &mut Variables<T>,
    ) {
        self.prev_cost_primal = self.cost_primal;
        self.prev_cost_dual = self.cost_dual;
        self.prev_res_primal = self.res_primal;
        self.prev_res_dual = self.res_dual;
        self.prev_gap_abs = self.gap_abs;
        self.prev_gap_rel = self.gap_rel;

        prev_variables.copy_from(variables);
    }

    pub(crate) fn reset_to_prev_iterate(
        &mut self,
        variables: &mut Variables<T>,
        prev_variables: &Variables<T>,
    ) {
        self.cost_primal = self.prev_cost_primal;
        self.cost_dual = self.prev_cost_dual;
        self.res_primal = self.prev_res_primal;
        self.res_dual = self.prev_res_dual;
        self.gap_abs = self.prev_gap_abs;
        self.gap_rel = self.prev_gap_rel;

        variables.copy_from(prev_variables);
    }

    fn check_convergence_full(&mut self, residuals: &Residuals<T>, settings: &Settings<T>) {
        self.check_convergence(
            residuals,
            settings.eps_abs,
            settings.eps_rel,
            settings.eps_infeasible,
            settings.tol_ktratio,
            SolverStatus::Solved,
            SolverStatus::PrimalInfeasible,
            SolverStatus::DualInfeasible,
        );
    }

    fn check_convergence_almost(&mut self, residuals: &Residuals<T>, settings: &Settings<T>) {
        self.check_convergence(
            residuals,
            settings.reduced_eps_abs,
            settings.reduced_eps_rel,
            settings.reduced_eps_infeasible,
            settings.reduced_tol_ktratio,
            SolverStatus::AlmostSolved,
            SolverStatus::AlmostPrimalInfeasible,
            SolverStatus::AlmostDualInfeasible,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn check_convergence(
        &mut self,
        residuals: &Residuals<T>,
        eps_abs: T,
        eps_rel: T,
        eps_infeasible: T,
        tol_ktratio: T,
        solved_status: SolverStatus,
        pinf_status: SolverStatus,
        dinf_status: SolverStatus,
    ) {
        if self.ktratio <= T::one() && self.is_solved(eps_abs, eps_rel) {
            self.status = solved_status;
        } else if self.ktratio > tol_ktratio.recip() * (1000.0).as_T() {
            if self.is_primal_infeasible(residuals, eps_infeasible) {
                self.status = pinf_status;
            } else if self.is_dual_infeasible(residuals, eps_infeasible) {
                self.status = dinf_status;
            }
        }
    }

    fn is_solved(&self, eps_abs: T, eps_rel: T) -> bool {
        let tol_feas = T::max(eps_abs, eps_rel);
        ((self.gap_abs < eps_abs) || (self.gap_rel < eps_rel))
            && (self.res_primal < tol_feas)
            && (self.res_dual < tol_feas)
    }

    fn is_primal_infeasible(&self, residuals: &Residuals<T>, eps_infeasible: T) -> bool {
        (residuals.dot_bz < -eps_infeasible)
            && (self.res_primal_inf < -eps_infeasible * residuals.dot_bz)
    }

    fn is_dual_infeasible(&self, residuals: &Residuals<T>, eps_infeasible: T) -> bool {
        (residuals.dot_qx < -eps_infeasible)
            && (self.res_dual_inf < -eps_infeasible * residuals.dot_qx)
    }
}
