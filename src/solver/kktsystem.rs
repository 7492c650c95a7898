#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::cones::ConeSet;
use crate::solver::kkt::DirectKKTSolver;

/// Predictor / corrector step marker
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StepDirection {
    Affine,
    Combined,
}

// ---------------
// driver for the reduced KKT solves of the embedding
// ---------------

pub struct KKTSystem<T> {
    kktsolver: DirectKKTSolver<T>,

    //solution of the constant-RHS system, refreshed once per
    //factorisation
    x2: Vec<T>,
    z2: Vec<T>,

    //solution of the variable-RHS system
    x1: Vec<T>,
    z1: Vec<T>,

    //workspace
    workx: Vec<T>,
    workz: Vec<T>,
    work_conic: Vec<T>,
}

impl<T> KKTSystem<T>
where
    T: FloatT,
{
    pub fn new(data: &ProblemData<T>, cones: &ConeSet<T>, settings: &Settings<T>) -> Self {
        let (m, n) = (data.m, data.n);

        let kktsolver = DirectKKTSolver::<T>::new(&data.P, &data.A, cones, m, n, settings);

        Self {
            kktsolver,
            x1: vec![T::zero(); n],
            z1: vec![T::zero(); m],
            x2: vec![T::zero(); n],
            z2: vec![T::zero(); m],
            workx: vec![T::zero(); n],
            workz: vec![T::zero(); m],
            work_conic: vec![T::zero(); m],
        }
    }

    /// refresh the scaling dependent KKT entries, refactor, and
    /// recompute the constant-RHS cache.  False on numerical failure
    pub(crate) fn update(
        &mut self,
        data: &ProblemData<T>,
        cones: &ConeSet<T>,
        settings: &Settings<T>,
    ) -> bool {
        if !self.kktsolver.update(cones, settings) {
            return false;
        }

        //cache the solution of K [x2; z2] = [-q; b]
        self.workx.scalarop_from(|q| -q, &data.q);
        self.kktsolver.setrhs(&self.workx, &data.b);
        self.kktsolver
            .solve(Some(&mut self.x2[..]), Some(&mut self.z2[..]), settings)
    }

    /// reduced 2x2 solve and recovery of the full step
    /// (Δx, Δz, Δs, Δτ, Δκ)
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn solve(
        &mut self,
        lhs: &mut Variables<T>,
        rhs: &Variables<T>,
        data: &ProblemData<T>,
        variables: &Variables<T>,
        cones: &mut ConeSet<T>,
        steptype: StepDirection,
        settings: &Settings<T>,
    ) -> bool {
        let (x1, z1) = (&mut self.x1, &mut self.z1);
        let (x2, z2) = (&self.x2, &self.z2); //constant-RHS cache, read only
        let (workx, workz) = (&mut self.workx, &mut self.workz);

        workx.copy_from(&rhs.x);

        //the constant term c in the step equation HₛΔz + Δs = -c,
        //with the affine-case shortcut Wᵀ(λ \ λ∘λ) = s
        let Δs_const_term = &mut self.work_conic;
        match steptype {
            StepDirection::Affine => {
                Δs_const_term.copy_from(&variables.s);
            }
            StepDirection::Combined => {
                //lhs.z is about to be overwritten, so it serves as
                //workspace here
                cones.Δs_from_Δz_offset(Δs_const_term, &rhs.s, &mut lhs.z, &variables.z);
            }
        }

        workz.waxpby(T::one(), Δs_const_term, -T::one(), &rhs.z);

        //solve the variable part of the reduced system
        self.kktsolver.setrhs(workx, workz);
        if !self
            .kktsolver
            .solve(Some(&mut x1[..]), Some(&mut z1[..]), settings)
        {
            return false;
        }

        //Δτ from its closed form numerator and denominator.
        //workx is reused as ξ = x/τ, and then as ξ - x2; the two
        //phases must not be mixed
        let ξ = workx;
        ξ.axpby(T::recip(variables.τ), &variables.x, T::zero());

        let two: T = (2.).as_T();
        let tau_num = rhs.τ - rhs.κ / variables.τ
            + data.q.dot(x1)
            + data.b.dot(z1)
            + two * data.P.quad_form(ξ, x1);

        let ξ_minus_x2 = ξ; //alias of workx
        ξ_minus_x2.axpby(-T::one(), x2, T::one());

        let mut tau_den = variables.κ / variables.τ - data.q.dot(x2) - data.b.dot(z2);
        tau_den += data.P.quad_form(ξ_minus_x2, ξ_minus_x2) - data.P.quad_form(x2, x2);

        //(Δx, Δz)
        lhs.τ = tau_num / tau_den;
        lhs.x.waxpby(T::one(), x1, lhs.τ, x2);
        lhs.z.waxpby(T::one(), z1, lhs.τ, z2);

        //Δs = -(c + HₛΔz), with Hs = WᵀW or μH(z) as appropriate
        cones.mul_Hs(&mut lhs.s, &lhs.z, workz);
        lhs.s.axpby(-T::one(), Δs_const_term, -T::one());

        //Δκ
        lhs.κ = -(rhs.κ + variables.κ * lhs.τ) / variables.τ;

        //no further validation here; the lhs is checked by the caller
        true
    }

    /// solve for the default starting point of a fully symmetric
    /// problem.  False on numerical failure
    pub(crate) fn solve_initial_point(
        &mut self,
        variables: &mut Variables<T>,
        data: &ProblemData<T>,
        settings: &Settings<T>,
    ) -> bool {
        if data.P.nnz() == 0 {
            // LP-style initialization: solve with [0;b] for (x,-s),
            // then with [-q;0] for z
            self.workx.fill(T::zero());
            self.workz.copy_from(&data.b);
            self.kktsolver.setrhs(&self.workx, &self.workz);
            let is_success = self.kktsolver.solve(
                Some(&mut variables.x[..]),
                Some(&mut variables.s[..]),
                settings,
            );
            if !is_success {
                return false;
            }
            variables.s.negate();

            self.workx.scalarop_from(|q| -q, &data.q);
            self.workz.fill(T::zero());
            self.kktsolver.setrhs(&self.workx, &self.workz);
            self.kktsolver
                .solve(None, Some(&mut variables.z[..]), settings)
        } else {
            // QP-style initialization: solve with [-q;b] for (x,z),
            // and take s = -z
            self.workx.scalarop_from(|q| -q, &data.q);
            self.workz.copy_from(&data.b);
            self.kktsolver.setrhs(&self.workx, &self.workz);
            let is_success = self.kktsolver.solve(
                Some(&mut variables.x[..]),
                Some(&mut variables.z[..]),
                settings,
            );
            variables.s.scalarop_from(|z| -z, &variables.z);

            is_success
        }
    }
}
