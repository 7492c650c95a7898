#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::cones::{ConeSet, PrimalOrDualCone};

// ---------------
// homogeneous embedding variables and step logic
// ---------------

/// Variables of the homogeneous self-dual embedding `(x, s, z, τ, κ)`
pub struct Variables<T> {
    /// primal variables
    pub x: Vec<T>,
    /// slack variables, in K
    pub s: Vec<T>,
    /// dual variables, in the dual cone K*
    pub z: Vec<T>,
    /// homogenization scalar τ
    pub τ: T,
    /// homogenization scalar κ
    pub κ: T,
}

impl<T> Variables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            s: vec![T::zero(); m],
            z: vec![T::zero(); m],
            τ: T::one(),
            κ: T::one(),
        }
    }

    /// centrality parameter μ = (s'z + τκ)/(ν+1)
    pub fn calc_mu(&self, residuals: &Residuals<T>, cones: &ConeSet<T>) -> T {
        let denom = (cones.degree() + 1).as_T();
        (residuals.dot_sz + self.τ * self.κ) / denom
    }

    //RHS for the affine (predictor) step, assembled into self
    pub(crate) fn affine_step_rhs(
        &mut self,
        residuals: &Residuals<T>,
        variables: &Self,
        cones: &ConeSet<T>,
    ) {
        self.x.copy_from(&residuals.rx);
        self.z.copy_from(&residuals.rz);
        cones.affine_ds(&mut self.s, &variables.s);
        self.τ = residuals.rτ;
        self.κ = variables.τ * variables.κ;
    }

    //RHS for the combined (corrector) step.  The affine step in
    //`step` is consumed as workspace by the cone shift terms
    pub(crate) fn combined_step_rhs(
        &mut self,
        residuals: &Residuals<T>,
        variables: &Self,
        cones: &mut ConeSet<T>,
        step: &mut Self,
        σ: T,
        μ: T,
    ) {
        let dotσμ = σ * μ;

        self.x.axpby(T::one() - σ, &residuals.rx, T::zero());
        self.τ = (T::one() - σ) * residuals.rτ;
        self.κ = -dotσμ + step.τ * step.κ + variables.τ * variables.κ;

        // ds differs between symmetric and asymmetric cones:
        //   symmetric:  ds = λ ∘ λ + W⁻¹Δs ∘ WΔz − σμe
        //   asymmetric: ds = s + σμ⋅grad f*(z)
        // z is used as scratch for the shift term, then takes the
        // scaled rz residual
        cones.combined_ds_shift(&mut self.z, &mut step.z, &mut step.s, dotσμ);

        //d.s holds the affine term already, from affine_step_rhs
        self.s.axpby(T::one(), &self.z, T::one());

        self.z.axpby(T::one() - σ, &residuals.rz, T::zero());
    }

    /// maximum step in the given direction staying inside the cones,
    /// with the τ and κ scalars constrained by ratio tests
    pub(crate) fn calc_step_length(
        &self,
        step: &Self,
        cones: &mut ConeSet<T>,
        settings: &Settings<T>,
        steptype: StepDirection,
    ) -> T {
        let ατ = {
            if step.τ < T::zero() {
                -self.τ / step.τ
            } else {
                T::max_value()
            }
        };

        let ακ = {
            if step.κ < T::zero() {
                -self.κ / step.κ
            } else {
                T::max_value()
            }
        };

        let α = [ατ, ακ, T::one()].minimum();
        let (αz, αs) = cones.step_length(&step.z, &step.s, &self.z, &self.s, settings, α);
        let mut α = T::min(αz, αs);

        if steptype == StepDirection::Combined {
            α *= settings.max_step_fraction;
        }

        α
    }

    pub(crate) fn add_step(&mut self, step: &Self, α: T) {
        self.x.axpby(α, &step.x, T::one());
        self.s.axpby(α, &step.s, T::one());
        self.z.axpby(α, &step.z, T::one());
        self.τ += α * step.τ;
        self.κ += α * step.κ;
    }

    //initialization for fully symmetric problems, shifting the KKT
    //based starting point into the cone interiors
    pub(crate) fn symmetric_initialization(&mut self, cones: &mut ConeSet<T>) {
        _shift_to_cone_interior(&mut self.s, cones, PrimalOrDualCone::PrimalCone);
        _shift_to_cone_interior(&mut self.z, cones, PrimalOrDualCone::DualCone);

        self.τ = T::one();
        self.κ = T::one();
    }

    //initialization at the canonical interior unit point, used when
    //any cone is asymmetric
    pub(crate) fn unit_initialization(&mut self, cones: &ConeSet<T>) {
        cones.unit_initialization(&mut self.z, &mut self.s);

        self.x.fill(T::zero());
        self.τ = T::one();
        self.κ = T::one();
    }

    pub(crate) fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.s.copy_from(&src.s);
        self.z.copy_from(&src.z);
        self.τ = src.τ;
        self.κ = src.κ;
    }

    pub(crate) fn scale_cones(&self, cones: &mut ConeSet<T>, μ: T) -> bool {
        cones.update_scaling(&self.s, &self.z, μ)
    }

    /// barrier function of the embedding at (self + α⋅step)
    pub(crate) fn barrier(&self, step: &Self, α: T, cones: &mut ConeSet<T>) -> T {
        let central_coef = (cones.degree() + 1).as_T();

        let cur_τ = self.τ + α * step.τ;
        let cur_κ = self.κ + α * step.κ;

        let sz = <[T] as VectorMath<T>>::dot_shifted(&self.z, &self.s, &step.z, &step.s, α);
        let μ = (sz + cur_τ * cur_κ) / central_coef;

        //terms from the gap and homogenization scalars
        let mut barrier = central_coef * μ.logsafe() - cur_τ.logsafe() - cur_κ.logsafe();

        //terms from the cones
        barrier += cones.compute_barrier(&self.z, &self.s, &step.z, &step.s, α);

        barrier
    }

    //renormalize the embedding against drift in (τ,κ)
    pub(crate) fn rescale(&mut self) {
        let scale = T::max(self.τ, self.κ);
        let invscale = scale.recip();

        self.x.scale(invscale);
        self.z.scale(invscale);
        self.s.scale(invscale);
        self.τ *= invscale;
        self.κ *= invscale;
    }

    //undo the equilibration and the homogenization to recover a
    //solution of the user's problem.  Infeasibility certificates are
    //rays, so they are not normalized by τ
    pub(crate) fn unscale(&mut self, data: &ProblemData<T>, is_infeasible: bool) {
        let d = &data.equilibration.d;
        let e = &data.equilibration.e;
        let einv = &data.equilibration.einv;
        let cinv = T::recip(data.equilibration.c);

        let scaleinv = {
            if is_infeasible {
                T::one()
            } else {
                T::recip(self.τ)
            }
        };

        self.x.hadamard(d).scale(scaleinv);
        self.z.hadamard(e).scale(scaleinv * cinv);
        self.s.hadamard(einv).scale(scaleinv);
    }
}

fn _shift_to_cone_interior<T>(z: &mut [T], cones: &mut ConeSet<T>, pd: PrimalOrDualCone)
where
    T: FloatT,
{
    let (min_margin, pos_margin) = cones.margins(z, pd);
    let target = T::max(
        T::one(),
        (pos_margin * (0.1).as_T()) / (cones.degree()).as_T(),
    );

    if min_margin <= T::zero() {
        // some component is outside its cone.  Two stages, since for
        // large margins (target - min_margin) can cancel to exactly
        // zero (or -0.0)
        cones.scaled_unit_shift(z, -min_margin, pd);
        cones.scaled_unit_shift(z, target, pd);
    } else if min_margin < target {
        // positive but small margin
        cones.scaled_unit_shift(z, target - min_margin, pd);
    } else {
        // good margin.  Shift explicitly by zero anyway to catch
        // elements in the zero cone that must be forced to zero
        cones.scaled_unit_shift(z, T::zero(), pd);
    }
}
