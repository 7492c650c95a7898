#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;

// ---------------
// KKT residuals of the homogeneous embedding
// ---------------

/// Residuals of the embedding, with the τ-independent parts kept
/// separately for the infeasibility tests
pub struct Residuals<T> {
    /// dual residual rx = -Px - A'z - qτ
    pub rx: Vec<T>,
    /// primal residual rz = Ax + s - bτ
    pub rz: Vec<T>,
    /// gap residual rτ = q'x + b'z + κ + x'Px/τ
    pub rτ: T,

    /// τ-independent part of rx, for dual infeasibility tests
    pub rx_inf: Vec<T>,
    /// τ-independent part of rz, for primal infeasibility tests
    pub rz_inf: Vec<T>,

    //inner products, invariant under equilibration
    pub(crate) dot_qx: T,
    pub(crate) dot_bz: T,
    pub(crate) dot_sz: T,
    pub(crate) dot_xPx: T,

    //Px on its own, needed for the dual infeasibility test
    pub(crate) Px: Vec<T>,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            rx: vec![T::zero(); n],
            rz: vec![T::zero(); m],
            rτ: T::one(),
            rx_inf: vec![T::zero(); n],
            rz_inf: vec![T::zero(); m],
            dot_qx: T::zero(),
            dot_bz: T::zero(),
            dot_sz: T::zero(),
            dot_xPx: T::zero(),
            Px: vec![T::zero(); n],
        }
    }

    pub(crate) fn update(&mut self, variables: &Variables<T>, data: &ProblemData<T>) {
        //products used multiple times
        let qx = data.q.dot(&variables.x);
        let bz = data.b.dot(&variables.z);
        let sz = variables.s.dot(&variables.z);

        //Px with P treated as symmetric
        let symP = data.P.sym();
        symP.symv(&mut self.Px, &variables.x, T::one(), T::zero());
        let xPx = variables.x.dot(&self.Px);

        //partial residuals, for the infeasibility tests
        // rx_inf = -A'z
        let At = data.A.t();
        At.gemv(&mut self.rx_inf, &variables.z, -T::one(), T::zero());

        // rz_inf = Ax + s
        self.rz_inf.copy_from(&variables.s);
        data.A.gemv(&mut self.rz_inf, &variables.x, T::one(), T::one());

        //complete the residuals
        // rx = rx_inf - Px - qτ
        self.rx.waxpby(-T::one(), &self.Px, -variables.τ, &data.q);
        self.rx.axpby(T::one(), &self.rx_inf, T::one());

        // rz = rz_inf - bτ
        self.rz
            .waxpby(T::one(), &self.rz_inf, -variables.τ, &data.b);

        // rτ = q'x + b'z + κ + x'Px/τ
        self.rτ = qx + bz + variables.κ + xPx / variables.τ;

        self.dot_qx = qx;
        self.dot_bz = bz;
        self.dot_sz = sz;
        self.dot_xPx = xPx;
    }
}
