#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::Settings;
use enum_dispatch::*;

mod coneset;
mod genpowcone;
mod nonnegativecone;
mod psdtrianglecone;
mod socone;
mod zerocone;
// traits shared across symmetric / asymmetric cone families
mod jordan;
mod nonsymmetric;

pub use coneset::*;
pub use genpowcone::*;
pub use nonnegativecone::*;
pub use psdtrianglecone::*;
pub use socone::*;
pub use zerocone::*;

pub(crate) use jordan::*;
pub(crate) use nonsymmetric::*;

/// Marker distinguishing a cone from its dual when initializing or
/// shifting points
#[derive(Eq, PartialEq, Clone, Debug, Copy)]
pub enum PrimalOrDualCone {
    PrimalCone,
    DualCone,
}

/// User facing description of a cone in the problem specification.
///
/// The dimensions of the cones in a problem, taken in order, must sum
/// to the row count of the constraint matrix `A`.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportedCone<T = f64> {
    /// The zero cone `{0}ⁿ` (equality constraints)
    Zero(usize),
    /// The nonnegative orthant
    Nonnegative(usize),
    /// The second-order cone `{(t,x) : ‖x‖ ≤ t}`
    SecondOrder(usize),
    /// The positive semidefinite cone of n x n matrices, packed as the
    /// upper triangle in column order with off diagonal entries scaled
    /// by √2
    PSDTriangle(usize),
    /// The generalized power cone `{(u,w) : Π uᵢ^αᵢ ≥ ‖w‖, u ≥ 0}`,
    /// with exponents `α` (αᵢ > 0, Σαᵢ = 1) and `dim2 = len(w)`
    GenPower(Vec<T>, usize),
}

impl<T> SupportedCone<T> {
    /// Number of variables this cone contributes to the constraint rows.
    pub fn nvars(&self) -> usize {
        match self {
            SupportedCone::Zero(dim) => *dim,
            SupportedCone::Nonnegative(dim) => *dim,
            SupportedCone::SecondOrder(dim) => *dim,
            SupportedCone::PSDTriangle(dim) => crate::algebra::triangular_number(*dim),
            SupportedCone::GenPower(α, dim2) => α.len() + *dim2,
        }
    }
}

/// Operations provided by every cone implementation on vectors
/// restricted to its own block.
///
/// Symmetric cones carry a Nesterov-Todd scaling W with Ws = W⁻ᵀz = λ,
/// so that `Hs = WᵀW`.  Asymmetric cones use the dual scaling
/// `Hs = μH(z)` with H the Hessian of the dual barrier, in which case
/// the `Wᵀ(λ \ ds)` terms of the linearized centrality condition
/// short-circuit to `ds` itself.
#[enum_dispatch]
pub trait Cone<T>
where
    T: FloatT,
{
    // barrier degree and block size
    fn degree(&self) -> usize;
    fn numel(&self) -> usize;

    // NB: the zero cone reports true here
    fn is_symmetric(&self) -> bool;

    // can the Hs block enter the KKT matrix in sparsified
    // low rank form?
    fn is_sparse_expandable(&self) -> bool;

    // convert an elementwise equilibration into one that preserves
    // cone membership.  Returns true if δ was modified
    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool;

    // returns (α,β), where z - α⋅e is on the cone boundary (so that a
    // negative α means z is outside the cone), and β is the sum of the
    // positive margin terms over the cone's components
    fn margins(&mut self, z: &mut [T], pd: PrimalOrDualCone) -> (T, T);

    // z <- z + α⋅e for the cone's unit vector e
    fn scaled_unit_shift(&self, z: &mut [T], α: T, pd: PrimalOrDualCone);

    // set (s,z) to a canonical interior point
    fn unit_initialization(&self, z: &mut [T], s: &mut [T]);

    // scaling point computation
    fn set_identity_scaling(&mut self);
    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T) -> bool;

    // operations on Hs, the Hessian of the centrality condition
    fn Hs_is_diagonal(&self) -> bool;
    fn get_Hs(&self, Hsblock: &mut [T]);
    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]);

    // ---------------------------------------------------------
    // linearized centrality condition.
    //
    // symmetric cones (NT scaling):
    //     λ ∘ (WΔz + W⁻ᵀΔs) = -ds = -(affine_ds + combined_ds_shift)
    // with affine term λ ∘ λ and combined shift W⁻¹Δs_aff ∘ WΔz_aff − σμe.
    // Δs is recovered from Δz as Δs = -(Wᵀ(λ \ ds) + WᵀW Δz), and the
    // Δs_from_Δz_offset function computes the Wᵀ(λ \ ds) part.
    //
    // asymmetric cones (dual scaling):
    //     Δs + μH(z)Δz = -ds = -(affine_ds + combined_ds_shift)
    // with affine term s and combined shift σμ⋅grad f*(z).  The offset
    // is then ds itself.
    //
    // in the affine direction Wᵀ(λ \ (λ∘λ)) = s, so the two cases
    // coincide and the caller takes the offset directly as s.
    //
    // step_z and step_s hold the affine step on entry to
    // combined_ds_shift and may be overwritten as workspace.
    // ---------------------------------------------------------
    fn affine_ds(&self, ds: &mut [T], s: &[T]);
    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T);
    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]);

    // maximum feasible step in the given directions
    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &Settings<T>,
        αmax: T,
    ) -> (T, T);

    // barrier function at (z + αdz, s + αds)
    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T;
}

// internal cone container resolved from the user specification
#[enum_dispatch(Cone<T>)]
pub(crate) enum ConeImpl<T>
where
    T: FloatT,
{
    ZeroCone(ZeroCone<T>),
    NonnegativeCone(NonnegativeCone<T>),
    SecondOrderCone(SecondOrderCone<T>),
    PSDTriangleCone(PSDTriangleCone<T>),
    GenPowerCone(GenPowerCone<T>),
}

pub(crate) fn make_cone<T: FloatT>(spec: &SupportedCone<T>) -> ConeImpl<T> {
    match spec {
        SupportedCone::Zero(dim) => ZeroCone::new(*dim).into(),
        SupportedCone::Nonnegative(dim) => NonnegativeCone::new(*dim).into(),
        SupportedCone::SecondOrder(dim) => SecondOrderCone::new(*dim).into(),
        SupportedCone::PSDTriangle(dim) => PSDTriangleCone::new(*dim).into(),
        SupportedCone::GenPower(α, dim2) => GenPowerCone::new(α.clone(), *dim2).into(),
    }
}
