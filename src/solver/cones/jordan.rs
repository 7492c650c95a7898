use super::*;
use crate::algebra::{FloatT, MatrixShape, VectorMath};

// --------------------------------------
// Jordan algebra and scaling operations carried only by the
// symmetric cone types
// --------------------------------------

pub(crate) trait JordanAlgebra<T: FloatT> {
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]);
    fn inv_circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]);
}

pub(crate) trait SymmetricCone<T: FloatT>: JordanAlgebra<T> {
    // products with the scaling point W
    fn mul_W(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T);
    fn mul_Winv(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T);

    // x = λ \ z.  Handled as a special case since q \ z for general q
    // is hard for the PSD cone and never needed
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]);
}

// --------------------------------------
// blanket helpers shared by all symmetric cones
// --------------------------------------

pub(crate) trait SymmetricConeUtils<T: FloatT> {
    fn _combined_ds_shift_symmetric(
        &mut self,
        shift: &mut [T],
        step_z: &mut [T],
        step_s: &mut [T],
        σμ: T,
    );
    fn _Δs_from_Δz_offset_symmetric(&mut self, out: &mut [T], ds: &[T], work: &mut [T]);
}

impl<T, C> SymmetricConeUtils<T> for C
where
    T: FloatT,
    C: SymmetricCone<T> + Cone<T>,
{
    // assemble the shift term W⁻¹Δs ∘ WΔz − σμe of the combined step.
    // step_z and step_s hold the affine directions on entry and are
    // consumed as workspace, since gemv_W style products cannot alias
    fn _combined_ds_shift_symmetric(
        &mut self,
        shift: &mut [T],
        step_z: &mut [T],
        step_s: &mut [T],
        σμ: T,
    ) {
        //shift vector serves as workspace for a few steps
        let tmp = shift;

        //Δz <- WΔz
        tmp.copy_from(step_z);
        self.mul_W(MatrixShape::N, step_z, tmp, T::one(), T::zero());

        //Δs <- W⁻ᵀΔs
        tmp.copy_from(step_s);
        self.mul_Winv(MatrixShape::T, step_s, tmp, T::one(), T::zero());

        //shift = W⁻¹Δs ∘ WΔz − σμe
        let shift = tmp;
        self.circ_op(shift, step_s, step_z);

        //symmetric cones are self dual, so primal/dual is immaterial
        self.scaled_unit_shift(shift, -σμ, PrimalOrDualCone::PrimalCone);
    }

    // the constant part of Δs when written as a function of Δz in the
    // solution of a KKT system
    fn _Δs_from_Δz_offset_symmetric(&mut self, out: &mut [T], ds: &[T], work: &mut [T]) {
        //work = λ \ ds
        self.λ_inv_circ_op(work, ds);

        //out = Wᵀ(λ \ ds)
        self.mul_W(MatrixShape::T, out, work, T::one(), T::zero());
    }
}
