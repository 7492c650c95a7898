#![allow(non_snake_case)]

use super::DirectLDLSolver;
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::Settings;

pub(crate) struct QDLDLDirectLDLSolver<T> {
    //KKT matrix and its LDLᵀ factorisation
    factors: QDLDLFactors<T>,
}

impl<T> QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    pub fn new(KKT: &CscMatrix<T>, Dsigns: &[i8], settings: &Settings<T>) -> Self {
        assert!(KKT.is_square(), "KKT matrix is not square");

        //The default AMD parameters can produce a poor ordering on
        //some larger KKT systems, since the sparse SOC expansion
        //inflates the apparent problem size and shifts the dense row
        //threshold.  A slightly more generous AMD_DENSE is used here.

        //logical factorisation first, so that memory is allocated
        //once and numeric factorisations reuse it
        let opts = QDLDLSettingsBuilder::default()
            .logical(true)
            .Dsigns(Dsigns.to_vec())
            .regularize_enable(settings.dynamic_regularization_enable)
            .regularize_eps(settings.dynamic_regularization_eps)
            .regularize_delta(settings.dynamic_regularization_delta)
            .amd_dense_scale(1.5)
            .build()
            .unwrap();

        let factors = QDLDLFactors::<T>::new(KKT, Some(opts)).unwrap();

        Self { factors }
    }
}

impl<T> DirectLDLSolver<T> for QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    fn update_values(&mut self, index: &[usize], values: &[T]) {
        //values are applied to the reordered copy held internally
        self.factors.update_values(index, values);
    }

    fn scale_values(&mut self, index: &[usize], scale: T) {
        self.factors.scale_values(index, scale);
    }

    fn offset_values(&mut self, index: &[usize], offset: T, signs: &[i8]) {
        self.factors.offset_values(index, offset, signs);
    }

    fn solve(&mut self, x: &mut [T], b: &[T]) {
        //QDLDL solves in place
        x.copy_from(b);
        self.factors.solve(x);
    }

    fn refactor(&mut self, _kkt: &CscMatrix<T>) -> bool {
        //the permuted KKT copy was maintained through the
        //update/scale/offset methods, so the caller's matrix
        //is not needed here
        self.factors.refactor().is_ok() && self.factors.Dinv.is_finite()
    }

    fn required_matrix_shape() -> MatrixTriangle {
        MatrixTriangle::Triu
    }
}
