#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::Settings;

mod assembly;
mod datamap;
mod directldl;
mod qdldlsolver;

pub(crate) use assembly::*;
pub(crate) use datamap::*;
pub(crate) use directldl::*;
pub(crate) use qdldlsolver::*;

// We require Send so that solver objects can be moved across threads
pub(crate) type BoxedDirectLDLSolver<T> = Box<dyn DirectLDLSolver<T> + Send>;

/// Interface to pluggable LDLᵀ factorisation backends.
///
/// A backend may keep its own (e.g. permuted) copy of the KKT matrix,
/// so value updates are forwarded to it as well as applied to the
/// solver's unpermuted copy.
pub(crate) trait DirectLDLSolver<T: FloatT> {
    fn update_values(&mut self, index: &[usize], values: &[T]);
    fn scale_values(&mut self, index: &[usize], scale: T);
    fn offset_values(&mut self, index: &[usize], offset: T, signs: &[i8]);
    fn solve(&mut self, x: &mut [T], b: &[T]);

    //true on success.  A backend reports failure if the factors
    //came out non-finite or structurally singular
    fn refactor(&mut self, kkt: &CscMatrix<T>) -> bool;

    //the triangle of K this backend factorises
    fn required_matrix_shape() -> MatrixTriangle
    where
        Self: Sized;
}

pub(crate) type LDLConstructor<T> =
    fn(&CscMatrix<T>, &[i8], &Settings<T>) -> BoxedDirectLDLSolver<T>;

// resolve the backend constructor and its preferred triangle from the
// settings tag.  New backends register here
pub(crate) fn get_ldlsolver_config<T: FloatT>(
    settings: &Settings<T>,
) -> (MatrixTriangle, LDLConstructor<T>) {
    let ldlptr: LDLConstructor<T>;
    let kktshape: MatrixTriangle;

    match settings.direct_solve_method.as_str() {
        "qdldl" => {
            kktshape = QDLDLDirectLDLSolver::<T>::required_matrix_shape();
            ldlptr = |M, D, S| Box::new(QDLDLDirectLDLSolver::<T>::new(M, D, S));
        }
        _ => {
            panic!("Unrecognized LDL solver type");
        }
    }
    (kktshape, ldlptr)
}
