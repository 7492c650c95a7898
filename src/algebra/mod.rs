//! Linear algebra layer for the solver.
//!
//! Users ordinarily only touch this module to build problem data in
//! [`CscMatrix`](crate::algebra::CscMatrix) format.  Everything else is a
//! standalone implementation of the scalar, vector, sparse and dense
//! kernels the solver needs internally, generic over scalars implementing
//! [`FloatT`](crate::algebra::FloatT).

mod floats;
pub use floats::*;

mod vecmath;
pub use vecmath::*;

mod cscmatrix;
pub use cscmatrix::*;

mod dense;
pub use dense::*;
