//! Conic interior point solver.
//!
//! Solves problems of the form
//! ```text
//! minimize    (1/2) x'Px + q'x
//! subject to  Ax + s = b,  s ∈ K
//! ```
//! with `K` a Cartesian product of [`SupportedCone`](crate::solver::SupportedCone)s,
//! through a homogeneous self-dual embedding.  Infeasible problems are
//! detected and reported with certificates rather than treated as
//! errors.

pub mod cones;
pub(crate) mod kkt;

mod infbounds;
mod info;
mod kktsystem;
mod problemdata;
mod residuals;
mod settings;
mod solution;
mod solver;
mod variables;

pub use cones::SupportedCone;
pub use infbounds::*;
pub use info::*;
pub use kktsystem::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use variables::*;
