//! HiGHS backend for fragpack models.
//!
//! [`HighsSolver`] implements [`fragpack_core::Solver`], translating a
//! `fragpack_core::Model` into a HiGHS row problem and reading back the
//! terminal status and primal values.

pub mod ffi;
pub mod solver;
mod status;

pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense, highs_version};
pub use solver::HighsSolver;
