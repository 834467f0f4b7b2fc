//! Minimum-fragmentation bin packing.
//!
//! Items may be split across bins. The packer builds a MILP with one
//! continuous fragment amount and one binary indicator per (item, bin) pair,
//! hands it to any [`fragpack_core::Solver`], and turns the solved values
//! into an [`Assignment`]. Reporting lives in [`report`] and never feeds back
//! into the computation.
//!
//! # Module Organization
//!
//! - [`instance`]: items, bins, parameters, validation and pre-check
//! - [`model`]: the fragment MILP and its variable lookup tables
//! - [`packer`]: the solve pipeline over a generic solver
//! - [`extract`]: solved values to assignment
//! - [`verify`]: invariant checks on an outcome
//! - [`report`]: CSV rows and the console summary

mod error;
pub mod extract;
pub mod instance;
pub mod model;
pub mod options;
pub mod packer;
pub mod report;
mod status;
pub mod verify;

pub use error::PackingError;
pub use extract::{Assignment, BinAssignment, Fragment};
pub use instance::{Item, MAX_BIN_COUNT, PackingInstance, PackingParams};
pub use model::FragmentModel;
pub use options::{DEFAULT_TOLERANCE, FragmentBound, PackingOptions};
pub use packer::{FragmentPacker, SolveOutcome};
pub use report::{PackedRow, Summary};
pub use status::PackingStatus;
pub use verify::verify;
