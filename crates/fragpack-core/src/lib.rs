//! Fragpack core model builder and solver boundary.

pub mod model;
pub mod solver;
pub mod types;

pub use model::{Model, ModelError};
pub use solver::{Solution, Solver, SolverConfig, SolverError, SolverStatus};
pub use types::{Bounds, Constraint, Objective, Sense, Variable};
