//! Solver trait and common types for solver backends.
//!
//! This module defines the abstract interface that solver backends
//! (HiGHS, or a scripted solver in tests) implement, along with
//! solver-agnostic configuration, solution and error types.

use crate::Model;
use std::collections::BTreeMap;

/// Status of a solver solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver reached time limit (may have feasible solution).
    TimeLimit,
    /// Solver reached iteration limit (may have feasible solution).
    IterationLimit,
    /// Status is unknown or solver did not complete.
    Unknown,
}

impl SolverStatus {
    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::IterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for solver operations.
///
/// Terminal statuses such as infeasible or unbounded are not errors; they are
/// reported through [`Solution::status`]. These variants cover the cases where
/// the solve call itself could not run.
#[derive(Debug, Clone)]
pub enum SolverError {
    /// Model has no variables.
    EmptyModel,
    /// No objective function set.
    NoObjective,
    /// Invalid variable ID.
    InvalidVariableId(u32),
    /// Solver-specific error not covered by other variants.
    SolverSpecific(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyModel => "SOLVER_EMPTY_MODEL",
            SolverError::NoObjective => "SOLVER_NO_OBJECTIVE",
            SolverError::InvalidVariableId(_) => "SOLVER_INVALID_VARIABLE_ID",
            SolverError::SolverSpecific(_) => "SOLVER_SPECIFIC",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::NoObjective => write!(f, "[{}] Model has no objective", self.code()),
            SolverError::InvalidVariableId(id) => {
                write!(f, "[{}] Variable ID {} does not exist", self.code(), id)
            }
            SolverError::SolverSpecific(msg) => {
                write!(f, "[{}] Solver error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Configuration options for solver behavior.
///
/// `None` leaves the backend default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Time limit in seconds.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance.
    pub mip_gap: Option<f64>,
    /// Number of threads to use.
    pub threads: Option<u32>,
    /// Random seed, for reproducible runs.
    pub random_seed: Option<u32>,
    /// Enable/disable presolve.
    pub presolve: Option<bool>,
    /// Primal/dual feasibility tolerance.
    pub tolerance: Option<f64>,
    /// Log solver output to console.
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the random seed.
    pub fn with_random_seed(mut self, seed: u32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Settings for reproducible runs: one thread and a fixed seed.
    pub fn deterministic(self, seed: u32) -> Self {
        self.with_threads(1).with_random_seed(seed)
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Solver-agnostic solution from an optimization solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Primal values of variables indexed by column position.
    ///
    /// Empty when the solver produced no solution.
    pub primal_values: Vec<f64>,
    /// Objective value, if the solver produced one.
    pub objective_value: Option<f64>,
    /// Status of the solution.
    pub status: SolverStatus,
    /// Solve time in seconds.
    pub solve_time_seconds: f64,
    /// Solver-specific metadata (e.g., iteration counts, gaps).
    pub metadata: BTreeMap<String, f64>,
}

impl Solution {
    /// A solution carrying only a terminal status and no values.
    pub fn without_values(status: SolverStatus, solve_time_seconds: f64) -> Self {
        Self {
            primal_values: Vec::new(),
            objective_value: None,
            status,
            solve_time_seconds,
            metadata: BTreeMap::new(),
        }
    }

    /// Get the primal value at the given index.
    pub fn get_primal(&self, index: usize) -> Option<f64> {
        self.primal_values.get(index).copied()
    }

    /// Check whether any primal values are available.
    pub fn has_values(&self) -> bool {
        !self.primal_values.is_empty()
    }
}

/// Trait that all solver backends must implement.
pub trait Solver {
    /// Solve the given model and return a solver-agnostic solution.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` only when the solve call itself fails.
    /// Infeasible, unbounded or limit-reached runs return `Ok` with the
    /// corresponding status.
    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

impl<S: Solver + ?Sized> Solver for &mut S {
    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
        (**self).solve(model, config)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn solver_status_is_optimal() {
        assert!(SolverStatus::Optimal.is_optimal());
        assert!(!SolverStatus::Infeasible.is_optimal());
        assert!(!SolverStatus::Unbounded.is_optimal());
        assert!(!SolverStatus::TimeLimit.is_optimal());
        assert!(!SolverStatus::IterationLimit.is_optimal());
        assert!(!SolverStatus::Unknown.is_optimal());
    }

    #[test]
    fn solver_status_as_str() {
        assert_eq!(SolverStatus::Optimal.as_str(), "optimal");
        assert_eq!(SolverStatus::Infeasible.as_str(), "infeasible");
        assert_eq!(SolverStatus::Unbounded.as_str(), "unbounded");
        assert_eq!(SolverStatus::TimeLimit.as_str(), "time_limit");
        assert_eq!(SolverStatus::IterationLimit.as_str(), "iteration_limit");
        assert_eq!(SolverStatus::Unknown.as_str(), "unknown");
        assert_eq!(format!("{}", SolverStatus::Infeasible), "infeasible");
    }

    #[test]
    fn solver_error_display() {
        assert_eq!(SolverError::EmptyModel.code(), "SOLVER_EMPTY_MODEL");
        assert!(SolverError::EmptyModel.to_string().contains("no variables"));
        assert!(
            SolverError::NoObjective
                .to_string()
                .contains("no objective")
        );
        assert!(
            SolverError::InvalidVariableId(42)
                .to_string()
                .contains("42")
        );
        assert!(
            SolverError::SolverSpecific("oops".to_string())
                .to_string()
                .starts_with("[SOLVER_SPECIFIC]")
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = SolverConfig::new()
            .with_time_limit(60.0)
            .with_mip_gap(0.01)
            .with_presolve(true)
            .with_tolerance(1e-7)
            .with_log_to_console(false)
            .deterministic(42);

        assert!(!config.is_empty());
        assert_eq!(config.time_limit, Some(60.0));
        assert_eq!(config.mip_gap, Some(0.01));
        assert_eq!(config.threads, Some(1));
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(config.presolve, Some(true));
        assert_eq!(config.tolerance, Some(1e-7));
        assert_eq!(config.log_to_console, Some(false));
    }

    #[test]
    fn config_new_is_empty() {
        assert!(SolverConfig::new().is_empty());
        assert!(!SolverConfig::new().with_threads(2).is_empty());
    }

    #[test]
    fn solution_without_values() {
        let solution = Solution::without_values(SolverStatus::Infeasible, 0.25);
        assert!(!solution.has_values());
        assert_eq!(solution.get_primal(0), None);
        assert_eq!(solution.objective_value, None);
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn solution_accessors() {
        let solution = Solution {
            primal_values: vec![1.0, 2.0, 3.0],
            objective_value: Some(10.0),
            status: SolverStatus::Optimal,
            solve_time_seconds: 0.1,
            metadata: BTreeMap::new(),
        };

        assert_eq!(solution.get_primal(0), Some(1.0));
        assert_eq!(solution.get_primal(3), None);
        assert!(solution.has_values());
    }
}
