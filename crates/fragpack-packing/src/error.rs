//! Packing error types.

use crate::status::PackingStatus;
use fragpack_core::{ModelError, SolverError};

/// Errors that abort a packing run.
///
/// Terminal solver verdicts (infeasible, unbounded, limits) are not errors;
/// they come back as [`PackingStatus`] on the outcome.
#[derive(Debug, Clone)]
pub enum PackingError {
    /// Malformed or out-of-range parameters
    InvalidInput { reason: String },
    /// The pre-check proved that no split can fit
    InfeasibleByConstruction { reason: String },
    /// Building the MILP failed
    Model(ModelError),
    /// The solver call itself failed
    Solver(SolverError),
    /// Extraction needed values the solver did not produce
    NoSolutionAvailable { status: PackingStatus },
    /// An outcome broke a packing invariant
    Violation { reason: String },
}

impl PackingError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            PackingError::InvalidInput { .. } => "PACKING_INVALID_INPUT",
            PackingError::InfeasibleByConstruction { .. } => "PACKING_INFEASIBLE_BY_CONSTRUCTION",
            PackingError::Model(_) => "PACKING_MODEL",
            PackingError::Solver(_) => "PACKING_SOLVER_FAILURE",
            PackingError::NoSolutionAvailable { .. } => "PACKING_NO_SOLUTION",
            PackingError::Violation { .. } => "PACKING_VIOLATION",
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        PackingError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn violation(reason: impl Into<String>) -> Self {
        PackingError::Violation {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for PackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackingError::InvalidInput { reason } => {
                write!(f, "[{}] Invalid input: {}", self.code(), reason)
            }
            PackingError::InfeasibleByConstruction { reason } => {
                write!(f, "[{}] Infeasible by construction: {}", self.code(), reason)
            }
            PackingError::Model(err) => write!(f, "[{}] Model build failed: {}", self.code(), err),
            PackingError::Solver(err) => write!(f, "[{}] Solver call failed: {}", self.code(), err),
            PackingError::NoSolutionAvailable { status } => write!(
                f,
                "[{}] No solution values available (status: {})",
                self.code(),
                status
            ),
            PackingError::Violation { reason } => {
                write!(f, "[{}] Packing invariant violated: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for PackingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackingError::Model(err) => Some(err),
            PackingError::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for PackingError {
    fn from(err: ModelError) -> Self {
        PackingError::Model(err)
    }
}

impl From<SolverError> for PackingError {
    fn from(err: SolverError) -> Self {
        PackingError::Solver(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_prefix_display() {
        let err = PackingError::invalid_input("bin_count must be positive");
        assert_eq!(err.code(), "PACKING_INVALID_INPUT");
        assert_eq!(
            err.to_string(),
            "[PACKING_INVALID_INPUT] Invalid input: bin_count must be positive"
        );

        let err = PackingError::NoSolutionAvailable {
            status: PackingStatus::NotSolved,
        };
        assert!(err.to_string().starts_with("[PACKING_NO_SOLUTION]"));
        assert!(err.to_string().contains("Not Solved"));
    }

    #[test]
    fn test_wrapped_errors_keep_source() {
        use std::error::Error;

        let err = PackingError::from(SolverError::SolverSpecific("boom".to_string()));
        assert_eq!(err.code(), "PACKING_SOLVER_FAILURE");
        assert!(err.source().is_some());

        let err = PackingError::from(ModelError::NoObjective);
        assert_eq!(err.code(), "PACKING_MODEL");
        assert!(err.to_string().contains("OBJECTIVE_MISSING"));
    }
}
