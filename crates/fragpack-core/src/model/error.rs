//! Model error types.

use fragpack_expr::ids::{ConstraintId, VariableId};

/// Errors that can occur during model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid variable ID
    InvalidVariableId(VariableId),
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Invalid constraint ID
    InvalidConstraintId(ConstraintId),
    /// Invalid constraint bounds
    InvalidConstraintBounds { lower: f64, upper: f64 },
    /// Coefficient is NaN or infinite
    InvalidCoefficient { coefficient: f64 },
    /// No objective set
    NoObjective,
    /// Objective already set
    MultipleObjectives,
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidConstraintId(_) => "CONSTRAINT_INVALID_ID",
            ModelError::InvalidConstraintBounds { .. } => "CONSTRAINT_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
            ModelError::NoObjective => "OBJECTIVE_MISSING",
            ModelError::MultipleObjectives => "OBJECTIVE_ALREADY_SET",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidVariableId(id) => {
                write!(f, "[{}] Variable ID {} does not exist", self.code(), id)
            }
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidConstraintId(id) => {
                write!(f, "[{}] Constraint ID {} does not exist", self.code(), id)
            }
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "[{}] Constraint bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite (got {})",
                self.code(),
                coefficient
            ),
            ModelError::NoObjective => {
                write!(f, "[{}] Model has no objective defined", self.code())
            }
            ModelError::MultipleObjectives => write!(
                f,
                "[{}] Model already has an objective; use set_objective to replace",
                self.code()
            ),
        }
    }
}

impl std::error::Error for ModelError {}
