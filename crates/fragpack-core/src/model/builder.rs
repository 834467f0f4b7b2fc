//! Model builder methods for adding variables, constraints, and objectives.

use crate::types::{Bounds, Constraint, Objective, Sense, Variable};
use fragpack_expr::expr::{ConstraintExpr, Expr};
use fragpack_expr::ids::{ConstraintId, VariableId};

use crate::model::Model;
use crate::model::error::ModelError;

impl Model {
    /// Add a variable to the model.
    pub fn add_variable(&mut self, variable: Variable) -> Result<VariableId, ModelError> {
        if !variable.bounds.is_valid() {
            return Err(ModelError::InvalidVariableBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }

        let id = VariableId::new(self.variables.len() as u32);
        self.variables.push(variable);

        Ok(id)
    }

    /// Add a named variable to the model.
    pub fn add_named_variable(
        &mut self,
        variable: Variable,
        name: impl Into<String>,
    ) -> Result<VariableId, ModelError> {
        let id = self.add_variable(variable)?;
        self.set_variable_name(id, name.into())?;
        Ok(id)
    }

    /// Add a constraint to the model.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, ModelError> {
        if !constraint.bounds.is_valid() {
            return Err(ModelError::InvalidConstraintBounds {
                lower: constraint.bounds.lower,
                upper: constraint.bounds.upper,
            });
        }

        let id = ConstraintId::new(self.constraints.len() as u32);
        self.constraints.push(constraint);

        Ok(id)
    }

    /// Set the objective function, replacing any existing one.
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), ModelError> {
        let sense = objective.sense.ok_or(ModelError::NoObjective)?;
        for (var_id, coeff) in &objective.terms {
            self.ensure_variable_exists(*var_id)?;
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    coefficient: *coeff,
                });
            }
        }

        let normalized = self.normalize_terms(objective.terms);
        self.objective = Objective {
            sense: Some(sense),
            terms: normalized,
        };
        self.objective_name = None;
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = self.objective.terms.len(),
            "Set objective function"
        );
        Ok(())
    }

    /// Minimize a linear expression.
    ///
    /// Returns an error if the model already has an objective.
    pub fn minimize(&mut self, expr: Expr) -> Result<(), ModelError> {
        if self.objective.sense.is_some() {
            return Err(ModelError::MultipleObjectives);
        }
        self.set_objective(Objective {
            sense: Some(Sense::Minimize),
            terms: expr.into_linear_terms(),
        })
    }

    /// Maximize a linear expression.
    ///
    /// Returns an error if the model already has an objective.
    pub fn maximize(&mut self, expr: Expr) -> Result<(), ModelError> {
        if self.objective.sense.is_some() {
            return Err(ModelError::MultipleObjectives);
        }
        self.set_objective(Objective {
            sense: Some(Sense::Maximize),
            terms: expr.into_linear_terms(),
        })
    }

    /// Add a constraint from an expression and explicit bounds.
    ///
    /// A constant in the expression is moved into the bounds.
    pub fn add_expr_constraint(
        &mut self,
        expr: Expr,
        bounds: Bounds,
    ) -> Result<ConstraintId, ModelError> {
        let (linear, constant) = expr.into_parts();
        let bounds = Bounds::new(bounds.lower - constant, bounds.upper - constant);
        let terms = self.normalize_terms(linear);
        for (var_id, coeff) in &terms {
            self.ensure_variable_exists(*var_id)?;
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    coefficient: *coeff,
                });
            }
        }
        let constraint_id = self.add_constraint(Constraint { bounds })?;
        for (var_id, coeff) in terms {
            self.set_coefficient(var_id, constraint_id, coeff)?;
        }
        Ok(constraint_id)
    }

    /// Add a constraint from a comparison expression (e.g., `x + y <= 10`).
    pub fn add_constraint_expr(
        &mut self,
        constraint: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (expr, sense, rhs) = constraint.into_parts();
        let (lower, upper) = sense.bounds(rhs);
        self.add_expr_constraint(expr, Bounds::new(lower, upper))
    }

    /// Add a named constraint from a comparison expression.
    pub fn add_named_constraint_expr(
        &mut self,
        constraint: ConstraintExpr,
        name: impl Into<String>,
    ) -> Result<ConstraintId, ModelError> {
        let id = self.add_constraint_expr(constraint)?;
        self.set_constraint_name(id, name.into())?;
        Ok(id)
    }

    /// Set a coefficient in the constraint matrix.
    ///
    /// An existing entry for the same (variable, constraint) pair is replaced.
    pub fn set_coefficient(
        &mut self,
        var_id: VariableId,
        constraint_id: ConstraintId,
        coefficient: f64,
    ) -> Result<(), ModelError> {
        if !coefficient.is_finite() {
            return Err(ModelError::InvalidCoefficient { coefficient });
        }
        self.ensure_variable_exists(var_id)?;
        self.ensure_constraint_exists(constraint_id)?;

        let column = self.columns.entry(var_id).or_default();
        match column.iter_mut().find(|(id, _)| *id == constraint_id) {
            Some(entry) => entry.1 = coefficient,
            None => column.push((constraint_id, coefficient)),
        }

        Ok(())
    }
}
