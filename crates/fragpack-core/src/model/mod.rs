//! Model module for building optimization models.
//!
//! This module provides the core [`Model`] type for building linear and
//! mixed-integer programming models.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Methods for adding variables, constraints, and objectives
//! - [`storage`]: Column-first sparse storage access
//! - [`metadata`]: Variable and constraint naming

mod builder;
mod error;
mod metadata;
mod storage;

use crate::types::{Constraint, Objective, Variable};
use fragpack_expr::ids::{ConstraintId, VariableId};
use std::collections::BTreeMap;
use std::time::Instant;

pub use error::ModelError;

/// A model builder for linear and mixed-integer programs.
///
/// Variables and constraints get dense ids in insertion order, so a
/// variable's id is also its column position at the solver boundary.
/// Coefficients are kept column-first (CSC).
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Objective,
    pub(crate) objective_name: Option<String>,
    // Column-first sparse storage: variable_id -> vec of (constraint_id, coefficient)
    pub(crate) columns: BTreeMap<VariableId, Vec<(ConstraintId, f64)>>,
    pub(crate) variable_names: Option<BTreeMap<VariableId, String>>,
    pub(crate) constraint_names: Option<BTreeMap<ConstraintId, String>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the objective
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub(crate) fn ensure_variable_exists(&self, id: VariableId) -> Result<(), ModelError> {
        if id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    pub(crate) fn ensure_constraint_exists(&self, id: ConstraintId) -> Result<(), ModelError> {
        if id.index() < self.constraints.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidConstraintId(id))
        }
    }

    pub(crate) fn normalize_terms(&self, terms: Vec<(VariableId, f64)>) -> Vec<(VariableId, f64)> {
        let started = Instant::now();
        let terms_in = terms.len();

        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var_id, coeff) in terms {
            *merged.entry(var_id).or_insert(0.0) += coeff;
        }

        let normalized: Vec<(VariableId, f64)> = merged
            .into_iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .collect();

        tracing::trace!(
            component = "model",
            operation = "lower_expr",
            status = "success",
            expr_terms_in = terms_in,
            expr_terms_out = normalized.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Lowered linear expression"
        );

        normalized
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{Bounds, Sense};
    use fragpack_expr::{ComparisonSense, ConstraintExpr, Expr};

    mod naming_rows;
    mod support;

    use support::{bounded_constraint, continuous_variable};

    #[test]
    fn test_new_model_is_empty() {
        let model = Model::new();
        assert_eq!(model.num_variables(), 0);
        assert_eq!(model.num_constraints(), 0);
        assert!(model.objective().sense.is_none());
    }

    #[test]
    fn test_add_variable() {
        let mut model = Model::new();
        let var = continuous_variable(0.0, 10.0);

        let id = model.add_variable(var).unwrap();
        assert_eq!(id, VariableId::new(0));
        assert_eq!(model.num_variables(), 1);
        assert_eq!(model.get_variable(id).unwrap(), &var);
    }

    #[test]
    fn test_variable_ids_are_dense() {
        let mut model = Model::new();
        let a = model.add_variable(Variable::binary()).unwrap();
        let b = model.add_variable(Variable::binary()).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_add_constraint() {
        let mut model = Model::new();
        let constraint = bounded_constraint(0.0, 100.0);

        let id = model.add_constraint(constraint).unwrap();
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.get_constraint(id).unwrap(), &constraint);
    }

    #[test]
    fn test_minimize_sets_sense_and_terms() {
        let mut model = Model::new();
        let a = model.add_variable(Variable::binary()).unwrap();
        let b = model.add_variable(Variable::binary()).unwrap();

        model.minimize(Expr::sum([a, b, a])).unwrap();
        assert_eq!(model.objective().sense, Some(Sense::Minimize));
        assert_eq!(model.objective().terms, vec![(a, 2.0), (b, 1.0)]);
    }

    #[test]
    fn test_set_objective_rejects_missing_sense() {
        let mut model = Model::new();
        let result = model.set_objective(Objective::new());
        assert_eq!(result, Err(ModelError::NoObjective));
    }

    #[test]
    fn test_set_objective_rejects_unknown_variable() {
        let mut model = Model::new();
        let result = model.set_objective(Objective {
            sense: Some(Sense::Minimize),
            terms: vec![(VariableId::new(3), 1.0)],
        });
        assert_eq!(
            result,
            Err(ModelError::InvalidVariableId(VariableId::new(3)))
        );
    }

    #[test]
    fn test_multiple_objectives_rejected() {
        let mut model = Model::new();
        let var_id = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();

        model.minimize(Expr::var(var_id)).unwrap();

        let result = model.maximize(Expr::var(var_id));
        assert_eq!(result, Err(ModelError::MultipleObjectives));
    }

    #[test]
    fn test_set_objective_replaces_and_clears_name() {
        let mut model = Model::new();
        let var_id = model.add_variable(continuous_variable(0.0, 1.0)).unwrap();
        model.minimize(Expr::var(var_id)).unwrap();
        model.set_objective_name(Some("fragments".to_string()));
        assert_eq!(model.get_objective_name(), Some("fragments"));

        model
            .set_objective(Objective {
                sense: Some(Sense::Maximize),
                terms: vec![(var_id, 2.0)],
            })
            .unwrap();
        assert!(model.get_objective_name().is_none());
        assert_eq!(model.objective().sense, Some(Sense::Maximize));
    }

    #[test]
    fn test_set_coefficient_with_invalid_variable_fails() {
        let mut model = Model::new();
        let invalid_var_id = VariableId::new(999);
        let constraint_id = model.add_constraint(bounded_constraint(0.0, 100.0)).unwrap();

        let result = model.set_coefficient(invalid_var_id, constraint_id, 2.5);
        assert_eq!(result, Err(ModelError::InvalidVariableId(invalid_var_id)));
    }

    #[test]
    fn test_set_coefficient_with_invalid_constraint_fails() {
        let mut model = Model::new();
        let var_id = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
        let invalid_constraint_id = ConstraintId::new(999);

        let result = model.set_coefficient(var_id, invalid_constraint_id, 2.5);
        assert_eq!(
            result,
            Err(ModelError::InvalidConstraintId(invalid_constraint_id))
        );
    }

    #[test]
    fn test_set_coefficient_rejects_non_finite() {
        let mut model = Model::new();
        let var_id = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
        let con = model.add_constraint(bounded_constraint(0.0, 1.0)).unwrap();

        let result = model.set_coefficient(var_id, con, f64::NAN);
        assert!(matches!(
            result,
            Err(ModelError::InvalidCoefficient { .. })
        ));
    }

    #[test]
    fn test_coefficients_persist_in_columns() {
        let mut model = Model::new();
        let v1 = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
        let v2 = model.add_variable(Variable::binary()).unwrap();

        let c1 = model.add_constraint(bounded_constraint(0.0, 15.0)).unwrap();
        let c2 = model.add_constraint(bounded_constraint(-10.0, 10.0)).unwrap();

        model.set_coefficient(v1, c1, 1.5).unwrap();
        model.set_coefficient(v1, c2, -2.0).unwrap();
        model.set_coefficient(v2, c2, 3.5).unwrap();
        // Overwrites the earlier entry instead of appending.
        model.set_coefficient(v1, c1, 4.0).unwrap();

        assert_eq!(model.get_column(v1).unwrap(), &vec![(c1, 4.0), (c2, -2.0)]);
        assert_eq!(model.get_column(v2).unwrap(), &vec![(c2, 3.5)]);
        assert_eq!(model.num_coefficients(), 3);
    }

    #[test]
    fn test_binary_variable_constructor() {
        let var = Variable::binary();
        assert_eq!(var.bounds.lower, 0.0);
        assert_eq!(var.bounds.upper, 1.0);
        assert!(var.is_integer);
    }

    #[test]
    fn test_continuous_variable_constructor() {
        let var = Variable::continuous(Bounds::at_least(0.0));
        assert_eq!(var.bounds.lower, 0.0);
        assert!(var.bounds.upper.is_infinite());
        assert!(!var.is_integer);
    }

    #[test]
    fn test_add_constraint_expr() {
        let mut model = Model::new();
        let var = model.add_variable(continuous_variable(0.0, 1.0)).unwrap();
        let constraint = ConstraintExpr::new(Expr::var(var), ComparisonSense::GreaterEqual, 2.0);

        let con = model.add_constraint_expr(constraint).unwrap();
        let stored = model.get_constraint(con).unwrap();
        assert_eq!(stored.bounds.lower, 2.0);
        assert!(stored.bounds.upper.is_infinite());
        assert_eq!(model.get_column(var).unwrap(), &vec![(con, 1.0)]);
    }

    #[test]
    fn test_add_constraint_expr_drops_cancelled_terms() {
        let mut model = Model::new();
        let x = model.add_variable(continuous_variable(0.0, 1.0)).unwrap();
        let y = model.add_variable(continuous_variable(0.0, 1.0)).unwrap();
        let expr = Expr::var(x) + Expr::var(y) - Expr::var(y);

        let con = model.add_constraint_expr(expr.le_scalar(1.0)).unwrap();
        assert_eq!(model.get_column(x).unwrap(), &vec![(con, 1.0)]);
        assert!(model.get_column(y).is_none());
    }

    #[test]
    fn test_expr_constant_moves_into_bounds() {
        let mut model = Model::new();
        let x = model.add_variable(continuous_variable(0.0, 5.0)).unwrap();
        let expr = Expr::new(vec![(x, 1.0)], 2.0);

        let con = model
            .add_expr_constraint(expr, Bounds::new(f64::NEG_INFINITY, 6.0))
            .unwrap();
        assert_eq!(model.get_constraint(con).unwrap().bounds.upper, 4.0);
    }

    #[test]
    fn test_variable_bounds_validation() {
        let mut model = Model::new();
        let result = model.add_variable(continuous_variable(5.0, 1.0));
        assert!(matches!(
            result,
            Err(ModelError::InvalidVariableBounds { .. })
        ));
        assert_eq!(model.num_variables(), 0);
    }

    #[test]
    fn test_constraint_bounds_validation() {
        let mut model = Model::new();
        let result = model.add_constraint(bounded_constraint(10.0, 0.0));
        assert!(matches!(
            result,
            Err(ModelError::InvalidConstraintBounds { .. })
        ));
    }
}
