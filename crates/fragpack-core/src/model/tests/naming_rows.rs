use super::support::{bounded_constraint, continuous_variable};
use crate::model::{Model, ModelError};
use crate::types::Variable;
use fragpack_expr::{ConstraintId, Expr, VariableId};

#[test]
fn test_named_variable_lookup() {
    let mut model = Model::new();
    let x = model
        .add_named_variable(continuous_variable(0.0, 12.0), "x[A,0]")
        .unwrap();
    let y = model.add_named_variable(Variable::binary(), "y[A,0]").unwrap();

    assert_eq!(model.get_variable_name(x), Some("x[A,0]"));
    assert_eq!(model.get_variable_by_name("y[A,0]"), Some(y));
    assert_eq!(model.get_variable_by_name("missing"), None);
}

#[test]
fn test_set_variable_name_rejects_unknown_id() {
    let mut model = Model::new();
    let result = model.set_variable_name(VariableId::new(4), "ghost".to_string());
    assert_eq!(result, Err(ModelError::InvalidVariableId(VariableId::new(4))));
}

#[test]
fn test_named_constraint_lookup() {
    let mut model = Model::new();
    let x = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
    let con = model
        .add_named_constraint_expr(Expr::var(x).le_scalar(10.0), "capacity[0]")
        .unwrap();

    assert_eq!(model.get_constraint_name(con), Some("capacity[0]"));
    assert_eq!(model.get_constraint_by_name("capacity[0]"), Some(con));
}

#[test]
fn test_set_constraint_name_rejects_unknown_id() {
    let mut model = Model::new();
    let result = model.set_constraint_name(ConstraintId::new(0), "ghost".to_string());
    assert_eq!(
        result,
        Err(ModelError::InvalidConstraintId(ConstraintId::new(0)))
    );
}

#[test]
fn test_rows_transpose_columns() {
    let mut model = Model::new();
    let x = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
    let y = model.add_variable(continuous_variable(0.0, 10.0)).unwrap();
    model.add_constraint(bounded_constraint(0.0, 5.0)).unwrap();
    let c1 = model
        .add_constraint_expr((Expr::var(x) + Expr::term(y, 2.0)).le_scalar(8.0))
        .unwrap();

    let rows = model.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_empty());
    assert_eq!(rows[c1.index()], vec![(x, 1.0), (y, 2.0)]);
}

#[test]
fn test_integer_variable_count() {
    let mut model = Model::new();
    model.add_variable(continuous_variable(0.0, 1.0)).unwrap();
    model.add_variable(Variable::binary()).unwrap();
    model.add_variable(Variable::binary()).unwrap();
    assert_eq!(model.num_integer_variables(), 2);
}

#[test]
fn test_model_error_display_has_code() {
    let err = ModelError::InvalidCoefficient {
        coefficient: f64::INFINITY,
    };
    let rendered = err.to_string();
    assert!(rendered.starts_with("[COEFFICIENT_INVALID]"));
    assert!(rendered.contains("inf"));
}
