//! Core expression type: linear terms + constant.
//!
//! Terms are kept in insertion order and may repeat a variable; the model
//! merges duplicates when the expression is lowered into a row or objective.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::ids::VariableId;

#[derive(Debug, Clone, Default)]
pub struct Expr {
    constant: f64,
    linear: Vec<(VariableId, f64)>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Expression from linear terms and constant.
    pub fn new(linear: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self { constant, linear }
    }

    /// Single linear term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            linear: vec![(var_id, coeff)],
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self::term(var_id, 1.0)
    }

    /// From raw linear terms, no constant.
    pub fn from_linear(linear: Vec<(VariableId, f64)>) -> Self {
        Self {
            linear,
            ..Default::default()
        }
    }

    /// Unit-coefficient sum of variables.
    pub fn sum(vars: impl IntoIterator<Item = VariableId>) -> Self {
        Self::from_linear(vars.into_iter().map(|var| (var, 1.0)).collect())
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn linear_terms(&self) -> &[(VariableId, f64)] {
        &self.linear
    }

    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Consume and return linear terms.
    pub fn into_linear_terms(self) -> Vec<(VariableId, f64)> {
        self.linear
    }

    /// Consume and return (linear_terms, constant).
    pub fn into_parts(self) -> (Vec<(VariableId, f64)>, f64) {
        (self.linear, self.constant)
    }

    // ── Operations ──────────────────────────────────────────

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            linear: self
                .linear
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
        }
    }

    /// Add another expression.
    pub fn add(&self, other: &Expr) -> Self {
        let mut linear = Vec::with_capacity(self.linear.len() + other.linear.len());
        linear.extend_from_slice(&self.linear);
        linear.extend_from_slice(&other.linear);

        Self {
            constant: self.constant + other.constant,
            linear,
        }
    }

    /// Copy with constant set to zero.
    pub fn without_constant(&self) -> Self {
        Self {
            constant: 0.0,
            linear: self.linear.clone(),
        }
    }

    // ── Comparison methods (produce ConstraintExpr) ─────────

    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(self.without_constant(), sense, rhs - self.constant)
    }

    pub fn le_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::Equal)
    }

}

impl FromIterator<(VariableId, f64)> for Expr {
    fn from_iter<T: IntoIterator<Item = (VariableId, f64)>>(iter: T) -> Self {
        Self::from_linear(iter.into_iter().collect())
    }
}

// ── Operator overloads ──────────────────────────────────────

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs.scale(-1.0))
    }
}
