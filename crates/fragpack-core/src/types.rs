use fragpack_expr::ids::VariableId;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Bounds for a variable or constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `[lower, +inf)`
    pub fn at_least(lower: f64) -> Self {
        Self::new(lower, f64::INFINITY)
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }
}

/// A decision variable with bounds and integrality constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub bounds: Bounds,
    pub is_integer: bool,
}

impl Variable {
    /// Create a binary variable with bounds [0, 1] and integer constraint.
    pub fn binary() -> Self {
        Self {
            bounds: Bounds::new(0.0, 1.0),
            is_integer: true,
        }
    }

    /// Create a continuous variable with specified bounds.
    pub fn continuous(bounds: Bounds) -> Self {
        Self {
            bounds,
            is_integer: false,
        }
    }

    /// Create an integer variable with specified bounds.
    pub fn integer(bounds: Bounds) -> Self {
        Self {
            bounds,
            is_integer: true,
        }
    }
}

/// A constraint with lower and upper bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub bounds: Bounds,
}

/// Objective function with a sense and linear terms
#[derive(Debug, Clone, Default)]
pub struct Objective {
    pub sense: Option<Sense>,
    pub terms: Vec<(VariableId, f64)>,
}

impl Objective {
    /// Create a new empty objective
    pub fn new() -> Self {
        Self::default()
    }
}
