use fragpack_core::SolverConfig;

/// Default threshold above which a solved fragment amount counts as packed.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Upper bound placed on each fragment amount variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentBound {
    /// `x[i,b] <= size(i)`
    #[default]
    ItemSize,
    /// No explicit upper bound; the link row alone caps the amount.
    Unbounded,
}

/// Options for a packing run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingOptions {
    pub tolerance: f64,
    /// Run the aggregate capacity pre-check before building the model.
    pub precheck: bool,
    pub fragment_bound: FragmentBound,
    pub solver: SolverConfig,
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            precheck: true,
            fragment_bound: FragmentBound::default(),
            solver: SolverConfig::default(),
        }
    }
}

impl PackingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_precheck(mut self, enabled: bool) -> Self {
        self.precheck = enabled;
        self
    }

    pub fn with_fragment_bound(mut self, bound: FragmentBound) -> Self {
        self.fragment_bound = bound;
        self
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver = config;
        self
    }
}
