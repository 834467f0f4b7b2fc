//! The packing pipeline over a generic solver.

use crate::error::PackingError;
use crate::extract::{Assignment, extract};
use crate::instance::{PackingInstance, PackingParams};
use crate::model::FragmentModel;
use crate::options::PackingOptions;
use crate::status::PackingStatus;
use fragpack_core::Solver;
use std::time::Instant;
use tracing::{debug, warn};

/// Result of one packing run.
///
/// Only an `Optimal` status means the assignment is a proven minimum. Limit
/// statuses may still carry the best assignment found.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: PackingStatus,
    /// Solver objective (number of opened fragments); `None` when the
    /// solver produced no values.
    pub objective: Option<f64>,
    pub assignment: Assignment,
    pub solve_time_seconds: f64,
}

impl SolveOutcome {
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

/// Builds, solves and extracts fragment models with the wrapped solver.
///
/// Each call to [`FragmentPacker::solve`] builds a fresh model; the packer
/// keeps nothing between runs apart from the solver value itself.
#[derive(Debug, Clone)]
pub struct FragmentPacker<S: Solver> {
    solver: S,
    options: PackingOptions,
}

impl<S: Solver> FragmentPacker<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            options: PackingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PackingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PackingOptions {
        &self.options
    }

    pub fn into_solver(self) -> S {
        self.solver
    }

    /// Validate parameters and solve them.
    pub fn solve_params(&mut self, params: &PackingParams) -> Result<SolveOutcome, PackingError> {
        let instance = params.to_instance()?;
        self.solve(&instance)
    }

    /// Solve one instance.
    ///
    /// Infeasible, unbounded and limit verdicts come back as the outcome
    /// status. Errors are reserved for bad options, the pre-check, model
    /// construction and a failing solver call.
    pub fn solve(&mut self, instance: &PackingInstance) -> Result<SolveOutcome, PackingError> {
        let tolerance = self.options.tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(PackingError::invalid_input(format!(
                "tolerance must be positive and finite (got {})",
                tolerance
            )));
        }
        if self.options.precheck {
            instance.precheck()?;
        }

        if instance.items().is_empty() {
            debug!(
                component = "packing",
                operation = "solve",
                status = "success",
                bins = instance.bin_count() as u64,
                "No items to pack"
            );
            return Ok(SolveOutcome {
                status: PackingStatus::Optimal,
                objective: Some(0.0),
                assignment: Assignment::new(),
                solve_time_seconds: 0.0,
            });
        }

        let fragments = FragmentModel::build(instance, self.options.fragment_bound)?;

        let started = Instant::now();
        let solution = self
            .solver
            .solve(fragments.model(), &self.options.solver)
            .inspect_err(|err| {
                warn!(
                    component = "packing",
                    operation = "solve",
                    status = "error",
                    solver = self.solver.name(),
                    code = err.code(),
                    "Solver call failed"
                );
            })?;
        let status = PackingStatus::from(solution.status);

        let (assignment, objective) = if solution.has_values() {
            let assignment = extract(&solution, &fragments, instance, tolerance)?;
            (assignment, solution.objective_value)
        } else {
            (Assignment::new(), None)
        };

        debug!(
            component = "packing",
            operation = "solve",
            status = "success",
            solver = self.solver.name(),
            packing_status = status.as_str(),
            objective = objective.unwrap_or(f64::NAN),
            fragments = assignment.fragment_count() as u64,
            used_bins = assignment.bins().len() as u64,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Packing solve completed"
        );
        if !status.is_optimal() {
            warn!(
                component = "packing",
                operation = "solve",
                status = "warn",
                packing_status = status.as_str(),
                has_assignment = !assignment.is_empty(),
                "Packing finished without a proven optimum"
            );
        }

        Ok(SolveOutcome {
            status,
            objective,
            assignment,
            solve_time_seconds: solution.solve_time_seconds,
        })
    }
}
