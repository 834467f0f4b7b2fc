//! HiGHS solver implementation.

use crate::ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, ObjectiveSense};
use crate::status::{highs_may_have_solution, highs_status_string, highs_to_core_status};
use fragpack_core::{Model, Sense, Solution, Solver, SolverConfig, SolverError};
use fragpack_expr::VariableId;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

fn highs_model_error_to_solver_error(err: HighsModelError) -> SolverError {
    SolverError::SolverSpecific(err.to_string())
}

/// [`Solver`] backed by the HiGHS MILP solver.
///
/// Holds no state between solves; every call builds a fresh HiGHS problem
/// from the given model.
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    _private: (),
}

impl HighsSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for HighsSolver {
    fn solve(&mut self, model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
        solve_model(model, config)
    }

    fn name(&self) -> &'static str {
        "highs"
    }
}

/// Validate that a model is ready for solving.
fn validate_model(model: &Model) -> Result<Sense, SolverError> {
    if model.num_variables() == 0 {
        return Err(SolverError::EmptyModel);
    }
    model.objective().sense.ok_or(SolverError::NoObjective)
}

fn collect_objective_coefficients(model: &Model) -> Result<BTreeMap<VariableId, f64>, SolverError> {
    let mut objective_coeffs: BTreeMap<VariableId, f64> = BTreeMap::new();
    for (var_id, coeff) in &model.objective().terms {
        if model.get_variable(*var_id).is_err() {
            return Err(SolverError::InvalidVariableId(var_id.inner()));
        }
        *objective_coeffs.entry(*var_id).or_insert(0.0) += *coeff;
    }
    Ok(objective_coeffs)
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    highs_model.set_log_to_console(config.log_to_console.unwrap_or(false));

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        highs_model.set_option("presolve", HighsOption::Str(presolve_str.to_string()));
    }
    if let Some(threads) = config.threads {
        highs_model.set_option("threads", HighsOption::Int(threads as i32));
    }
    if let Some(seed) = config.random_seed {
        highs_model.set_option("random_seed", HighsOption::Int(seed as i32));
    }
    if let Some(tolerance) = config.tolerance {
        highs_model.set_option(
            "primal_feasibility_tolerance",
            HighsOption::Float(tolerance),
        );
        highs_model.set_option("dual_feasibility_tolerance", HighsOption::Float(tolerance));
        highs_model.set_option("mip_feasibility_tolerance", HighsOption::Float(tolerance));
    }
}

fn add_variables_to_highs(
    model: &Model,
    highs_model: &mut HighsModel,
    objective_coeffs: &BTreeMap<VariableId, f64>,
) -> Vec<usize> {
    let mut var_to_col = Vec::with_capacity(model.num_variables());

    for (var_id, var) in model.variables() {
        let obj_coeff = objective_coeffs.get(&var_id).copied().unwrap_or(0.0);
        let col_idx = if var.is_integer {
            highs_model.add_integer_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        } else {
            highs_model.add_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        };
        var_to_col.push(col_idx);

        trace!(
            component = "solver",
            operation = "add_variable",
            status = "success",
            var_id = var_id.inner(),
            name = model.get_variable_name(var_id).unwrap_or(""),
            col_idx,
            lower = var.bounds.lower,
            upper = var.bounds.upper,
            obj_coeff,
            is_integer = var.is_integer,
            "Added variable to HiGHS"
        );
    }

    var_to_col
}

fn add_constraints_to_highs(
    model: &Model,
    highs_model: &mut HighsModel,
    var_to_col: &[usize],
) -> Result<(), SolverError> {
    let rows = model.rows();
    for ((constraint_id, constraint), row) in model.constraints().zip(rows) {
        let mut col_indices = Vec::with_capacity(row.len());
        let mut coefficients = Vec::with_capacity(row.len());
        for (var_id, coeff) in row {
            let col = var_to_col
                .get(var_id.index())
                .copied()
                .ok_or(SolverError::InvalidVariableId(var_id.inner()))?;
            col_indices.push(col);
            coefficients.push(coeff);
        }

        highs_model
            .add_row(
                constraint.bounds.lower,
                constraint.bounds.upper,
                &col_indices,
                &coefficients,
            )
            .map_err(highs_model_error_to_solver_error)?;

        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint_id = constraint_id.inner(),
            name = model.get_constraint_name(constraint_id).unwrap_or(""),
            lower = constraint.bounds.lower,
            upper = constraint.bounds.upper,
            num_coeffs = col_indices.len(),
            "Added constraint to HiGHS"
        );
    }

    Ok(())
}

fn solve_model(model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
    let sense = validate_model(model)?;

    let solver_version = crate::ffi::highs_version().unwrap_or_else(|| "unknown".to_string());
    let solve_started = Instant::now();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        variables = model.num_variables() as u64,
        integer_variables = model.num_integer_variables() as u64,
        constraints = model.num_constraints() as u64,
        nnz = model.num_coefficients() as u64,
        "Starting solve process"
    );

    let objective_coeffs = collect_objective_coefficients(model)?;

    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config);
    highs_model.set_objective_sense(match sense {
        Sense::Minimize => ObjectiveSense::Minimize,
        Sense::Maximize => ObjectiveSense::Maximize,
    });

    let var_to_col = add_variables_to_highs(model, &mut highs_model, &objective_coeffs);
    add_constraints_to_highs(model, &mut highs_model, &var_to_col)?;

    let status = highs_model
        .solve()
        .map_err(highs_model_error_to_solver_error)?;
    let solve_time_seconds = solve_started.elapsed().as_secs_f64();

    if status == HighsStatus::Error {
        warn!(
            component = "solver",
            operation = "solve",
            status = "error",
            solver = "highs",
            solver_version = %solver_version,
            duration_ms = solve_time_seconds * 1000.0,
            "HiGHS reported a model or solve error"
        );
        return Err(SolverError::SolverSpecific(format!(
            "HiGHS finished with status {}",
            highs_status_string(status)
        )));
    }

    let core_status = highs_to_core_status(status);
    let objective_value = highs_model
        .objective_value()
        .map_err(highs_model_error_to_solver_error)?;

    // A limit status without an incumbent reports an infinite objective.
    let has_solution = highs_may_have_solution(status) && objective_value.is_finite();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        solver_status = highs_status_string(status),
        objective_value,
        has_solution,
        duration_ms = solve_time_seconds * 1000.0,
        "HiGHS solve completed"
    );

    if !has_solution {
        if !core_status.is_optimal() {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = "highs",
                solver_status = highs_status_string(status),
                "Solver finished without a solution"
            );
        }
        return Ok(Solution::without_values(core_status, solve_time_seconds));
    }

    if status != HighsStatus::Optimal {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = "highs",
            solver_status = highs_status_string(status),
            objective_value,
            "Solver hit limit but returning best solution found"
        );
    }

    let snapshot = highs_model
        .solution_snapshot()
        .map_err(highs_model_error_to_solver_error)?;

    let mut metadata = BTreeMap::new();
    metadata.insert("num_cols".to_string(), var_to_col.len() as f64);
    metadata.insert("num_rows".to_string(), snapshot.row_values().len() as f64);

    let primal_values: Vec<f64> = var_to_col
        .iter()
        .map(|col| snapshot.col_values().get(*col).copied())
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| {
            SolverError::SolverSpecific(format!(
                "HiGHS returned {} column values for {} variables",
                snapshot.col_values().len(),
                var_to_col.len()
            ))
        })?;

    trace!(
        component = "solver",
        operation = "extract_solution",
        status = "success",
        num_primal_values = primal_values.len(),
        "Solution extracted"
    );

    Ok(Solution {
        primal_values,
        objective_value: Some(objective_value),
        status: core_status,
        solve_time_seconds,
        metadata,
    })
}
