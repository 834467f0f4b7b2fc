//! Status conversions for HiGHS integration.

use crate::ffi::HighsStatus;
use fragpack_core::SolverStatus;

/// Map a HiGHS status onto the solver-agnostic status.
///
/// `Error` never reaches this point in a successful solve; it is turned into
/// a `SolverError` by the caller.
pub(crate) fn highs_to_core_status(status: HighsStatus) -> SolverStatus {
    match status {
        HighsStatus::Optimal => SolverStatus::Optimal,
        HighsStatus::Infeasible => SolverStatus::Infeasible,
        HighsStatus::Unbounded => SolverStatus::Unbounded,
        HighsStatus::UnboundedOrInfeasible => SolverStatus::Unknown,
        HighsStatus::ReachedTimeLimit => SolverStatus::TimeLimit,
        HighsStatus::ReachedIterationLimit => SolverStatus::IterationLimit,
        HighsStatus::Error | HighsStatus::Unknown => SolverStatus::Unknown,
    }
}

pub(crate) fn highs_status_string(status: HighsStatus) -> &'static str {
    match status {
        HighsStatus::Optimal => "optimal",
        HighsStatus::Infeasible => "infeasible",
        HighsStatus::Unbounded => "unbounded",
        HighsStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
        HighsStatus::ReachedTimeLimit => "time_limit",
        HighsStatus::ReachedIterationLimit => "iteration_limit",
        HighsStatus::Error => "error",
        HighsStatus::Unknown => "unknown",
    }
}

/// Whether a status can come with primal values.
///
/// Limit statuses only carry values when an incumbent was found, which the
/// caller checks through the objective value.
pub(crate) fn highs_may_have_solution(status: HighsStatus) -> bool {
    matches!(
        status,
        HighsStatus::Optimal | HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit
    )
}
