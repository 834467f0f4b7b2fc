use fragpack_core::SolverStatus;
use serde::Serialize;

/// Terminal verdict of a packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PackingStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped by a time or iteration limit.
    #[serde(rename = "Not Solved")]
    NotSolved,
    /// The solver reported something we cannot classify.
    Undefined,
}

impl PackingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PackingStatus::Optimal => "Optimal",
            PackingStatus::Infeasible => "Infeasible",
            PackingStatus::Unbounded => "Unbounded",
            PackingStatus::NotSolved => "Not Solved",
            PackingStatus::Undefined => "Undefined",
        }
    }

    pub fn is_optimal(self) -> bool {
        self == PackingStatus::Optimal
    }
}

impl From<SolverStatus> for PackingStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Optimal => PackingStatus::Optimal,
            SolverStatus::Infeasible => PackingStatus::Infeasible,
            SolverStatus::Unbounded => PackingStatus::Unbounded,
            SolverStatus::TimeLimit | SolverStatus::IterationLimit => PackingStatus::NotSolved,
            SolverStatus::Unknown => PackingStatus::Undefined,
        }
    }
}

impl std::fmt::Display for PackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_status_mapping() {
        assert_eq!(PackingStatus::from(SolverStatus::Optimal), PackingStatus::Optimal);
        assert_eq!(
            PackingStatus::from(SolverStatus::Infeasible),
            PackingStatus::Infeasible
        );
        assert_eq!(
            PackingStatus::from(SolverStatus::Unbounded),
            PackingStatus::Unbounded
        );
        assert_eq!(
            PackingStatus::from(SolverStatus::TimeLimit),
            PackingStatus::NotSolved
        );
        assert_eq!(
            PackingStatus::from(SolverStatus::IterationLimit),
            PackingStatus::NotSolved
        );
        assert_eq!(
            PackingStatus::from(SolverStatus::Unknown),
            PackingStatus::Undefined
        );
    }

    #[test]
    fn test_serializes_display_names() {
        assert_eq!(
            serde_json::to_string(&PackingStatus::NotSolved).unwrap(),
            "\"Not Solved\""
        );
        assert_eq!(PackingStatus::Optimal.to_string(), "Optimal");
        assert!(!PackingStatus::Undefined.is_optimal());
    }
}
