//! Invariant checks on a packing outcome.

use crate::error::PackingError;
use crate::instance::PackingInstance;
use crate::packer::SolveOutcome;
use std::collections::BTreeSet;

/// Check an outcome's assignment against the instance.
///
/// Every bin and item must exist, fragments must be non-negative, each
/// bin's load must stay within its capacity and each item's fragments must
/// add up to its size, all within `tolerance`. An outcome without an
/// assignment for a non-empty instance fails the conservation check.
pub fn verify(
    outcome: &SolveOutcome,
    instance: &PackingInstance,
    tolerance: f64,
) -> Result<(), PackingError> {
    let mut seen_bins = BTreeSet::new();
    for entry in outcome.assignment.bins() {
        let capacity = instance.capacity(entry.bin).ok_or_else(|| {
            PackingError::violation(format!(
                "bin {} is outside 0..{}",
                entry.bin,
                instance.bin_count()
            ))
        })?;
        if !seen_bins.insert(entry.bin) {
            return Err(PackingError::violation(format!(
                "bin {} appears more than once",
                entry.bin
            )));
        }
        for fragment in &entry.fragments {
            if instance.item_index(&fragment.item).is_none() {
                return Err(PackingError::violation(format!(
                    "unknown item '{}' in bin {}",
                    fragment.item, entry.bin
                )));
            }
            if !fragment.size.is_finite() || fragment.size < -tolerance {
                return Err(PackingError::violation(format!(
                    "fragment of '{}' in bin {} has size {}",
                    fragment.item, entry.bin, fragment.size
                )));
            }
        }
        let load = entry.load();
        if load > capacity + tolerance {
            return Err(PackingError::violation(format!(
                "bin {} holds {} over capacity {}",
                entry.bin, load, capacity
            )));
        }
    }

    for item in instance.items() {
        let total = outcome.assignment.item_total(&item.id);
        if (total - item.size).abs() > tolerance {
            return Err(PackingError::violation(format!(
                "item '{}' packed {} of size {}",
                item.id, total, item.size
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Assignment, Fragment};
    use crate::instance::Item;
    use crate::status::PackingStatus;

    fn instance() -> PackingInstance {
        PackingInstance::new(vec![Item::new("A", 12.0), Item::new("B", 5.0)], 2, 10.0).unwrap()
    }

    fn fragment(item: &str, size: f64) -> Fragment {
        Fragment {
            item: item.to_string(),
            size,
        }
    }

    fn outcome(bins: Vec<(usize, Vec<Fragment>)>) -> SolveOutcome {
        let mut assignment = Assignment::new();
        for (bin, fragments) in bins {
            assignment.push_bin(bin, fragments);
        }
        SolveOutcome {
            status: PackingStatus::Optimal,
            objective: Some(assignment.fragment_count() as f64),
            assignment,
            solve_time_seconds: 0.0,
        }
    }

    #[test]
    fn test_valid_split_passes() {
        let outcome = outcome(vec![
            (0, vec![fragment("A", 10.0)]),
            (1, vec![fragment("A", 2.0), fragment("B", 5.0)]),
        ]);
        verify(&outcome, &instance(), 1e-6).unwrap();
    }

    #[test]
    fn test_over_capacity_fails() {
        let outcome = outcome(vec![
            (0, vec![fragment("A", 7.0), fragment("B", 5.0)]),
            (1, vec![fragment("A", 5.0)]),
        ]);
        let err = verify(&outcome, &instance(), 1e-6).unwrap_err();
        assert_eq!(err.code(), "PACKING_VIOLATION");
        assert!(err.to_string().contains("over capacity"));
    }

    #[test]
    fn test_short_item_fails() {
        let outcome = outcome(vec![
            (0, vec![fragment("A", 10.0)]),
            (1, vec![fragment("B", 5.0)]),
        ]);
        let err = verify(&outcome, &instance(), 1e-6).unwrap_err();
        assert!(err.to_string().contains("item 'A' packed 10 of size 12"));
    }

    #[test]
    fn test_unknown_bin_and_item_fail() {
        let bad_bin = outcome(vec![(5, vec![fragment("A", 12.0)])]);
        assert!(verify(&bad_bin, &instance(), 1e-6).is_err());

        let bad_item = outcome(vec![(0, vec![fragment("Q", 1.0)])]);
        let err = verify(&bad_item, &instance(), 1e-6).unwrap_err();
        assert!(err.to_string().contains("unknown item 'Q'"));
    }

    #[test]
    fn test_negative_fragment_fails() {
        let outcome = outcome(vec![
            (0, vec![fragment("A", 10.0), fragment("B", -1.0)]),
            (1, vec![fragment("A", 2.0), fragment("B", 6.0)]),
        ]);
        assert!(verify(&outcome, &instance(), 1e-6).is_err());
    }

    #[test]
    fn test_empty_assignment_fails_for_items() {
        let empty = outcome(Vec::new());
        assert!(verify(&empty, &instance(), 1e-6).is_err());

        let no_items = PackingInstance::new(Vec::new(), 1, 1.0).unwrap();
        verify(&empty, &no_items, 1e-6).unwrap();
    }
}
