//! Solved values to an item-to-bin assignment.

use crate::error::PackingError;
use crate::instance::PackingInstance;
use crate::model::FragmentModel;
use crate::status::PackingStatus;
use fragpack_core::Solution;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A nonzero piece of one item placed in one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub item: String,
    pub size: f64,
}

/// The fragments packed into one used bin, in item input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BinAssignment {
    pub bin: usize,
    pub fragments: Vec<Fragment>,
}

impl BinAssignment {
    pub fn load(&self) -> f64 {
        self.fragments.iter().map(|fragment| fragment.size).sum()
    }
}

/// Used bins in index order. Bins without a fragment above tolerance are
/// absent.
///
/// Serializes as `{ "<bin>": { "<item>": size, ... }, ... }` preserving
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    bins: Vec<BinAssignment>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bins(&self) -> &[BinAssignment] {
        &self.bins
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Indices of the used bins.
    pub fn used_bins(&self) -> impl Iterator<Item = usize> + '_ {
        self.bins.iter().map(|entry| entry.bin)
    }

    pub fn fragment_count(&self) -> usize {
        self.bins.iter().map(|entry| entry.fragments.len()).sum()
    }

    pub fn fragments(&self, bin: usize) -> Option<&[Fragment]> {
        self.bins
            .iter()
            .find(|entry| entry.bin == bin)
            .map(|entry| entry.fragments.as_slice())
    }

    /// Total packed size of one bin; zero for an unused bin.
    pub fn bin_load(&self, bin: usize) -> f64 {
        self.fragments(bin)
            .map(|fragments| fragments.iter().map(|fragment| fragment.size).sum())
            .unwrap_or(0.0)
    }

    /// Total packed size of one item across all bins.
    pub fn item_total(&self, item: &str) -> f64 {
        self.bins
            .iter()
            .flat_map(|entry| entry.fragments.iter())
            .filter(|fragment| fragment.item == item)
            .map(|fragment| fragment.size)
            .sum()
    }

    /// Append a used bin. Intended for assembling assignments by hand.
    pub fn push_bin(&mut self, bin: usize, fragments: Vec<Fragment>) {
        self.bins.push(BinAssignment { bin, fragments });
    }
}

struct BinFragments<'a>(&'a [Fragment]);

impl Serialize for BinFragments<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for fragment in self.0 {
            map.serialize_entry(&fragment.item, &fragment.size)?;
        }
        map.end()
    }
}

impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bins.len()))?;
        for entry in &self.bins {
            map.serialize_entry(&entry.bin, &BinFragments(&entry.fragments))?;
        }
        map.end()
    }
}

/// Read the fragment amounts out of a solution.
///
/// A bin is used when its total amount exceeds `tolerance`; inside a used
/// bin only amounts above `tolerance` are kept. Indicator values are never
/// consulted.
pub fn extract(
    solution: &Solution,
    fragments: &FragmentModel,
    instance: &PackingInstance,
    tolerance: f64,
) -> Result<Assignment, PackingError> {
    let missing = || PackingError::NoSolutionAvailable {
        status: PackingStatus::from(solution.status),
    };

    let mut assignment = Assignment::new();
    for bin in 0..instance.bin_count() {
        let mut amounts = Vec::with_capacity(instance.items().len());
        for (i, item) in instance.items().iter().enumerate() {
            let var = fragments.amount_var(i, bin).ok_or_else(missing)?;
            let value = solution.get_primal(var.index()).ok_or_else(missing)?;
            amounts.push((item, value));
        }

        let total: f64 = amounts.iter().map(|(_, value)| value).sum();
        if total <= tolerance {
            continue;
        }

        let packed: Vec<Fragment> = amounts
            .into_iter()
            .filter(|(_, value)| *value > tolerance)
            .map(|(item, value)| Fragment {
                item: item.id.clone(),
                size: value,
            })
            .collect();
        if !packed.is_empty() {
            assignment.push_bin(bin, packed);
        }
    }

    tracing::trace!(
        component = "packing",
        operation = "extract",
        status = "success",
        used_bins = assignment.bins().len(),
        fragments = assignment.fragment_count(),
        tolerance,
        "Extracted assignment"
    );

    Ok(assignment)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::instance::Item;
    use crate::options::FragmentBound;
    use fragpack_core::SolverStatus;
    use std::collections::BTreeMap;

    fn instance() -> PackingInstance {
        PackingInstance::new(
            vec![Item::new("A", 12.0), Item::new("B", 8.0), Item::new("C", 2.0)],
            3,
            10.0,
        )
        .unwrap()
    }

    /// Solution with the given amounts; everything else (including all
    /// indicators) at zero unless listed in `opens`.
    fn solution_with(
        fm: &FragmentModel,
        amounts: &[(usize, usize, f64)],
        opens: &[(usize, usize)],
    ) -> Solution {
        let mut values = vec![0.0; fm.model().num_variables()];
        for (item, bin, value) in amounts {
            values[fm.amount_var(*item, *bin).unwrap().index()] = *value;
        }
        for (item, bin) in opens {
            values[fm.open_var(*item, *bin).unwrap().index()] = 1.0;
        }
        Solution {
            primal_values: values,
            objective_value: Some(opens.len() as f64),
            status: SolverStatus::Optimal,
            solve_time_seconds: 0.0,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_extracts_bins_in_order() {
        let instance = instance();
        let fm = FragmentModel::build(&instance, FragmentBound::ItemSize).unwrap();
        let solution = solution_with(
            &fm,
            &[(0, 0, 10.0), (0, 2, 2.0), (1, 2, 8.0), (2, 1, 2.0)],
            &[(0, 0), (0, 2), (1, 2), (2, 1)],
        );

        let assignment = extract(&solution, &fm, &instance, 1e-9).unwrap();
        assert_eq!(assignment.used_bins().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(assignment.fragment_count(), 4);
        assert_eq!(assignment.item_total("A"), 12.0);
        assert_eq!(assignment.bin_load(2), 10.0);
        // input order inside a bin
        let bin2: Vec<&str> = assignment.fragments(2).unwrap().iter().map(|f| f.item.as_str()).collect();
        assert_eq!(bin2, vec!["A", "B"]);
    }

    #[test]
    fn test_gates_on_amount_not_indicator() {
        let instance = instance();
        let fm = FragmentModel::build(&instance, FragmentBound::ItemSize).unwrap();
        // y[B,0] opened with no amount; it must not show up
        let solution = solution_with(
            &fm,
            &[(0, 0, 10.0), (0, 1, 2.0), (1, 1, 8.0), (2, 2, 2.0)],
            &[(0, 0), (0, 1), (1, 1), (2, 2), (1, 0)],
        );

        let assignment = extract(&solution, &fm, &instance, 1e-9).unwrap();
        assert_eq!(assignment.fragment_count(), 4);
        assert!(
            assignment
                .fragments(0)
                .unwrap()
                .iter()
                .all(|fragment| fragment.item != "B")
        );
        // the solver objective counts the stray indicator, the assignment does not
        assert_eq!(solution.objective_value, Some(5.0));
    }

    #[test]
    fn test_noise_below_tolerance_dropped() {
        let instance = instance();
        let fm = FragmentModel::build(&instance, FragmentBound::ItemSize).unwrap();
        let solution = solution_with(
            &fm,
            &[(0, 0, 10.0), (0, 1, 2.0), (1, 1, 8.0 - 1e-12), (2, 0, 1e-12), (2, 2, 2.0)],
            &[],
        );

        let assignment = extract(&solution, &fm, &instance, 1e-9).unwrap();
        assert_eq!(assignment.fragments(0).unwrap().len(), 1);
        assert_eq!(assignment.fragment_count(), 4);
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let instance = instance();
        let fm = FragmentModel::build(&instance, FragmentBound::ItemSize).unwrap();
        let solution = solution_with(&fm, &[(0, 0, 10.0), (0, 1, 2.0), (2, 1, 0.5)], &[]);

        let strict = extract(&solution, &fm, &instance, 1e-9).unwrap();
        let loose = extract(&solution, &fm, &instance, 1.0).unwrap();
        assert_eq!(strict.fragment_count(), 3);
        assert_eq!(loose.fragment_count(), 2);
    }

    #[test]
    fn test_missing_values_report_status() {
        let instance = instance();
        let fm = FragmentModel::build(&instance, FragmentBound::ItemSize).unwrap();
        let solution = Solution::without_values(SolverStatus::TimeLimit, 1.0);

        let err = extract(&solution, &fm, &instance, 1e-9).unwrap_err();
        assert!(matches!(
            err,
            PackingError::NoSolutionAvailable {
                status: PackingStatus::NotSolved
            }
        ));
    }

    #[test]
    fn test_serializes_nested_map_in_order() {
        let mut assignment = Assignment::new();
        assignment.push_bin(
            3,
            vec![
                Fragment {
                    item: "Z".to_string(),
                    size: 1.5,
                },
                Fragment {
                    item: "A".to_string(),
                    size: 2.0,
                },
            ],
        );
        assignment.push_bin(
            0,
            vec![Fragment {
                item: "B".to_string(),
                size: 4.0,
            }],
        );

        let text = serde_json::to_string(&assignment).unwrap();
        assert_eq!(text, r#"{"3":{"Z":1.5,"A":2.0},"0":{"B":4.0}}"#);
        assert_eq!(assignment.bins()[0].load(), 3.5);
        assert_eq!(assignment.bin_load(7), 0.0);
    }
}
