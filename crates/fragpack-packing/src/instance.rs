//! Packing inputs: items, bins and their parameter-file form.

use crate::error::PackingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Largest number of bins an instance may have.
pub const MAX_BIN_COUNT: usize = 1 << 20;

/// Relative slack in the pre-check comparisons, so that exact fits lost to
/// rounding are not rejected.
const PRECHECK_RELATIVE_TOLERANCE: f64 = 1e-9;

/// An item to pack. Its size may exceed any single bin's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "item")]
    pub id: String,
    pub size: f64,
}

impl Item {
    pub fn new(id: impl Into<String>, size: f64) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// Parameters as they appear in a JSON parameter file.
///
/// `bin_count` is signed so that a non-positive count is reported as
/// invalid input rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackingParams {
    pub bin_count: i64,
    pub bin_capacity: f64,
    pub items: Vec<Item>,
}

impl PackingParams {
    /// Five bins of capacity 10 and six items, one of them larger than a bin.
    pub fn reference() -> Self {
        Self {
            bin_count: 5,
            bin_capacity: 10.0,
            items: vec![
                Item::new("A", 12.0),
                Item::new("B", 8.0),
                Item::new("C", 7.0),
                Item::new("D", 6.0),
                Item::new("E", 5.0),
                Item::new("F", 3.0),
            ],
        }
    }

    /// Parse parameters from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, PackingError> {
        serde_json::from_str(json)
            .map_err(|err| PackingError::invalid_input(format!("malformed parameters: {err}")))
    }

    /// Validate and convert into an instance.
    pub fn to_instance(&self) -> Result<PackingInstance, PackingError> {
        PackingInstance::from_params(self)
    }
}

impl Default for PackingParams {
    fn default() -> Self {
        Self::reference()
    }
}

/// A validated packing instance.
///
/// Bins are indexed `0..bin_count()` and each carries its own capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingInstance {
    items: Vec<Item>,
    capacities: Vec<f64>,
}

impl PackingInstance {
    /// Instance with `bin_count` bins of the same capacity.
    pub fn new(items: Vec<Item>, bin_count: usize, bin_capacity: f64) -> Result<Self, PackingError> {
        validate_dimensions(items.len(), bin_count)?;
        Self::with_capacities(items, vec![bin_capacity; bin_count])
    }

    /// Instance with one capacity per bin.
    pub fn with_capacities(items: Vec<Item>, capacities: Vec<f64>) -> Result<Self, PackingError> {
        validate_dimensions(items.len(), capacities.len())?;
        validate_bins(&capacities)?;
        validate_items(&items)?;
        Ok(Self { items, capacities })
    }

    pub fn from_params(params: &PackingParams) -> Result<Self, PackingError> {
        if params.bin_count <= 0 {
            return Err(PackingError::invalid_input(format!(
                "bin_count must be positive (got {})",
                params.bin_count
            )));
        }
        let bin_count = usize::try_from(params.bin_count).map_err(|_| {
            PackingError::invalid_input(format!("bin_count {} is too large", params.bin_count))
        })?;
        Self::new(params.items.clone(), bin_count, params.bin_capacity)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn capacities(&self) -> &[f64] {
        &self.capacities
    }

    pub fn bin_count(&self) -> usize {
        self.capacities.len()
    }

    pub fn capacity(&self, bin: usize) -> Option<f64> {
        self.capacities.get(bin).copied()
    }

    /// Sum of all bin capacities.
    ///
    /// Uniform bins give `bin_count * capacity` exactly, without the drift of
    /// a running sum.
    pub fn total_capacity(&self) -> f64 {
        match self.capacities.split_first() {
            Some((first, rest)) if rest.iter().all(|capacity| capacity == first) => {
                self.capacities.len() as f64 * first
            }
            _ => self.capacities.iter().sum(),
        }
    }

    pub fn total_size(&self) -> f64 {
        self.items.iter().map(|item| item.size).sum()
    }

    pub fn largest_item(&self) -> Option<&Item> {
        self.items
            .iter()
            .max_by(|a, b| a.size.total_cmp(&b.size))
    }

    pub fn item_index(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Reject instances that cannot have any feasible split.
    ///
    /// Fragments may land in any bin, so the only necessary conditions are
    /// aggregate ones against the total capacity. Both comparisons allow a
    /// relative slack of `1e-9`.
    pub fn precheck(&self) -> Result<(), PackingError> {
        let total_capacity = self.total_capacity();
        if let Some(largest) = self
            .largest_item()
            .filter(|item| exceeds(item.size, total_capacity))
        {
            return Err(PackingError::InfeasibleByConstruction {
                reason: format!(
                    "item '{}' of size {} exceeds total capacity {}",
                    largest.id, largest.size, total_capacity
                ),
            });
        }
        let total_size = self.total_size();
        if exceeds(total_size, total_capacity) {
            return Err(PackingError::InfeasibleByConstruction {
                reason: format!(
                    "total item size {} exceeds total capacity {}",
                    total_size, total_capacity
                ),
            });
        }
        Ok(())
    }
}

fn exceeds(size: f64, capacity: f64) -> bool {
    size > capacity * (1.0 + PRECHECK_RELATIVE_TOLERANCE)
}

/// The model has two `u32`-indexed columns per (item, bin) pair.
fn validate_dimensions(item_count: usize, bin_count: usize) -> Result<(), PackingError> {
    if bin_count > MAX_BIN_COUNT {
        return Err(PackingError::invalid_input(format!(
            "bin_count {} exceeds the limit of {}",
            bin_count, MAX_BIN_COUNT
        )));
    }
    let columns = item_count
        .checked_mul(bin_count)
        .and_then(|pairs| pairs.checked_mul(2))
        .filter(|columns| u32::try_from(*columns).is_ok());
    if columns.is_none() {
        return Err(PackingError::invalid_input(format!(
            "{} items across {} bins is too large to model",
            item_count, bin_count
        )));
    }
    Ok(())
}

fn validate_bins(capacities: &[f64]) -> Result<(), PackingError> {
    if capacities.is_empty() {
        return Err(PackingError::invalid_input("bin_count must be positive (got 0)"));
    }
    for (bin, capacity) in capacities.iter().enumerate() {
        if !capacity.is_finite() || *capacity <= 0.0 {
            return Err(PackingError::invalid_input(format!(
                "capacity of bin {} must be positive and finite (got {})",
                bin, capacity
            )));
        }
    }
    Ok(())
}

fn validate_items(items: &[Item]) -> Result<(), PackingError> {
    let mut seen = BTreeSet::new();
    for item in items {
        if item.id.is_empty() {
            return Err(PackingError::invalid_input("item id must not be empty"));
        }
        if !item.size.is_finite() || item.size <= 0.0 {
            return Err(PackingError::invalid_input(format!(
                "size of item '{}' must be positive and finite (got {})",
                item.id, item.size
            )));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(PackingError::invalid_input(format!(
                "duplicate item id '{}'",
                item.id
            )));
        }
    }
    Ok(())
}
