//! The fragment MILP.
//!
//! For items `i` and bins `b`:
//!
//! ```text
//! minimize   sum_{i,b} y[i,b]
//! subject to sum_b x[i,b]  = size(i)          conserve[i]
//!            sum_i x[i,b] <= capacity(b)      capacity[b]
//!            x[i,b] - size(i) y[i,b] <= 0     link[i,b]
//!            x[i,b] >= 0, y[i,b] in {0, 1}
//! ```
//!
//! The link row only forces `y = 1` when `x > 0`. A solved `y = 1` with
//! `x = 0` is legal, so readers of the solution must look at `x`.

use crate::error::PackingError;
use crate::instance::PackingInstance;
use crate::options::FragmentBound;
use fragpack_core::{Bounds, Model, Variable};
use fragpack_expr::{ConstraintId, Expr, VariableId};
use std::time::Instant;
use tracing::{debug, trace};

/// A built fragment model and its (item, bin) variable tables.
///
/// Tables are item-major: the pair `(i, b)` lives at `i * bin_count + b`.
#[derive(Debug, Clone)]
pub struct FragmentModel {
    model: Model,
    item_count: usize,
    bin_count: usize,
    amounts: Vec<VariableId>,
    opens: Vec<VariableId>,
    conservation: Vec<ConstraintId>,
    capacity: Vec<ConstraintId>,
}

impl FragmentModel {
    /// Build the minimization model for an instance.
    pub fn build(instance: &PackingInstance, bound: FragmentBound) -> Result<Self, PackingError> {
        let started = Instant::now();
        let items = instance.items();
        let bin_count = instance.bin_count();
        let pairs = items.len().checked_mul(bin_count).ok_or_else(|| {
            PackingError::invalid_input(format!(
                "{} items across {} bins is too large to model",
                items.len(),
                bin_count
            ))
        })?;

        let mut model = Model::new();
        let mut amounts = Vec::with_capacity(pairs);
        let mut opens = Vec::with_capacity(pairs);

        for item in items {
            let amount_bounds = match bound {
                FragmentBound::ItemSize => Bounds::new(0.0, item.size),
                FragmentBound::Unbounded => Bounds::at_least(0.0),
            };
            for bin in 0..bin_count {
                let x = model.add_named_variable(
                    Variable::continuous(amount_bounds),
                    format!("x[{},{}]", item.id, bin),
                )?;
                amounts.push(x);
            }
        }
        for item in items {
            for bin in 0..bin_count {
                let y = model
                    .add_named_variable(Variable::binary(), format!("y[{},{}]", item.id, bin))?;
                opens.push(y);
            }
        }

        model.minimize(Expr::sum(opens.iter().copied()))?;
        model.set_objective_name(Some("fragments".to_string()));

        let mut conservation = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let row = &amounts[i * bin_count..(i + 1) * bin_count];
            let id = model.add_named_constraint_expr(
                Expr::sum(row.iter().copied()).eq_scalar(item.size),
                format!("conserve[{}]", item.id),
            )?;
            conservation.push(id);
        }

        let mut capacity = Vec::with_capacity(bin_count);
        for (bin, cap) in instance.capacities().iter().enumerate() {
            let column = (0..items.len()).map(|i| amounts[i * bin_count + bin]);
            let id = model.add_named_constraint_expr(
                Expr::sum(column).le_scalar(*cap),
                format!("capacity[{}]", bin),
            )?;
            capacity.push(id);
        }

        for (i, item) in items.iter().enumerate() {
            for bin in 0..bin_count {
                let k = i * bin_count + bin;
                let link = Expr::var(amounts[k]) - Expr::term(opens[k], item.size);
                model.add_named_constraint_expr(
                    link.le_scalar(0.0),
                    format!("link[{},{}]", item.id, bin),
                )?;
            }
            trace!(
                component = "packing",
                operation = "link_item",
                status = "success",
                item = %item.id,
                size = item.size,
                bins = bin_count,
                "Linked fragment amounts to indicators"
            );
        }

        debug!(
            component = "packing",
            operation = "build_model",
            status = "success",
            items = items.len() as u64,
            bins = bin_count as u64,
            variables = model.num_variables() as u64,
            constraints = model.num_constraints() as u64,
            nnz = model.num_coefficients() as u64,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Built fragment model"
        );

        Ok(Self {
            model,
            item_count: items.len(),
            bin_count,
            amounts,
            opens,
            conservation,
            capacity,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    fn pair_index(&self, item: usize, bin: usize) -> Option<usize> {
        (item < self.item_count && bin < self.bin_count).then_some(item * self.bin_count + bin)
    }

    /// Fragment amount variable `x[item, bin]`.
    pub fn amount_var(&self, item: usize, bin: usize) -> Option<VariableId> {
        self.pair_index(item, bin).map(|k| self.amounts[k])
    }

    /// Indicator variable `y[item, bin]`.
    pub fn open_var(&self, item: usize, bin: usize) -> Option<VariableId> {
        self.pair_index(item, bin).map(|k| self.opens[k])
    }

    pub fn conservation_row(&self, item: usize) -> Option<ConstraintId> {
        self.conservation.get(item).copied()
    }

    pub fn capacity_row(&self, bin: usize) -> Option<ConstraintId> {
        self.capacity.get(bin).copied()
    }
}
