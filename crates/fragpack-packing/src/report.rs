//! Output artifacts: CSV rows and the console summary.
//!
//! Nothing here feeds back into solving.

use crate::extract::Assignment;
use crate::packer::SolveOutcome;
use crate::status::PackingStatus;
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column header of the packed items CSV.
pub const CSV_HEADER: &str = "bin,item,packed_size";

/// One row of the packed items table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedRow {
    pub bin: usize,
    pub item: String,
    pub packed_size: f64,
}

/// Flatten an assignment to rows, bin order then item order.
pub fn packed_rows(assignment: &Assignment) -> Vec<PackedRow> {
    assignment
        .bins()
        .iter()
        .flat_map(|entry| {
            entry.fragments.iter().map(move |fragment| PackedRow {
                bin: entry.bin,
                item: fragment.item.clone(),
                packed_size: fragment.size,
            })
        })
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the packed items table as CSV.
pub fn write_csv<W: Write>(mut writer: W, assignment: &Assignment) -> std::io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for row in packed_rows(assignment) {
        writeln!(
            writer,
            "{},{},{}",
            row.bin,
            csv_field(&row.item),
            row.packed_size
        )?;
    }
    writer.flush()
}

/// Write the packed items CSV to `path`, creating parent directories.
pub fn write_csv_file(path: &Path, assignment: &Assignment) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), assignment)
}

/// Console summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub status: PackingStatus,
    /// Solver objective, `null` when the solver produced no values.
    pub number_of_fragments: Option<f64>,
    pub packed_items: Assignment,
}

impl Summary {
    pub fn from_outcome(outcome: &SolveOutcome) -> Self {
        Self {
            status: outcome.status,
            number_of_fragments: outcome.objective,
            packed_items: outcome.assignment.clone(),
        }
    }
}
