//! Result table assembly

use super::constants::{MISSING_VALUE, NOT_SELECTED};
use super::flatten::FlatRow;
use std::collections::{BTreeSet, HashMap, HashSet};

/// One fully populated table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    barcode: String,
    values: HashMap<String, String>,
}

impl TableRow {
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub(crate) fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }
}

/// Union of all flattened rows, one row per fetched sample
///
/// Every row holds a value for every column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ResultTable {
    /// Union rows into one wide table
    ///
    /// Rows are keyed by barcode; a repeated barcode keeps its first row.
    /// Columns keep first-seen order. Absent multiselect cells mean "not
    /// selected" and become `"false"`; every other absent cell gets the
    /// missing sentinel.
    pub fn assemble(flat_rows: Vec<FlatRow>, multiselect_columns: &BTreeSet<String>) -> Self {
        let mut columns = Vec::new();
        let mut known = HashSet::new();
        let mut partial = Vec::with_capacity(flat_rows.len());

        let mut barcodes = HashSet::new();

        for flat in flat_rows {
            let (barcode, order, values) = flat.into_parts();
            if !barcodes.insert(barcode.clone()) {
                tracing::debug!(barcode = %barcode, "Dropping repeated row");
                continue;
            }
            for column in order {
                if known.insert(column.clone()) {
                    columns.push(column);
                }
            }
            partial.push((barcode, values));
        }

        let rows = partial
            .into_iter()
            .map(|(barcode, mut values)| {
                for column in &columns {
                    if !values.contains_key(column) {
                        let fill = if multiselect_columns.contains(column) {
                            NOT_SELECTED
                        } else {
                            MISSING_VALUE
                        };
                        values.insert(column.clone(), fill.to_string());
                    }
                }
                TableRow { barcode, values }
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }

    /// First row for `barcode`
    pub fn row(&self, barcode: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.barcode == barcode)
    }

    pub fn get(&self, barcode: &str, column: &str) -> Option<&str> {
        self.row(barcode).and_then(|r| r.get(column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a column, filling every row with `fill`; no-op if present
    pub(crate) fn add_column(&mut self, column: &str, fill: &str) {
        if self.has_column(column) {
            return;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.set(column, fill);
        }
    }

    /// Copy of the table without the columns matching `exclude`
    pub fn without_columns<F: Fn(&str) -> bool>(&self, exclude: F) -> Self {
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !exclude(c.as_str()))
            .cloned()
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| TableRow {
                barcode: row.barcode.clone(),
                values: row
                    .values
                    .iter()
                    .filter(|(k, _)| !exclude(k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }
}
