//! Removal of columns that must not leave the system

use super::constants::{EBI_REMOVE, PRIVATE_MODULE_PREFIX};
use super::table::ResultTable;

/// True if `column` is free text, identifying, or from the private module
///
/// Matching is case-insensitive.
pub fn is_private_column(column: &str) -> bool {
    let lower = column.to_lowercase();
    lower.starts_with(PRIVATE_MODULE_PREFIX) || EBI_REMOVE.contains(&lower.as_str())
}

/// Copy of `table` without private columns; `table` itself is untouched
pub fn drop_private_columns(table: &ResultTable) -> ResultTable {
    let filtered = table.without_columns(is_private_column);
    tracing::debug!(
        dropped = table.columns().len() - filtered.columns().len(),
        "Dropped private columns"
    );
    filtered
}
