//! Reporter module for output formatting

pub mod console;
pub mod html;
pub mod json;

pub use console::ConsoleReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;

use crate::table::Table;
use crate::{CoverageSummary, ModuleCoverage};
use std::collections::HashMap;

/// Modules in the row order of a sorted table whose first column holds the module name
pub(crate) fn modules_in_table_order<'a>(
    summary: &'a CoverageSummary,
    table: &Table,
) -> Vec<&'a ModuleCoverage> {
    let Some(first) = table.layout().columns().first() else {
        return Vec::new();
    };
    let by_name: HashMap<&str, &ModuleCoverage> = summary
        .modules
        .iter()
        .map(|m| (m.module.as_str(), m))
        .collect();
    table
        .column_values(&first.id)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|name| by_name.get(name).copied())
        .collect()
}
