//! Coverage summaries as sortable tables

use crate::table::{ColumnKind, ColumnLayout, Row, Table, TableError};
use crate::{CoverageSummary, ModuleCoverage};

/// `module | tested | untested | percentage | report`
pub fn index_row(m: &ModuleCoverage) -> Row {
    Row::new(vec![
        m.module.clone(),
        m.tested.to_string(),
        m.untested.to_string(),
        m.percentage().to_string(),
        m.report_page(),
    ])
}

/// `module | tested | untested | percentage | rounded | report`
pub fn cli_own_row(m: &ModuleCoverage) -> Row {
    let percentage = m.percentage();
    Row::new(vec![
        m.module.clone(),
        m.tested.to_string(),
        m.untested.to_string(),
        percentage.to_string(),
        percentage.rounded_label(),
        m.report_page(),
    ])
}

/// Index page table: semantic column ids
pub fn index_table(summary: &CoverageSummary) -> Result<Table, TableError> {
    Table::with_rows(
        ColumnLayout::coverage(),
        summary.modules.iter().map(index_row).collect(),
    )
}

/// CLI-owned page table: positional column ids with an extra rounded percentage column
pub fn cli_own_table(summary: &CoverageSummary) -> Result<Table, TableError> {
    let layout = ColumnLayout::indexed(&[
        ("Module", ColumnKind::Text),
        ("Tested", ColumnKind::Numeric),
        ("Untested", ColumnKind::Numeric),
        ("Percentage", ColumnKind::Percentage),
        ("Rounded", ColumnKind::Percentage),
        ("Report", ColumnKind::Text),
    ])
    .with_link("th5");

    Table::with_rows(layout, summary.modules.iter().map(cli_own_row).collect())
}
