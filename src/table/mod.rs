//! Sortable table model
//!
//! A table is a header (the column layout) plus data rows of string cells.
//! Sorting always moves whole rows, so every cell of a row stays with it.

mod compare;
mod sorter;

pub use compare::{
    compare_keys, SortKey, EMPTY_PERCENTAGE_RANK, NOT_APPLICABLE_RANK, NOT_APPLICABLE_TOKENS,
};
pub use sorter::{SortDirection, SortSpec, SortState, TableSorter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the table model and sorter
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid sort spec `{0}` (expected COLUMN or COLUMN:asc|desc)")]
    InvalidSortSpec(String),
}

/// How a column's cell text is interpreted for comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Leading integer ("12", "-3", "7 commands")
    Numeric,
    /// Case-insensitive text
    Text,
    /// Suffixed value ("45.5%") with sentinel tokens for N/A and empty cells
    Percentage,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Percentage => write!(f, "percentage"),
        }
    }
}

/// A single column: stable id, display title and value kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub kind: ColumnKind,
    /// Cells hold a relative URL and render as links
    pub link: bool,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            link: false,
        }
    }

    pub fn as_link(mut self) -> Self {
        self.link = true;
        self
    }
}

/// Ordered set of columns; maps column ids to their comparator kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Semantic ids used by the module coverage index page
    pub fn coverage() -> Self {
        Self::new(vec![
            Column::new("module", "Module", ColumnKind::Text),
            Column::new("tested", "Tested", ColumnKind::Numeric),
            Column::new("untested", "Untested", ColumnKind::Numeric),
            Column::new("percentage", "Percentage", ColumnKind::Percentage),
            Column::new("report", "Report", ColumnKind::Text).as_link(),
        ])
    }

    /// Positional ids (`th0`, `th1`, ...) for the given titles and kinds
    pub fn indexed(columns: &[(&str, ColumnKind)]) -> Self {
        Self::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, (title, kind))| Column::new(format!("th{}", i), *title, *kind))
                .collect(),
        )
    }

    /// Mark an existing column as a link column
    pub fn with_link(mut self, id: &str) -> Self {
        if let Some(column) = self.columns.iter_mut().find(|c| c.id == id) {
            column.link = true;
        }
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by id
    pub fn position(&self, id: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    pub fn column(&self, id: &str) -> Result<&Column, TableError> {
        self.position(id).map(|i| &self.columns[i])
    }

    /// Find a column by id, falling back to a case-insensitive title match
    pub fn resolve(&self, name: &str) -> Result<&Column, TableError> {
        self.columns
            .iter()
            .find(|c| c.id == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|c| c.title.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }
}

/// One data row; cells are in layout order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Header plus data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    layout: ColumnLayout,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            rows: Vec::new(),
        }
    }

    /// Build a table, rejecting rows whose width differs from the layout
    pub fn with_rows(layout: ColumnLayout, rows: Vec<Row>) -> Result<Self, TableError> {
        let mut table = Self::new(layout);
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, row: Row) -> Result<(), TableError> {
        if row.cells.len() != self.layout.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.layout.len(),
                found: row.cells.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Cells of one column in current row order
    pub fn column_values(&self, id: &str) -> Result<Vec<&str>, TableError> {
        let index = self.layout.position(id)?;
        Ok(self.rows.iter().map(|r| r.cells[index].as_str()).collect())
    }

    /// Sort key of every row for a column, in current row order
    #[cfg(test)]
    pub(crate) fn sort_keys(&self, id: &str) -> Result<Vec<SortKey>, TableError> {
        let index = self.layout.position(id)?;
        let kind = self.layout.columns[index].kind;
        Ok(self
            .rows
            .iter()
            .map(|r| SortKey::extract(kind, &r.cells[index]))
            .collect())
    }

    /// Stable sort of the data rows by one column
    pub fn sort_by(&mut self, id: &str, direction: SortDirection) -> Result<(), TableError> {
        let index = self.layout.position(id)?;
        let kind = self.layout.columns[index].kind;

        let mut keyed: Vec<(SortKey, Row)> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| (SortKey::extract(kind, &row.cells[index]), row))
            .collect();
        // Vec::sort_by is stable: equal keys keep their prior order
        keyed.sort_by(|a, b| direction.apply(compare_keys(&a.0, &b.0)));
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();

        log::debug!(
            "sorted {} rows by `{}` ({}, {})",
            self.rows.len(),
            id,
            kind,
            direction
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_rows(
            ColumnLayout::coverage(),
            vec![
                Row::from_iter(["vm", "10", "5", "66.667%", "vm.html"]),
                Row::from_iter(["acr", "3", "0", "100.000%", "acr.html"]),
                Row::from_iter(["Network", "20", "20", "50.000%", "network.html"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_indexed_layout_ids() {
        let layout = ColumnLayout::indexed(&[
            ("Module", ColumnKind::Text),
            ("Tested", ColumnKind::Numeric),
            ("Percentage", ColumnKind::Percentage),
        ]);
        let ids: Vec<&str> = layout.columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["th0", "th1", "th2"]);
        assert_eq!(layout.column("th2").unwrap().kind, ColumnKind::Percentage);
    }

    #[test]
    fn test_resolve_by_id_or_title() {
        let layout = ColumnLayout::indexed(&[
            ("Module", ColumnKind::Text),
            ("Percentage", ColumnKind::Percentage),
        ]);
        assert_eq!(layout.resolve("th1").unwrap().title, "Percentage");
        assert_eq!(layout.resolve("percentage").unwrap().id, "th1");
        assert!(layout.resolve("tested").is_err());
    }

    #[test]
    fn test_unknown_column() {
        let mut table = sample();
        assert_eq!(
            table.sort_by("nope", SortDirection::Ascending),
            Err(TableError::UnknownColumn("nope".into()))
        );
    }

    #[test]
    fn test_row_width_rejected() {
        let mut table = Table::new(ColumnLayout::coverage());
        let err = table.push(Row::from_iter(["vm", "1"])).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 1,
                expected: 5,
                found: 2
            }
        );
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_sort_by_text_is_case_insensitive() {
        let mut table = sample();
        table.sort_by("module", SortDirection::Ascending).unwrap();
        assert_eq!(
            table.column_values("module").unwrap(),
            vec!["acr", "Network", "vm"]
        );
    }

    #[test]
    fn test_sort_carries_whole_rows() {
        let mut table = sample();
        table.sort_by("tested", SortDirection::Descending).unwrap();
        assert_eq!(table.rows()[0].cells()[0], "Network");
        assert_eq!(table.rows()[0].cells()[3], "50.000%");
        assert_eq!(table.rows()[2].cells()[0], "acr");
        assert_eq!(table.rows()[2].cells()[4], "acr.html");
    }

    #[test]
    fn test_sort_by_percentage() {
        let mut table = sample();
        table.sort_by("percentage", SortDirection::Ascending).unwrap();
        assert_eq!(
            table.column_values("module").unwrap(),
            vec!["Network", "vm", "acr"]
        );
    }

    #[test]
    fn test_duplicate_keys_keep_prior_order() {
        let mut table = Table::with_rows(
            ColumnLayout::indexed(&[("Name", ColumnKind::Text), ("Count", ColumnKind::Numeric)]),
            vec![
                Row::from_iter(["b", "1"]),
                Row::from_iter(["a", "2"]),
                Row::from_iter(["c", "1"]),
                Row::from_iter(["d", "1"]),
            ],
        )
        .unwrap();
        table.sort_by("th1", SortDirection::Ascending).unwrap();
        assert_eq!(table.column_values("th0").unwrap(), vec!["b", "c", "d", "a"]);
        table.sort_by("th1", SortDirection::Descending).unwrap();
        assert_eq!(table.column_values("th0").unwrap(), vec!["a", "b", "c", "d"]);
    }
}
