//! Click-to-sort controller
//!
//! [`TableSorter`] owns a [`Table`] and the per-column direction state. Each
//! click sorts by the column in its current direction, then flips that
//! column's direction for the next click.

use super::{Table, TableError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Turn an ascending ordering into one for this direction
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// CSS class used on rendered headers
    pub fn css_class(self) -> &'static str {
        match self {
            SortDirection::Ascending => "as",
            SortDirection::Descending => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "as" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(TableError::InvalidSortSpec(s.to_string())),
        }
    }
}

/// `column[:asc|desc]`, as given on the command line or in config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new("module", SortDirection::Ascending)
    }
}

impl FromStr for SortSpec {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (column, direction) = match s.split_once(':') {
            Some((column, dir)) => (
                column,
                dir.parse()
                    .map_err(|_| TableError::InvalidSortSpec(s.to_string()))?,
            ),
            None => (s, SortDirection::Ascending),
        };
        if column.is_empty() {
            return Err(TableError::InvalidSortSpec(s.to_string()));
        }
        Ok(SortSpec::new(column, direction))
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.column, self.direction)
    }
}

/// Per-column direction the next click applies. Unseen columns start ascending.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    directions: HashMap<String, SortDirection>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self, column: &str) -> SortDirection {
        self.directions.get(column).copied().unwrap_or_default()
    }

    pub fn set(&mut self, column: &str, direction: SortDirection) {
        self.directions.insert(column.to_string(), direction);
    }
}

/// Table plus its click state
#[derive(Debug, Clone)]
pub struct TableSorter {
    table: Table,
    state: SortState,
    last_sorted: Option<(String, SortDirection)>,
}

impl TableSorter {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            state: SortState::new(),
            last_sorted: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Direction the next click on `column` will apply
    pub fn direction(&self, column: &str) -> SortDirection {
        self.state.direction(column)
    }

    /// Column and direction of the last applied sort
    pub fn last_sorted(&self) -> Option<(&str, SortDirection)> {
        self.last_sorted
            .as_ref()
            .map(|(column, direction)| (column.as_str(), *direction))
    }

    /// Sort by `column` in its current direction, then flip it. Returns the applied direction.
    pub fn click(&mut self, column: &str) -> Result<SortDirection, TableError> {
        let direction = self.state.direction(column);
        self.sort_by(column, direction)?;
        Ok(direction)
    }

    /// Sort by `column` in an explicit direction; the next click goes the other way.
    pub fn sort_by(&mut self, column: &str, direction: SortDirection) -> Result<(), TableError> {
        self.table.sort_by(column, direction)?;
        self.state.set(column, direction.toggle());
        self.last_sorted = Some((column.to_string(), direction));
        Ok(())
    }

    /// Apply a sort spec; the column may be named by id or title
    pub fn apply(&mut self, spec: &SortSpec) -> Result<(), TableError> {
        let id = self.table.layout().resolve(&spec.column)?.id.clone();
        self.sort_by(&id, spec.direction)
    }
}
