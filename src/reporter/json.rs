//! JSON reporter for machine-readable output

use super::modules_in_table_order;
use crate::table::TableSorter;
use crate::{ColorThresholds, CoverageColor, CoverageLevel, CoverageSummary, ModuleCoverage, Percentage};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
    thresholds: ColorThresholds,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonModule<'a> {
    module: &'a str,
    tested: usize,
    untested: usize,
    percentage: Percentage,
    color: CoverageColor,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    untested_commands: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    level: CoverageLevel,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sorted_by: Option<String>,
    modules: Vec<JsonModule<'a>>,
    total: JsonModule<'a>,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self {
            pretty: false,
            thresholds: ColorThresholds::default(),
        }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ColorThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Report the summary with modules in the sorter's row order
    pub fn report(&self, summary: &CoverageSummary, sorter: &TableSorter) -> String {
        let output = JsonOutput {
            level: summary.level,
            description: summary.level.description(),
            sorted_by: sorter
                .last_sorted()
                .map(|(column, direction)| format!("{}:{}", column, direction)),
            modules: modules_in_table_order(summary, sorter.table())
                .into_iter()
                .map(|m| self.module(m))
                .collect(),
            total: self.module(&summary.total),
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }

    fn module<'a>(&self, m: &'a ModuleCoverage) -> JsonModule<'a> {
        let percentage = m.percentage();
        JsonModule {
            module: &m.module,
            tested: m.tested,
            untested: m.untested,
            percentage,
            color: CoverageColor::for_percentage(percentage, &self.thresholds),
            untested_commands: &m.untested_commands,
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
