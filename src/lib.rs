//! cmdcov: sortable command test coverage reports
//!
//! This library turns per-module command coverage counts into tables that can
//! be sorted by any column (console, JSON and HTML output).

pub mod config;
pub mod coverage;
pub mod output;
pub mod reporter;
pub mod table;

use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

/// Granularity the coverage was measured at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    #[default]
    Command,
    Argument,
}

impl CoverageLevel {
    /// Human-readable description used in report titles
    pub fn description(self) -> &'static str {
        match self {
            CoverageLevel::Command => "Command",
            CoverageLevel::Argument => "Command Argument",
        }
    }
}

impl std::fmt::Display for CoverageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageLevel::Command => write!(f, "command"),
            CoverageLevel::Argument => write!(f, "argument"),
        }
    }
}

impl FromStr for CoverageLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "command" => Ok(CoverageLevel::Command),
            "argument" => Ok(CoverageLevel::Argument),
            other => anyhow::bail!("Unknown coverage level: {} (expected command or argument)", other),
        }
    }
}

/// Share of tested commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    /// 0-100
    Value(f64),
    /// No commands to measure
    NotApplicable,
}

impl Percentage {
    pub fn from_counts(tested: usize, untested: usize) -> Self {
        let total = tested + untested;
        if total == 0 {
            Percentage::NotApplicable
        } else {
            Percentage::Value(tested as f64 * 100.0 / total as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Percentage::Value(v) => Some(v),
            Percentage::NotApplicable => None,
        }
    }

    /// Whole-number percentage ("67%") used for the rounded column and bands
    pub fn rounded(self) -> Option<i64> {
        self.value().map(|v| v.round_ties_even() as i64)
    }

    pub fn rounded_label(self) -> String {
        match self.rounded() {
            Some(v) => format!("{}%", v),
            None => "N/A".to_string(),
        }
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Percentage::Value(v) => write!(f, "{:.3}%", v),
            Percentage::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Upper bounds (exclusive) of each color band, in whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorThresholds {
    pub red: i64,
    pub orange: i64,
    pub green: i64,
    pub blue: i64,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            red: 30,
            orange: 60,
            green: 80,
            blue: 99,
        }
    }
}

/// Color band of a coverage percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageColor {
    Red,
    Orange,
    Green,
    Blue,
    Gold,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl CoverageColor {
    pub fn for_percentage(percentage: Percentage, thresholds: &ColorThresholds) -> Self {
        match percentage.rounded() {
            None => CoverageColor::NotApplicable,
            Some(p) if p < thresholds.red => CoverageColor::Red,
            Some(p) if p < thresholds.orange => CoverageColor::Orange,
            Some(p) if p < thresholds.green => CoverageColor::Green,
            Some(p) if p < thresholds.blue => CoverageColor::Blue,
            Some(_) => CoverageColor::Gold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoverageColor::Red => "red",
            CoverageColor::Orange => "orange",
            CoverageColor::Green => "green",
            CoverageColor::Blue => "blue",
            CoverageColor::Gold => "gold",
            CoverageColor::NotApplicable => "N/A",
        }
    }
}

impl std::fmt::Display for CoverageColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage of one module (or the Total row)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCoverage {
    pub module: String,
    pub tested: usize,
    pub untested: usize,
    /// Commands with no test, when the input lists them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub untested_commands: Vec<String>,
}

impl ModuleCoverage {
    pub fn new(module: impl Into<String>, tested: usize, untested: usize) -> Self {
        Self {
            module: module.into(),
            tested,
            untested,
            untested_commands: Vec::new(),
        }
    }

    pub fn percentage(&self) -> Percentage {
        Percentage::from_counts(self.tested, self.untested)
    }

    /// File name of this module's detail page
    pub fn report_page(&self) -> String {
        format!("{}.html", self.module)
    }
}

/// Included modules plus their Total row
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageSummary {
    pub level: CoverageLevel,
    pub modules: Vec<ModuleCoverage>,
    pub total: ModuleCoverage,
}

impl CoverageSummary {
    /// Build a summary; the Total row is recomputed from `modules`
    pub fn new(level: CoverageLevel, modules: Vec<ModuleCoverage>) -> Self {
        let tested = modules.iter().map(|m| m.tested).sum();
        let untested = modules.iter().map(|m| m.untested).sum();
        Self {
            level,
            modules,
            total: ModuleCoverage::new("Total", tested, untested),
        }
    }

    /// Keep only the modules accepted by `keep`, recomputing the total
    pub fn filtered(&self, keep: impl Fn(&ModuleCoverage) -> bool) -> Self {
        Self::new(
            self.level,
            self.modules.iter().filter(|m| keep(m)).cloned().collect(),
        )
    }
}
