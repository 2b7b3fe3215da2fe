//! Config schema and deserialization

use crate::table::SortSpec;
use crate::{ColorThresholds, CoverageLevel};
use serde::Deserialize;

/// Root config structure for .cmdcovrc.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Report title shown on HTML pages
    #[serde(default)]
    pub title: Option<String>,

    /// Coverage level when the input does not say
    #[serde(default)]
    pub level: Option<CoverageLevel>,

    /// Minimum total coverage percentage (exit 1 if below)
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Color band boundaries
    #[serde(default)]
    pub color_thresholds: Option<ColorThresholds>,

    /// Modules shown on the CLI-owned page
    #[serde(default)]
    pub cli_own_modules: Vec<String>,

    /// Glob patterns of module names to leave out
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Initial sort, e.g. "percentage:desc"
    #[serde(default)]
    pub default_sort: Option<String>,

    /// Root directory for HTML reports
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_threshold: Option<f64>,
        cli_level: Option<CoverageLevel>,
        cli_sort: Option<&str>,
    ) -> Self {
        if cli_threshold.is_some() {
            self.threshold = cli_threshold;
        }
        if cli_level.is_some() {
            self.level = cli_level;
        }
        if let Some(sort) = cli_sort {
            self.default_sort = Some(sort.to_string());
        }
        self
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.title.is_none() {
            self.title = base.title;
        }
        if self.level.is_none() {
            self.level = base.level;
        }
        if self.threshold.is_none() {
            self.threshold = base.threshold;
        }
        if self.color_thresholds.is_none() {
            self.color_thresholds = base.color_thresholds;
        }
        if self.cli_own_modules.is_empty() {
            self.cli_own_modules = base.cli_own_modules;
        }
        if self.default_sort.is_none() {
            self.default_sort = base.default_sort;
        }
        if self.output_dir.is_none() {
            self.output_dir = base.output_dir;
        }

        let mut all_excludes = base.exclude;
        all_excludes.append(&mut self.exclude);
        self.exclude = all_excludes;
    }

    pub fn color_thresholds(&self) -> ColorThresholds {
        self.color_thresholds.unwrap_or_default()
    }

    /// Parsed default sort (module ascending when unset)
    pub fn sort_spec(&self) -> anyhow::Result<SortSpec> {
        match self.default_sort.as_deref() {
            Some(spec) => Ok(spec.parse::<SortSpec>()?),
            None => Ok(SortSpec::default()),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Command Test Coverage")
    }
}
