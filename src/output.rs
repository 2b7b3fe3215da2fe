//! Report output directory: `<root>/cmd_coverage/<level>/<timestamp>/`

use crate::coverage::validate_module_name;
use crate::reporter::HtmlReporter;
use crate::table::TableSorter;
use crate::{CoverageLevel, CoverageSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_DIRNAME: &str = "cmd_coverage";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub const INDEX_PAGE: &str = "index.html";
pub const CLI_OWN_PAGE: &str = "index2.html";

/// Directory one report run is written to
pub fn report_dir(root: &Path, level: CoverageLevel, date: DateTime<Local>) -> PathBuf {
    root.join(REPORT_DIRNAME)
        .join(level.to_string())
        .join(date.format(TIMESTAMP_FORMAT).to_string())
}

/// Rendered pages of one report run
#[derive(Debug, Clone, Default)]
pub struct HtmlReport {
    pub index: String,
    /// CLI-owned modules page, when requested
    pub cli_own: Option<String>,
    /// `(file name, html)` for every module detail page
    pub modules: Vec<(String, String)>,
}

impl HtmlReport {
    /// Render the index page, the optional CLI-owned page and one page per module
    pub fn render(
        reporter: &HtmlReporter,
        summary: &CoverageSummary,
        sorter: &TableSorter,
        cli_own: Option<(&CoverageSummary, &TableSorter)>,
    ) -> Result<Self> {
        let mut modules = Vec::with_capacity(summary.modules.len());
        for module in &summary.modules {
            validate_module_name(&module.module)?;
            let page = reporter
                .module_page(module, summary.level)
                .with_context(|| format!("Failed to render page for module {}", module.module))?;
            modules.push((module.report_page(), page));
        }

        Ok(Self {
            index: reporter.index_page(summary, sorter),
            cli_own: cli_own.map(|(own, own_sorter)| reporter.cli_own_page(own, own_sorter)),
            modules,
        })
    }

    /// Number of files `write_report` creates
    pub fn page_count(&self) -> usize {
        1 + usize::from(self.cli_own.is_some()) + self.modules.len()
    }
}

/// Write every page into `dir` (created if needed); returns the index page path
pub fn write_report(dir: &Path, report: &HtmlReport) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

    let index = dir.join(INDEX_PAGE);
    write_page(&index, &report.index)?;
    if let Some(cli_own) = &report.cli_own {
        write_page(&dir.join(CLI_OWN_PAGE), cli_own)?;
    }
    for (name, html) in &report.modules {
        write_page(&dir.join(name), html)?;
    }

    log::info!("wrote {} pages to {}", report.page_count(), dir.display());
    Ok(index)
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}
