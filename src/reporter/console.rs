//! Console reporter with colored output

use super::modules_in_table_order;
use crate::table::{SortDirection, TableSorter};
use crate::{ColorThresholds, CoverageColor, CoverageSummary, ModuleCoverage};
use colored::Colorize;
use std::fmt::Write;

const HEADERS: [&str; 4] = ["Module", "Tested", "Untested", "Percentage"];
const DEFAULT_TITLE: &str = "Command Test Coverage";

/// Reporter for terminal output
pub struct ConsoleReporter {
    title: String,
    /// Whether to use colors
    use_colors: bool,
    /// List untested commands under the table
    verbose: bool,
    thresholds: ColorThresholds,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            use_colors: true,
            verbose: false,
            thresholds: ColorThresholds::default(),
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_thresholds(mut self, thresholds: ColorThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Print the sorted module table and the total row
    pub fn report(&self, summary: &CoverageSummary, sorter: &TableSorter) {
        print!("{}", self.render(summary, sorter));
    }

    /// Print only the total line
    pub fn report_quiet(&self, summary: &CoverageSummary) {
        println!("{}", self.render_quiet(summary));
    }

    pub fn render_quiet(&self, summary: &CoverageSummary) -> String {
        let total = &summary.total;
        format!(
            "Total: {} tested, {} untested, {}",
            total.tested,
            total.untested,
            self.paint_percentage(total, &total.percentage().to_string())
        )
    }

    pub fn render(&self, summary: &CoverageSummary, sorter: &TableSorter) -> String {
        let modules = modules_in_table_order(summary, sorter.table());

        let module_width = modules
            .iter()
            .map(|m| m.module.chars().count())
            .chain([HEADERS[0].len(), summary.total.module.len()])
            .max()
            .unwrap_or(HEADERS[0].len());
        let widths = [module_width, 8, 10, 12];

        let mut out = String::new();
        let _ = writeln!(
            out,
            "\n{} ({} coverage)\n",
            self.bold(&self.title),
            summary.level.description()
        );

        let header: Vec<String> = HEADERS
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (title, width))| {
                let label = format!("{}{}", title, sort_marker(sorter, title));
                pad(&label, width, i == 0)
            })
            .collect();
        let _ = writeln!(out, "   {}", self.bold(&header.join("  ")));
        let rule_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        let _ = writeln!(out, "   {}", "─".repeat(rule_len));

        for m in &modules {
            let _ = writeln!(out, "   {}", self.row(m, &widths));
        }

        let _ = writeln!(out, "   {}", "─".repeat(rule_len));
        let _ = writeln!(out, "   {}", self.bold(&self.row(&summary.total, &widths)));

        if self.verbose {
            for m in modules.iter().filter(|m| !m.untested_commands.is_empty()) {
                let _ = writeln!(out, "\n   {} {}:", self.bold("Untested in"), m.module);
                for command in &m.untested_commands {
                    let _ = writeln!(out, "     {} {}", self.dim("→"), command);
                }
            }
        }
        out.push('\n');
        out
    }

    fn row(&self, m: &ModuleCoverage, widths: &[usize; 4]) -> String {
        let percentage = pad(&m.percentage().to_string(), widths[3], false);
        [
            pad(&m.module, widths[0], true),
            pad(&m.tested.to_string(), widths[1], false),
            pad(&m.untested.to_string(), widths[2], false),
            self.paint_percentage(m, &percentage),
        ]
        .join("  ")
    }

    fn bold(&self, s: &str) -> String {
        if self.use_colors {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn dim(&self, s: &str) -> String {
        if self.use_colors {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_percentage(&self, m: &ModuleCoverage, text: &str) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        match CoverageColor::for_percentage(m.percentage(), &self.thresholds) {
            CoverageColor::Red => text.red().to_string(),
            CoverageColor::Orange => text.truecolor(255, 165, 0).to_string(),
            CoverageColor::Green => text.green().to_string(),
            CoverageColor::Blue => text.blue().to_string(),
            CoverageColor::Gold => text.yellow().bold().to_string(),
            CoverageColor::NotApplicable => text.dimmed().to_string(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Arrow for the header whose column was sorted last; matched by title so
/// positional layouts (`th0`, ...) get one too
fn sort_marker(sorter: &TableSorter, title: &str) -> &'static str {
    let Some((id, direction)) = sorter.last_sorted() else {
        return "";
    };
    match sorter.table().layout().column(id) {
        Ok(column) if column.title == title => match direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => "",
    }
}

fn pad(s: &str, width: usize, left: bool) -> String {
    if left {
        format!("{:<width$}", s, width = width)
    } else {
        format!("{:>width$}", s, width = width)
    }
}
