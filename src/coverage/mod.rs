//! Coverage input: load per-module counts from JSON files and build tables

mod input;
mod tables;

pub use input::{load_coverage, parse_coverage_json, CoverageInput, ModuleEntry};
pub use tables::{cli_own_row, cli_own_table, index_row, index_table};

use crate::config::build_ignore_set;
use crate::{CoverageLevel, CoverageSummary};
use anyhow::Result;

/// Page names the report directory already uses for its own pages
const RESERVED_PAGE_NAMES: &[&str] = &["index", "index2"];

/// Reject module names that cannot be used as a report page file name
pub fn validate_module_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Empty module name in coverage input");
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        anyhow::bail!("Invalid module name `{}`: must not contain `/`, `\\` or `..`", name);
    }
    if RESERVED_PAGE_NAMES
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
    {
        anyhow::bail!("Invalid module name `{}`: the name is reserved for a report page", name);
    }
    Ok(())
}

/// Apply module exclusions and build the summary for one level
pub fn summarize(
    input: CoverageInput,
    level: Option<CoverageLevel>,
    exclude: &[String],
) -> Result<CoverageSummary> {
    let level = level.or(input.level).unwrap_or_default();
    let ignore_set = build_ignore_set(exclude)?;

    let mut modules = Vec::new();
    for module in input.into_modules() {
        if ignore_set.is_match(&module.module) {
            log::debug!("excluding module {}", module.module);
            continue;
        }
        validate_module_name(&module.module)?;
        modules.push(module);
    }

    let summary = CoverageSummary::new(level, modules);
    log::info!(
        "{} modules, {} tested / {} untested ({})",
        summary.modules.len(),
        summary.total.tested,
        summary.total.untested,
        summary.total.percentage()
    );
    Ok(summary)
}

/// Restrict a summary to the CLI-owned modules
pub fn cli_own_summary(summary: &CoverageSummary, cli_own_modules: &[String]) -> CoverageSummary {
    summary.filtered(|m| cli_own_modules.iter().any(|name| name == &m.module))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CoverageInput {
        parse_coverage_json(
            r#"{
                "level": "argument",
                "modules": {
                    "vm": [8, 2],
                    "util": [1, 0],
                    "network": { "tested": 3, "untested": 1, "untestedCommands": ["network foo"] },
                    "feedback": [0, 5]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_summarize_excludes_modules() {
        let summary = summarize(input(), None, &["util".into(), "feed*".into()]).unwrap();
        let names: Vec<&str> = summary.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(names, vec!["network", "vm"]);
        assert_eq!(summary.total.tested, 11);
        assert_eq!(summary.total.untested, 3);
        assert_eq!(summary.level, CoverageLevel::Argument);
    }

    #[test]
    fn test_level_override() {
        let summary = summarize(input(), Some(CoverageLevel::Command), &[]).unwrap();
        assert_eq!(summary.level, CoverageLevel::Command);
        assert_eq!(summary.modules.len(), 4);
    }

    #[test]
    fn test_cli_own_summary_recomputes_total() {
        let summary = summarize(input(), None, &[]).unwrap();
        let own = cli_own_summary(&summary, &["vm".into(), "storage".into()]);
        assert_eq!(own.modules.len(), 1);
        assert_eq!(own.total.tested, 8);
        assert_eq!(own.total.untested, 2);
    }

    fn summarize_names(names: &[&str]) -> Result<CoverageSummary> {
        let mut input = CoverageInput::default();
        for name in names {
            input
                .modules
                .insert(name.to_string(), ModuleEntry::Counts(1, 1));
        }
        summarize(input, None, &[])
    }

    #[test]
    fn test_reserved_page_names_rejected() {
        for name in ["index", "index2", "Index"] {
            let err = summarize_names(&["vm", name]).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{}", name);
        }
        assert!(summarize_names(&["vm", "index3", "indexer"]).is_ok());
    }

    #[test]
    fn test_path_like_names_rejected() {
        for name in ["../escaped", "a/b", "a\\b", "..", " "] {
            assert!(summarize_names(&[name]).is_err(), "{}", name);
        }
    }

    #[test]
    fn test_excluded_bad_name_is_ignored() {
        let mut input = CoverageInput::default();
        input.modules.insert("index".into(), ModuleEntry::Counts(1, 0));
        input.modules.insert("vm".into(), ModuleEntry::Counts(1, 0));
        let summary = summarize(input, None, &["index".into()]).unwrap();
        assert_eq!(summary.modules.len(), 1);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        assert!(summarize(input(), None, &["[".into()]).is_err());
    }
}
