//! Configuration loading for cmdcov

mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".cmdcovrc.json";

/// Modules excluded by the config that `cmdcov init` writes
pub const DEFAULT_EXCLUDE_MODULES: &[&str] = &["extension", "feedback", "util"];

/// Modules listed on the CLI-owned page by the config that `cmdcov init` writes
pub const DEFAULT_CLI_OWN_MODULES: &[&str] = &[
    "cloud",
    "container",
    "databoxedge",
    "keyvault",
    "monitor",
    "network",
    "privatedns",
    "profile",
    "resource",
    "role",
    "storage",
    "vm",
];

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference relative to the referencing config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let extends_path = config_dir.join(extends);

    // Ensure it has .json extension
    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Search for .cmdcovrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Build a GlobSet from module name patterns
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid exclude pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Default config file contents written by `cmdcov init`
pub fn default_config_json(threshold: Option<f64>) -> Result<String> {
    let value = serde_json::json!({
        "threshold": threshold.unwrap_or(0.0),
        "colorThresholds": { "red": 30, "orange": 60, "green": 80, "blue": 99 },
        "cliOwnModules": DEFAULT_CLI_OWN_MODULES,
        "exclude": DEFAULT_EXCLUDE_MODULES,
        "defaultSort": "module:asc",
    });
    let mut json = serde_json::to_string_pretty(&value)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{SortDirection, SortSpec};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_no_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let config = load_config(&nested, None).unwrap();
        assert!(config.threshold.is_none());
        assert_eq!(config.sort_spec().unwrap(), SortSpec::default());
    }

    #[test]
    fn test_config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "threshold": 42.5, "defaultSort": "percentage:desc" }"#,
        )
        .unwrap();
        let nested = dir.path().join("reports");
        fs::create_dir(&nested).unwrap();

        let config = load_config(&nested, None).unwrap();
        assert_eq!(config.threshold, Some(42.5));
        assert_eq!(
            config.sort_spec().unwrap(),
            SortSpec::new("percentage", SortDirection::Descending)
        );
    }

    #[test]
    fn test_custom_path_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "threshold": 70,
                "colorThresholds": {{ "red": 10 }},
                "cliOwnModules": ["vm"],
                "exclude": ["util"]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(CONFIG_FILENAME);
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base",
                "threshold": 80,
                "exclude": ["feedback"]
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap();

        assert_eq!(config.threshold, Some(80.0));
        assert_eq!(config.cli_own_modules, vec!["vm".to_string()]);
        assert_eq!(config.exclude, vec!["util".to_string(), "feedback".to_string()]);
        let thresholds = config.color_thresholds();
        assert_eq!(thresholds.red, 10);
        assert_eq!(thresholds.orange, 60);
    }

    #[test]
    fn test_circular_extends() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();
        let err = load_config(dir.path(), Some(Path::new("a.json"))).unwrap_err();
        assert!(err.to_string().contains("Circular extends"));
    }

    #[test]
    fn test_merge_with_cli() {
        let config: Config =
            serde_json::from_str(r#"{ "threshold": 50, "level": "argument" }"#).unwrap();
        let config = config.merge_with_cli(Some(75.0), None, Some("tested:desc"));
        assert_eq!(config.threshold, Some(75.0));
        assert_eq!(config.level, Some(crate::CoverageLevel::Argument));
        assert_eq!(config.default_sort.as_deref(), Some("tested:desc"));
    }

    #[test]
    fn test_bad_default_sort() {
        let config: Config = serde_json::from_str(r#"{ "defaultSort": "module:up" }"#).unwrap();
        assert!(config.sort_spec().is_err());
    }

    #[test]
    fn test_default_config_json_roundtrips() {
        let json = default_config_json(Some(60.0)).unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.threshold, Some(60.0));
        assert!(config.exclude.contains(&"util".to_string()));
        assert!(config.cli_own_modules.contains(&"storage".to_string()));
    }

    #[test]
    fn test_exclude_globs() {
        let set = build_ignore_set(&["azext_*".to_string(), "util".to_string()]).unwrap();
        assert!(set.is_match("azext_aks_preview"));
        assert!(set.is_match("util"));
        assert!(!set.is_match("vm"));
    }
}
