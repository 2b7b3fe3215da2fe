//! Coverage summary JSON format
//!
//! ```json
//! {
//!   "level": "command",
//!   "modules": {
//!     "vm": { "tested": 120, "untested": 30, "untestedCommands": ["vm foo"] },
//!     "network": [200, 10]
//!   }
//! }
//! ```

use crate::config::CONFIG_FILENAME;
use crate::{CoverageLevel, ModuleCoverage};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One module's counts: detailed object or `[tested, untested]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModuleEntry {
    #[serde(rename_all = "camelCase")]
    Detailed {
        tested: usize,
        untested: usize,
        #[serde(default)]
        untested_commands: Vec<String>,
    },
    Counts(usize, usize),
}

/// Parsed coverage document(s), modules keyed by name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoverageInput {
    #[serde(default)]
    pub level: Option<CoverageLevel>,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
}

impl CoverageInput {
    /// Fold another document into this one. Counts are summed and untested lists concatenated.
    pub fn merge(&mut self, other: CoverageInput) {
        if self.level.is_none() {
            self.level = other.level;
        }
        for (name, entry) in other.modules {
            match self.modules.remove(&name) {
                Some(existing) => {
                    let merged = merge_entries(existing, entry);
                    self.modules.insert(name, merged);
                }
                None => {
                    self.modules.insert(name, entry);
                }
            }
        }
    }

    /// Modules in name order
    pub fn into_modules(self) -> Vec<ModuleCoverage> {
        self.modules
            .into_iter()
            .map(|(name, entry)| match entry {
                ModuleEntry::Detailed {
                    tested,
                    untested,
                    untested_commands,
                } => ModuleCoverage {
                    module: name,
                    tested,
                    untested,
                    untested_commands,
                },
                ModuleEntry::Counts(tested, untested) => ModuleCoverage::new(name, tested, untested),
            })
            .collect()
    }
}

fn merge_entries(a: ModuleEntry, b: ModuleEntry) -> ModuleEntry {
    let (t1, u1, mut c1) = entry_parts(a);
    let (t2, u2, mut c2) = entry_parts(b);
    c1.append(&mut c2);
    ModuleEntry::Detailed {
        tested: t1 + t2,
        untested: u1 + u2,
        untested_commands: c1,
    }
}

fn entry_parts(entry: ModuleEntry) -> (usize, usize, Vec<String>) {
    match entry {
        ModuleEntry::Detailed {
            tested,
            untested,
            untested_commands,
        } => (tested, untested, untested_commands),
        ModuleEntry::Counts(tested, untested) => (tested, untested, Vec::new()),
    }
}

/// Parse one coverage document
pub fn parse_coverage_json(content: &str) -> Result<CoverageInput> {
    serde_json::from_str(content).context("Invalid coverage JSON")
}

/// Load a coverage file, or every `*.json` file under a directory (merged in path order)
pub fn load_coverage(path: &Path) -> Result<CoverageInput> {
    if path.is_dir() {
        let files = collect_json_files(path);
        if files.is_empty() {
            anyhow::bail!("No coverage JSON files found in {}", path.display());
        }
        let mut input = CoverageInput::default();
        for file in files {
            log::debug!("reading coverage from {}", file.display());
            input.merge(load_file(&file)?);
        }
        Ok(input)
    } else {
        load_file(path)
    }
}

fn load_file(path: &Path) -> Result<CoverageInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read coverage file: {}", path.display()))?;
    parse_coverage_json(&content).with_context(|| format!("In {}", path.display()))
}

fn collect_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| p.file_name() != Some(OsStr::new(CONFIG_FILENAME)))
        .collect();
    files.sort();
    files
}
