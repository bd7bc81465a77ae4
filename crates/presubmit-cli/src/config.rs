//! Loading of batch input and policy files.

use std::path::Path;

use anyhow::{Context, Result};
use presubmit_core::{ChangeRecord, PresubmitPolicy};

/// Read batches from a JSON file: an array of arrays of change records.
pub fn load_batches(path: &Path) -> Result<Vec<Vec<ChangeRecord>>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batches file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse batches file {}", path.display()))
}

/// Read a TOML policy file, or fall back to the default policy.
pub fn load_policy(path: Option<&Path>) -> Result<PresubmitPolicy> {
    let Some(path) = path else {
        return Ok(PresubmitPolicy::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse policy file {}", path.display()))
}

/// Split a comma-separated test list, dropping blanks.
pub fn parse_test_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
