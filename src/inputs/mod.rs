//! Collecting user inputs: from a values file or interactively.

pub mod prompt;

pub use prompt::{prompt_inputs, prompt_inputs_from, prompt_yes_no};

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::scoring::UserInputs;
use crate::table::SourceFormat;

/// Parse a metric -> value map.
///
/// Example YAML:
/// ```yaml
/// Churn: 6
/// NPS: 40
/// ```
pub fn parse_inputs(content: &str, format: SourceFormat) -> Result<UserInputs> {
    let values: BTreeMap<String, f64> = match format {
        SourceFormat::Json => {
            serde_json::from_str(content).context("Failed to parse inputs: invalid JSON")?
        }
        SourceFormat::Yaml => serde_saphyr::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse inputs: invalid YAML: {}", e))?,
    };

    Ok(values
        .into_iter()
        .map(|(metric, value)| (metric.trim().to_string(), value))
        .collect())
}

/// Load user inputs from a YAML or JSON file.
pub fn load_inputs(path: &Path) -> Result<UserInputs> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read inputs file at {}", path.display()))?;

    let inputs = parse_inputs(&content, SourceFormat::from_path(path))
        .with_context(|| format!("Invalid inputs in {}", path.display()))?;

    log::debug!("Loaded {} input values from {}", inputs.len(), path.display());
    Ok(inputs)
}
