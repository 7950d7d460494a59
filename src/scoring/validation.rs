use std::collections::HashSet;

use super::types::UserInputs;
use crate::schema::KpiDefinition;

/// Validate KPI definitions before they are used for scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_definitions(definitions: &[KpiDefinition]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if definitions.is_empty() {
        errors.push("no KPI definitions loaded".to_string());
    }

    for (i, def) in definitions.iter().enumerate() {
        if def.metric.trim().is_empty() {
            errors.push(format!("kpi[{}].metric: must not be empty", i));
        } else if !seen.insert(def.metric.as_str()) {
            errors.push(format!("kpi[{}].metric: '{}' is defined more than once", i, def.metric));
        }

        if def.section.trim().is_empty() {
            errors.push(format!("kpi[{}].section: must not be empty", i));
        }

        if !def.weight.is_finite() || def.weight < 0.0 {
            errors.push(format!(
                "kpi[{}].weight: '{}' must be a non-negative number ({})",
                i, def.weight, def.metric
            ));
        }

        let thresholds = [
            ("low_threshold", def.low_threshold),
            ("moderate_threshold", def.moderate_threshold),
            ("high_threshold", def.high_threshold),
        ];
        for (name, value) in thresholds {
            if let Some(v) = value {
                if !v.is_finite() {
                    errors.push(format!("kpi[{}].{}: must be finite ({})", i, name, def.metric));
                }
            }
        }

        if let Some(max) = def.max_score {
            if !max.is_finite() || max < 0.0 {
                errors.push(format!(
                    "kpi[{}].max_score: '{}' must be a non-negative number ({})",
                    i, max, def.metric
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the values supplied for the given definitions.
///
/// Only entries for defined metrics are checked; missing entries are reported
/// separately by the engine.
pub fn validate_inputs(definitions: &[KpiDefinition], inputs: &UserInputs) -> Result<(), Vec<String>> {
    let errors: Vec<String> = definitions
        .iter()
        .filter_map(|def| {
            let value = *inputs.get(&def.metric)?;
            if !value.is_finite() {
                Some(format!("{}: value must be a finite number", def.metric))
            } else if value < 0.0 {
                Some(format!("{}: value {} must be non-negative", def.metric, value))
            } else {
                None
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
