use std::collections::HashMap;

use super::schema::Config;
use crate::schema::columns::normalize;
use crate::schema::Field;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref sheet) = config.sheet {
        if sheet.trim().is_empty() {
            errors.push("sheet: must not be empty".to_string());
        }
    }

    if let Some(ref table) = config.table {
        if table.as_os_str().is_empty() {
            errors.push("table: must not be empty".to_string());
        }
    }

    if let Some(ref columns) = config.columns {
        // A name claimed by two fields would make header resolution ambiguous
        let mut claimed: HashMap<String, Field> = HashMap::new();
        for (field, names) in columns.entries() {
            let Some(names) = names else {
                continue;
            };
            for (i, name) in names.iter().enumerate() {
                let key = normalize(name);
                if key.is_empty() {
                    errors.push(format!("columns.{}[{}]: must not be blank", yaml_key(field), i));
                    continue;
                }
                let conflict = claimed.get(&key).copied().filter(|other| *other != field);
                if let Some(other) = conflict {
                    errors.push(format!(
                        "columns.{}[{}]: '{}' is also listed under columns.{}",
                        yaml_key(field),
                        i,
                        name,
                        yaml_key(other)
                    ));
                } else {
                    claimed.insert(key, field);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn yaml_key(field: Field) -> &'static str {
    match field {
        Field::Metric => "metric",
        Field::Section => "section",
        Field::Low => "low",
        Field::Moderate => "moderate",
        Field::High => "high",
        Field::Weight => "weight",
        Field::MaxScore => "max_score",
    }
}
