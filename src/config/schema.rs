use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::schema::{ColumnSynonyms, Field};
use crate::table::DEFAULT_SHEET;

/// Application configuration.
///
/// Example YAML:
/// ```yaml
/// table: ./health.yaml
/// sheet: Input
/// columns:
///   metric: ["Indicator"]
///   weight: ["Importance"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Workbook export holding the KPI sheet
    #[serde(default)]
    pub table: Option<PathBuf>,

    /// Sheet to read (default: "Input")
    #[serde(default)]
    pub sheet: Option<String>,

    /// Extra header names accepted per field, on top of the built-in ones
    #[serde(default)]
    pub columns: Option<ColumnsConfig>,
}

impl Config {
    pub fn sheet_name(&self) -> &str {
        self.sheet.as_deref().unwrap_or(DEFAULT_SHEET)
    }

    /// Built-in synonyms merged with the configured extras.
    pub fn synonyms(&self) -> ColumnSynonyms {
        let mut synonyms = ColumnSynonyms::default();
        if let Some(ref columns) = self.columns {
            for (field, extra) in columns.entries() {
                if let Some(names) = extra {
                    synonyms.extend(field, names);
                }
            }
        }
        synonyms
    }
}

/// Extra column names per KPI field.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub metric: Option<Vec<String>>,
    #[serde(default)]
    pub section: Option<Vec<String>>,
    #[serde(default)]
    pub low: Option<Vec<String>>,
    #[serde(default)]
    pub moderate: Option<Vec<String>>,
    #[serde(default)]
    pub high: Option<Vec<String>>,
    #[serde(default)]
    pub weight: Option<Vec<String>>,
    #[serde(default)]
    pub max_score: Option<Vec<String>>,
}

impl ColumnsConfig {
    /// Each field paired with its configured names.
    pub fn entries(&self) -> [(Field, Option<&Vec<String>>); 7] {
        [
            (Field::Metric, self.metric.as_ref()),
            (Field::Section, self.section.as_ref()),
            (Field::Low, self.low.as_ref()),
            (Field::Moderate, self.moderate.as_ref()),
            (Field::High, self.high.as_ref()),
            (Field::Weight, self.weight.as_ref()),
            (Field::MaxScore, self.max_score.as_ref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sheet_name(), "Input");
        assert!(config.table.is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            table: Some(PathBuf::from("kpis.yaml")),
            sheet: Some("Scores".to_string()),
            columns: Some(ColumnsConfig {
                weight: Some(vec!["Importance".to_string()]),
                ..Default::default()
            }),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
table: ./health.yaml
sheet: Input
columns:
  metric: ["Indicator"]
  weight: ["Importance", "Priority"]
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.table, Some(PathBuf::from("./health.yaml")));
        let columns = config.columns.as_ref().unwrap();
        assert_eq!(columns.weight.as_ref().unwrap().len(), 2);
        assert!(columns.low.is_none());

        let synonyms = config.synonyms();
        assert_eq!(synonyms.field_for("Priority"), Some(Field::Weight));
        assert_eq!(synonyms.field_for("indicator"), Some(Field::Metric));
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_column_field_rejected() {
        let yaml = r#"
columns:
  colour: ["Red"]
"#;
        let result: Result<Config, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
