//! Workbook collaborator.
//!
//! Decodes JSON or YAML exports of a spreadsheet and hands the selected sheet
//! to the schema loader as a [`RawTable`], rows in original top-to-bottom
//! order with the original header text untouched.

mod cell;

pub use cell::Cell;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::TableError;

/// Sheet read when none is configured.
pub const DEFAULT_SHEET: &str = "Input";

/// One spreadsheet row: cells in column order.
pub type RawRow = Vec<Cell>;

/// A sheet as a plain grid of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serialized workbook export.
///
/// Either a map of sheet names to rows, or a bare list of rows standing in
/// for a single-sheet workbook.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkbookFile {
    Sheets { sheets: BTreeMap<String, Vec<RawRow>> },
    Rows(Vec<RawRow>),
}

/// Serialization format of a workbook or inputs file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }
}

/// Decode a workbook export and select `sheet`.
///
/// Sheet names match exactly first, then case-insensitively on trimmed names.
/// A bare row list has no sheet names and is returned as-is.
pub fn parse_workbook(
    content: &str,
    format: SourceFormat,
    sheet: &str,
) -> Result<RawTable, TableError> {
    let workbook: WorkbookFile = match format {
        SourceFormat::Json => serde_json::from_str(content)?,
        SourceFormat::Yaml => {
            serde_saphyr::from_str(content).map_err(|e| TableError::Yaml(e.to_string()))?
        }
    };

    match workbook {
        WorkbookFile::Rows(rows) => {
            log::debug!("workbook has no sheet names, using its {} rows as '{}'", rows.len(), sheet);
            Ok(RawTable::new(rows))
        }
        WorkbookFile::Sheets { mut sheets } => {
            if let Some(rows) = sheets.remove(sheet) {
                return Ok(RawTable::new(rows));
            }
            let wanted = sheet.trim();
            let key = sheets
                .keys()
                .find(|name| name.trim().eq_ignore_ascii_case(wanted))
                .cloned();
            match key.and_then(|k| sheets.remove(&k)) {
                Some(rows) => Ok(RawTable::new(rows)),
                None => Err(TableError::SheetNotFound(sheet.to_string())),
            }
        }
    }
}

/// Read a workbook export from disk and select `sheet`.
pub fn load_table(path: &Path, sheet: &str) -> Result<RawTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workbook at {}", path.display()))?;

    let table = parse_workbook(&content, SourceFormat::from_path(path), sheet)
        .with_context(|| format!("Failed to load sheet '{}' from {}", sheet, path.display()))?;

    log::debug!("Loaded {} rows from {} [{}]", table.len(), path.display(), sheet);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_sheets() {
        let json = r#"{"sheets": {"Input": [["KPIs", "Low Risk"], ["Churn", 5]], "Notes": []}}"#;
        let table = parse_workbook(json, SourceFormat::Json, "Input").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][1], Cell::Number(5.0));
    }

    #[test]
    fn test_parse_sheet_name_case_insensitive() {
        let json = r#"{"sheets": {" input ": [["KPIs"]]}}"#;
        let table = parse_workbook(json, SourceFormat::Json, "Input").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_missing_sheet() {
        let json = r#"{"sheets": {"Summary": []}}"#;
        let err = parse_workbook(json, SourceFormat::Json, "Input").unwrap_err();
        assert!(matches!(err, TableError::SheetNotFound(ref s) if s == "Input"));
    }

    #[test]
    fn test_parse_bare_rows() {
        let json = r#"[["KPIs", "Low Risk"], [null, null]]"#;
        let table = parse_workbook(json, SourceFormat::Json, "Input").unwrap();
        assert_eq!(table.rows[1], vec![Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn test_parse_yaml_sheets() {
        let yaml = r#"
sheets:
  Input:
    - ["KPIs", "Low Risk", "Moderate Risk"]
    - ["Churn", 5, 2]
"#;
        let table = parse_workbook(yaml, SourceFormat::Yaml, "Input").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("KPIs".to_string()));
        assert_eq!(table.rows[1][2], Cell::Number(2.0));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a.yaml")), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("a")), SourceFormat::Yaml);
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"sheets": {{"Input": [["KPIs"], ["Churn"]]}}}}"#).unwrap();
        let table = load_table(file.path(), "Input").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_load_table_missing_file() {
        let result = load_table(Path::new("/nonexistent/workbook.json"), "Input");
        assert!(result.is_err());
    }
}
