use std::collections::HashMap;

use super::columns::{resolve_columns, ColumnMap, ColumnSynonyms};
use super::types::{KpiDefinition, DEFAULT_WEIGHT};
use crate::error::ConfigError;
use crate::table::{Cell, RawTable};

/// Section assigned to KPI rows that appear before any section header.
pub const DEFAULT_SECTION: &str = "General";

/// Load KPI definitions using the built-in column synonyms.
pub fn load(table: &RawTable) -> Result<Vec<KpiDefinition>, ConfigError> {
    load_with(table, &ColumnSynonyms::default())
}

/// Load KPI definitions from a raw sheet.
///
/// Row numbers in errors and warnings are 1-based sheet rows.
pub fn load_with(
    table: &RawTable,
    synonyms: &ColumnSynonyms,
) -> Result<Vec<KpiDefinition>, ConfigError> {
    let (header_idx, columns) = locate_header(table, synonyms)?;
    log::debug!("header at row {}: {:?}", header_idx + 1, columns);

    let mut current_section: Option<String> = None;
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut definitions = Vec::new();

    for (idx, cells) in table.rows.iter().enumerate().skip(header_idx + 1) {
        let row = idx + 1;
        if cells.iter().all(Cell::is_blank) {
            continue;
        }

        if cells.iter().any(|cell| synonyms.is_header_marker(cell)) {
            log::debug!("row {}: repeated column header, skipped", row);
            continue;
        }

        let parsed = ParsedRow::parse(cells, &columns, row);

        if parsed.is_section_header() {
            log::debug!("row {}: section '{}'", row, parsed.metric.as_deref().unwrap_or_default());
            current_section = parsed.metric;
            continue;
        }

        if parsed.section.is_some() {
            current_section = parsed.section;
        }

        let Some(metric) = parsed.metric else {
            log::warn!("row {}: no metric name, row skipped", row);
            continue;
        };

        let (Some(low), Some(moderate)) = (parsed.low, parsed.moderate) else {
            log::warn!(
                "row {}: '{}' is missing its low or moderate risk threshold, row skipped",
                row,
                metric
            );
            continue;
        };

        if moderate > low {
            log::warn!(
                "row {}: '{}' has moderate threshold {} above low threshold {}, the moderate tier can never match",
                row,
                metric,
                moderate,
                low
            );
        }

        if let Some(&first_row) = first_seen.get(&metric) {
            return Err(ConfigError::DuplicateMetric {
                metric,
                first_row,
                second_row: row,
            });
        }
        first_seen.insert(metric.clone(), row);

        let section = current_section
            .clone()
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());

        definitions.push(KpiDefinition {
            metric,
            section,
            low_threshold: Some(low),
            moderate_threshold: Some(moderate),
            high_threshold: parsed.high,
            weight: parsed.weight.unwrap_or(DEFAULT_WEIGHT),
            max_score: parsed.max_score,
        });
    }

    if definitions.is_empty() {
        return Err(ConfigError::NoKpis);
    }

    log::debug!("loaded {} KPI definitions", definitions.len());
    Ok(definitions)
}

/// Find the header row and resolve its columns.
///
/// The header is the first row holding a literal threshold column name such
/// as "Low Risk". Failing that, row 0 is accepted only if its names resolve
/// every required field; a title row never passes for a header.
fn locate_header(
    table: &RawTable,
    synonyms: &ColumnSynonyms,
) -> Result<(usize, ColumnMap), ConfigError> {
    let marked = table
        .rows
        .iter()
        .position(|row| row.iter().any(|cell| synonyms.is_header_marker(cell)));

    if let Some(idx) = marked {
        let columns = resolve_columns(&table.rows[idx], idx + 1, synonyms)?;
        return Ok((idx, columns));
    }

    let first = table.rows.first().ok_or(ConfigError::NoHeaderRow)?;
    match resolve_columns(first, 1, synonyms) {
        Ok(columns) => {
            log::warn!("no 'Low Risk' style header found, using row 1 as the header");
            Ok((0, columns))
        }
        Err(e) => {
            log::debug!("row 1 is not usable as a header: {}", e);
            Err(ConfigError::NoHeaderRow)
        }
    }
}

/// Cells of one data row, coerced to their field types.
#[derive(Debug, Default)]
struct ParsedRow {
    metric: Option<String>,
    section: Option<String>,
    low: Option<f64>,
    moderate: Option<f64>,
    high: Option<f64>,
    weight: Option<f64>,
    max_score: Option<f64>,
}

impl ParsedRow {
    fn parse(cells: &[Cell], columns: &ColumnMap, row: usize) -> Self {
        let text = |idx: usize| cells.get(idx).and_then(Cell::text);
        let number = |idx: Option<usize>, name: &str| {
            let cell = cells.get(idx?)?;
            let value = cell.number();
            if value.is_none() && !cell.is_blank() {
                log::warn!(
                    "row {}: {} value {:?} is not numeric, treated as absent",
                    row,
                    name,
                    cell.text().unwrap_or_default()
                );
            }
            value
        };

        Self {
            metric: text(columns.metric),
            section: columns.section.and_then(text),
            low: number(Some(columns.low), "low risk"),
            moderate: number(Some(columns.moderate), "moderate risk"),
            high: number(columns.high, "high risk"),
            weight: number(columns.weight, "weight"),
            max_score: number(columns.max_score, "max score"),
        }
    }

    /// A named row with no thresholds and no weight opens a new section.
    fn is_section_header(&self) -> bool {
        self.metric.is_some()
            && self.low.is_none()
            && self.moderate.is_none()
            && self.high.is_none()
            && self.weight.is_none()
    }
}
