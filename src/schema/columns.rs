//! Name-based column resolution.
//!
//! Every semantic field has a list of accepted header names. Columns are
//! matched by name only; position is never used except for the unnamed
//! first column, which is taken as the metric column.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::ConfigError;
use crate::table::Cell;

/// Header cells that identify the header row of a KPI sheet.
const HEADER_MARKERS: &[&str] = &["low risk", "moderate risk", "medium risk", "high risk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Metric,
    Section,
    Low,
    Moderate,
    High,
    Weight,
    MaxScore,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Metric,
        Field::Section,
        Field::Low,
        Field::Moderate,
        Field::High,
        Field::Weight,
        Field::MaxScore,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Metric => "metric name",
            Field::Section => "section",
            Field::Low => "low risk threshold",
            Field::Moderate => "moderate risk threshold",
            Field::High => "high risk threshold",
            Field::Weight => "weight",
            Field::MaxScore => "max score",
        }
    }

    fn is_threshold(&self) -> bool {
        matches!(self, Field::Low | Field::Moderate | Field::High)
    }

    fn builtin_names(&self) -> &'static [&'static str] {
        match self {
            Field::Metric => &["metric", "metrics", "metric name", "kpi", "kpis", "kpi name"],
            Field::Section => &["section", "category", "group"],
            Field::Low => &["low risk", "low", "low threshold", "low risk threshold"],
            Field::Moderate => &[
                "moderate risk",
                "moderate",
                "moderate threshold",
                "moderate risk threshold",
                "medium risk",
                "medium",
            ],
            Field::High => &["high risk", "high", "high threshold", "high risk threshold"],
            Field::Weight => &["weight", "weighting", "kpi weight"],
            Field::MaxScore => &["max clm score", "max score", "maximum score", "max"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower-case, trim, and collapse inner whitespace.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Accepted header names per field.
#[derive(Debug, Clone)]
pub struct ColumnSynonyms {
    names: HashMap<Field, Vec<String>>,
    markers: HashSet<String>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        let names = Field::ALL
            .iter()
            .map(|field| {
                let list = field.builtin_names().iter().map(|n| n.to_string()).collect();
                (*field, list)
            })
            .collect();
        let markers = HEADER_MARKERS.iter().map(|m| m.to_string()).collect();
        Self { names, markers }
    }
}

impl ColumnSynonyms {
    /// Add extra accepted names for `field`.
    ///
    /// Extra names for threshold fields also count as header-row markers.
    pub fn extend<I, S>(&mut self, field: Field, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in extra {
            let name = normalize(name.as_ref());
            if name.is_empty() {
                continue;
            }
            if field.is_threshold() {
                self.markers.insert(name.clone());
            }
            let list = self.names.entry(field).or_default();
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }

    /// Field a header name belongs to, if any.
    pub fn field_for(&self, name: &str) -> Option<Field> {
        let name = normalize(name);
        Field::ALL.into_iter().find(|field| {
            self.names
                .get(field)
                .is_some_and(|list| list.iter().any(|n| *n == name))
        })
    }

    /// Whether a cell looks like a literal threshold column name.
    pub fn is_header_marker(&self, cell: &Cell) -> bool {
        match cell {
            Cell::Text(s) => self.markers.contains(&normalize(s)),
            _ => false,
        }
    }
}

/// Column index of each resolved field within the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub metric: usize,
    pub section: Option<usize>,
    pub low: usize,
    pub moderate: usize,
    pub high: Option<usize>,
    pub weight: Option<usize>,
    pub max_score: Option<usize>,
}

/// Resolve the header row at `row` into a [`ColumnMap`].
///
/// Repeated column names keep their first occurrence. Two distinct columns
/// claiming the same field is an error rather than a guess.
pub fn resolve_columns(
    header: &[Cell],
    row: usize,
    synonyms: &ColumnSynonyms,
) -> Result<ColumnMap, ConfigError> {
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut resolved: HashMap<Field, (usize, String)> = HashMap::new();

    for (idx, cell) in header.iter().enumerate() {
        let Some(name) = cell.text() else {
            continue;
        };
        if !seen_names.insert(normalize(&name)) {
            log::debug!("column {} repeats header '{}', keeping the first one", idx + 1, name);
            continue;
        }
        let Some(field) = synonyms.field_for(&name) else {
            log::debug!("column '{}' is not a KPI field, ignored", name);
            continue;
        };
        if let Some((_, first)) = resolved.get(&field) {
            return Err(ConfigError::AmbiguousColumn {
                field: field.label(),
                first: first.clone(),
                second: name,
            });
        }
        resolved.insert(field, (idx, name));
    }

    if !resolved.contains_key(&Field::Metric) && header.first().is_some_and(Cell::is_blank) {
        log::debug!("unnamed first column taken as the metric column");
        resolved.insert(Field::Metric, (0, "Metric".to_string()));
    }

    let required = |field: Field| {
        resolved
            .get(&field)
            .map(|(idx, _)| *idx)
            .ok_or(ConfigError::MissingColumn {
                row,
                field: field.label(),
            })
    };
    let optional = |field: Field| resolved.get(&field).map(|(idx, _)| *idx);

    Ok(ColumnMap {
        metric: required(Field::Metric)?,
        section: optional(Field::Section),
        low: required(Field::Low)?,
        moderate: required(Field::Moderate)?,
        high: optional(Field::High),
        weight: optional(Field::Weight),
        max_score: optional(Field::MaxScore),
    })
}
