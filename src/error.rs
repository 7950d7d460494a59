use thiserror::Error;

/// Errors raised while turning a raw table into KPI definitions.
///
/// Any of these aborts the whole configuration load; a partially parsed KPI
/// set is never handed to the scoring engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no header row found: no row names a low-risk threshold column (e.g. \"Low Risk\")")]
    NoHeaderRow,

    #[error("header row {row} is missing a column for {field}")]
    MissingColumn { row: usize, field: &'static str },

    #[error("columns '{first}' and '{second}' both look like the {field} column")]
    AmbiguousColumn {
        field: &'static str,
        first: String,
        second: String,
    },

    #[error("metric '{metric}' is defined more than once (rows {first_row} and {second_row})")]
    DuplicateMetric {
        metric: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("configuration contains no valid KPI rows")]
    NoKpis,
}

/// Errors raised for a single scoring request.
///
/// The loaded definitions stay valid; the caller can fix the inputs and retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("missing input for metric '{metric}'")]
    MissingInput { metric: String },

    #[error("invalid inputs: {}", .0.join("; "))]
    InvalidInputs(Vec<String>),
}

/// Errors raised while decoding a workbook export.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("invalid JSON workbook: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML workbook: {0}")]
    Yaml(String),
}
