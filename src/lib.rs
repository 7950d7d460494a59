//! Customer health scoring.
//!
//! A KPI sheet is loaded into [`KpiDefinition`]s with [`schema::load`], then
//! [`scoring::score`] classifies user-entered values into risk tiers and
//! aggregates weighted scores per section and overall.

pub mod config;
pub mod error;
pub mod inputs;
pub mod output;
pub mod schema;
pub mod scoring;
pub mod table;

pub use error::{ConfigError, ScoreError, TableError};
pub use schema::KpiDefinition;
pub use scoring::{ScoreReport, UserInputs};
