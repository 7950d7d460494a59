//! Schema loader: raw sheet rows to KPI definitions.

pub mod cache;
pub mod columns;
pub mod loader;
pub mod types;

pub use cache::DefinitionCache;
pub use columns::{ColumnMap, ColumnSynonyms, Field};
pub use loader::{load, load_with, DEFAULT_SECTION};
pub use types::{KpiDefinition, DEFAULT_WEIGHT};
