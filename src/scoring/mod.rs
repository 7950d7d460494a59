pub mod engine;
pub mod types;
pub mod validation;

pub use engine::{aggregate_overall, aggregate_sections, classify, score, score_metric};
pub use types::*;
pub use validation::{validate_definitions, validate_inputs};
