use serde::{Deserialize, Serialize};

/// Weight applied when the configuration leaves the weight cell blank.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// One scored metric, as resolved from the configuration table.
///
/// `low_threshold` and `moderate_threshold` are the two cut points used for
/// classification. `high_threshold` is carried for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub metric: String,
    pub section: String,
    pub low_threshold: Option<f64>,
    pub moderate_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
    pub weight: f64,
    pub max_score: Option<f64>,
}

impl KpiDefinition {
    pub fn new(
        metric: impl Into<String>,
        section: impl Into<String>,
        low_threshold: f64,
        moderate_threshold: f64,
    ) -> Self {
        Self {
            metric: metric.into(),
            section: section.into(),
            low_threshold: Some(low_threshold),
            moderate_threshold: Some(moderate_threshold),
            high_threshold: None,
            weight: DEFAULT_WEIGHT,
            max_score: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_high_threshold(mut self, high: f64) -> Self {
        self.high_threshold = Some(high);
        self
    }

    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = Some(max_score);
        self
    }
}
