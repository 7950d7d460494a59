use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Overall average at or above which the customer is Green.
pub const GREEN_THRESHOLD: f64 = 2.5;

/// Overall average at or above which the customer is Yellow (below Green).
pub const YELLOW_THRESHOLD: f64 = 1.75;

/// User-entered value per metric name.
pub type UserInputs = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Tier score: Low 3, Moderate 2, High 1.
    pub fn raw_score(&self) -> u8 {
        match self {
            RiskLevel::Low => 3,
            RiskLevel::Moderate => 2,
            RiskLevel::High => 1,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Status band of the overall average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Green,
    Yellow,
    Red,
}

impl Status {
    /// Inclusive lower bounds: >= 2.5 Green, >= 1.75 Yellow, otherwise Red.
    pub fn from_average(average: f64) -> Self {
        if average >= GREEN_THRESHOLD {
            Status::Green
        } else if average >= YELLOW_THRESHOLD {
            Status::Yellow
        } else {
            Status::Red
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Green => write!(f, "Green"),
            Status::Yellow => write!(f, "Yellow"),
            Status::Red => write!(f, "Red"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub section: String,
    pub metric: String,
    pub value: f64,
    pub risk_level: RiskLevel,
    pub raw_score: u8,
    pub weight: f64,
    pub weighted_score: f64,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub section: String,
    pub total_weighted_score: f64,
    pub total_weight: f64,
    pub section_average: f64,
    /// Sum of member max scores; None unless every member has one.
    pub total_max_score: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub total_weighted_score: f64,
    pub total_weight: f64,
    pub overall_average: f64,
    pub status: Status,
    pub total_max_score: Option<f64>,
    pub percent: Option<f64>,
}

/// Everything one scoring request produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub overall: OverallResult,
    pub sections: Vec<SectionResult>,
    pub metrics: Vec<MetricResult>,
}
