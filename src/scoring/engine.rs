use std::collections::HashMap;

use super::types::{
    MetricResult, OverallResult, RiskLevel, ScoreReport, SectionResult, Status, UserInputs,
};
use super::validation::validate_inputs;
use crate::error::ScoreError;
use crate::schema::KpiDefinition;

/// Classify a value against a KPI's cut points.
///
/// Checks run low, then moderate; anything else is High. An absent threshold
/// skips its tier. `high_threshold` never takes part.
pub fn classify(definition: &KpiDefinition, value: f64) -> RiskLevel {
    match (definition.low_threshold, definition.moderate_threshold) {
        (Some(low), _) if value >= low => RiskLevel::Low,
        (_, Some(moderate)) if value >= moderate => RiskLevel::Moderate,
        _ => RiskLevel::High,
    }
}

pub fn score_metric(definition: &KpiDefinition, value: f64) -> MetricResult {
    let risk_level = classify(definition, value);
    let raw_score = risk_level.raw_score();
    MetricResult {
        section: definition.section.clone(),
        metric: definition.metric.clone(),
        value,
        risk_level,
        raw_score,
        weight: definition.weight,
        weighted_score: f64::from(raw_score) * definition.weight,
        max_score: definition.max_score,
    }
}

/// Score every KPI and aggregate per section and overall.
///
/// Every defined metric needs an input; a missing one fails the request
/// instead of defaulting to zero. Inputs for unknown metrics are ignored.
pub fn score(definitions: &[KpiDefinition], inputs: &UserInputs) -> Result<ScoreReport, ScoreError> {
    if let Some(def) = definitions.iter().find(|d| !inputs.contains_key(&d.metric)) {
        return Err(ScoreError::MissingInput {
            metric: def.metric.clone(),
        });
    }

    validate_inputs(definitions, inputs).map_err(ScoreError::InvalidInputs)?;

    for metric in inputs.keys() {
        if !definitions.iter().any(|d| d.metric == *metric) {
            log::warn!("input for unknown metric '{}' ignored", metric);
        }
    }

    let metrics: Vec<MetricResult> = definitions
        .iter()
        .map(|def| score_metric(def, inputs[&def.metric]))
        .collect();

    let sections = aggregate_sections(&metrics);
    let overall = aggregate_overall(&metrics);

    log::debug!(
        "scored {} metrics in {} sections: average {:.3} ({})",
        metrics.len(),
        sections.len(),
        overall.overall_average,
        overall.status
    );

    Ok(ScoreReport {
        overall,
        sections,
        metrics,
    })
}

/// Group results by section in first-seen order.
pub fn aggregate_sections(metrics: &[MetricResult]) -> Vec<SectionResult> {
    let mut order: Vec<(&str, Totals)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for metric in metrics {
        let slot = *index.entry(metric.section.as_str()).or_insert_with(|| {
            order.push((metric.section.as_str(), Totals::default()));
            order.len() - 1
        });
        order[slot].1.add(metric);
    }

    order
        .into_iter()
        .map(|(section, totals)| SectionResult {
            section: section.to_string(),
            total_weighted_score: totals.weighted,
            total_weight: totals.weight,
            section_average: totals.average(),
            total_max_score: totals.max_score(),
            percent: totals.percent(),
        })
        .collect()
}

pub fn aggregate_overall(metrics: &[MetricResult]) -> OverallResult {
    let totals = metrics.iter().fold(Totals::default(), |mut acc, m| {
        acc.add(m);
        acc
    });
    let overall_average = totals.average();

    OverallResult {
        total_weighted_score: totals.weighted,
        total_weight: totals.weight,
        overall_average,
        status: Status::from_average(overall_average),
        total_max_score: totals.max_score(),
        percent: totals.percent(),
    }
}

/// Running sums for one aggregation group.
#[derive(Debug, Clone, Copy)]
struct Totals {
    weighted: f64,
    weight: f64,
    max: f64,
    all_have_max: bool,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            weighted: 0.0,
            weight: 0.0,
            max: 0.0,
            all_have_max: true,
        }
    }
}

impl Totals {
    fn add(&mut self, metric: &MetricResult) {
        self.weighted += metric.weighted_score;
        self.weight += metric.weight;
        match metric.max_score {
            Some(max) => self.max += max,
            None => self.all_have_max = false,
        }
    }

    /// Weighted average; 0 for a group with no weight.
    fn average(&self) -> f64 {
        if self.weight == 0.0 {
            0.0
        } else {
            self.weighted / self.weight
        }
    }

    fn max_score(&self) -> Option<f64> {
        self.all_have_max.then_some(self.max)
    }

    fn percent(&self) -> Option<f64> {
        self.max_score()
            .filter(|max| *max > 0.0)
            .map(|max| self.weighted / max)
    }
}
