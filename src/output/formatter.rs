use std::collections::HashMap;
use std::io::IsTerminal;

use anyhow::Context;
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::schema::KpiDefinition;
use crate::scoring::{RiskLevel, ScoreReport, Status};

const SEPARATOR: &str = "  ";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a number with at most two decimals and no trailing zeros
/// (6 -> "6", 2.6667 -> "2.67", 0.5 -> "0.5").
pub fn format_value(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a fraction as a percentage with one decimal (0.889 -> "88.9%").
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_else(|| "-".to_string())
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Right,
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(text.chars().count()));
    match align {
        Align::Left => format!("{}{}", text, fill),
        Align::Right => format!("{}{}", fill, text),
    }
}

fn paint_risk(text: &str, level: RiskLevel, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match level {
        RiskLevel::Low => text.green().to_string(),
        RiskLevel::Moderate => text.yellow().to_string(),
        RiskLevel::High => text.red().to_string(),
    }
}

fn paint_status(status: Status, use_colors: bool) -> String {
    let text = status.to_string();
    if !use_colors {
        return text;
    }
    match status {
        Status::Green => text.green().bold().to_string(),
        Status::Yellow => text.yellow().bold().to_string(),
        Status::Red => text.red().bold().to_string(),
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

/// Plain-text grid. `paint` may colour a cell after padding so escape codes
/// never disturb alignment.
struct Grid<'a> {
    headers: &'a [&'a str],
    aligns: &'a [Align],
    rows: Vec<Vec<String>>,
}

impl Grid<'_> {
    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn render<F>(&self, use_colors: bool, paint: F) -> String
    where
        F: Fn(usize, usize, String) -> String,
    {
        let widths = self.widths();
        let line = |cells: Vec<String>| {
            cells
                .join(SEPARATOR)
                .trim_end()
                .to_string()
        };

        let header = line(
            self.headers
                .iter()
                .zip(&widths)
                .zip(self.aligns)
                .map(|((h, w), a)| pad(h, *w, *a))
                .collect(),
        );

        let mut lines = vec![heading(&header, use_colors)];
        for (row_idx, row) in self.rows.iter().enumerate() {
            lines.push(line(
                row.iter()
                    .zip(&widths)
                    .zip(self.aligns)
                    .enumerate()
                    .map(|(col, ((cell, w), a))| paint(row_idx, col, pad(cell, *w, *a)))
                    .collect(),
            ));
        }
        lines.join("\n")
    }
}

/// Widest metric name that still fits the terminal next to the other columns.
fn metric_width_limit(term_width: Option<usize>, other_columns: usize) -> Option<usize> {
    term_width.map(|width| {
        if width > other_columns + 10 {
            width - other_columns
        } else {
            20
        }
    })
}

/// Format the full scoring report: per-KPI results, section summary and the
/// overall health score with its status band.
pub fn format_report(report: &ScoreReport, use_colors: bool) -> String {
    format_report_with_width(report, use_colors, get_terminal_width())
}

fn format_report_with_width(
    report: &ScoreReport,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    let mut blocks = Vec::new();

    // Detailed KPI results
    let metric_rows: Vec<Vec<String>> = report
        .metrics
        .iter()
        .map(|m| {
            vec![
                m.section.clone(),
                m.metric.clone(),
                format_value(m.value),
                m.risk_level.to_string(),
                m.raw_score.to_string(),
                format_value(m.weight),
                format_value(m.weighted_score),
            ]
        })
        .collect();

    let headers = ["Section", "Metric", "Input", "Risk", "Score", "Weight", "Weighted"];
    let aligns = [
        Align::Left,
        Align::Left,
        Align::Right,
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
    ];
    let mut grid = Grid {
        headers: &headers,
        aligns: &aligns,
        rows: metric_rows,
    };
    let widths = grid.widths();
    let others: usize = widths
        .iter()
        .enumerate()
        .filter(|(col, _)| *col != 1)
        .map(|(_, w)| w + SEPARATOR.len())
        .sum();
    if let Some(limit) = metric_width_limit(term_width, others) {
        for row in &mut grid.rows {
            row[1] = truncate_text(&row[1], limit);
        }
    }

    let levels: Vec<RiskLevel> = report.metrics.iter().map(|m| m.risk_level).collect();
    let detail = grid.render(use_colors, |row, col, cell| {
        if col == 3 {
            paint_risk(&cell, levels[row], use_colors)
        } else {
            cell
        }
    });
    blocks.push(format!("{}\n{}", heading("Detailed KPI Results", use_colors), detail));

    // Section summary
    let section_rows: Vec<Vec<String>> = report
        .sections
        .iter()
        .map(|s| {
            vec![
                s.section.clone(),
                format_value(s.total_weighted_score),
                format_value(s.total_weight),
                format_value(s.section_average),
                format_optional(s.total_max_score),
                s.percent.map(format_percent).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    let headers = ["Section", "Weighted", "Weight", "Average", "Max", "Score %"];
    let aligns = [
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
    ];
    let summary = Grid {
        headers: &headers,
        aligns: &aligns,
        rows: section_rows,
    }
    .render(use_colors, |_, _, cell| cell);
    blocks.push(format!("{}\n{}", heading("Section Summary", use_colors), summary));

    // Overall
    let overall = &report.overall;
    let mut lines = vec![
        heading("Overall Health Score", use_colors),
        format!(
            "Average: {} ({} / {})",
            format_value(overall.overall_average),
            format_value(overall.total_weighted_score),
            format_value(overall.total_weight)
        ),
    ];
    if let (Some(percent), Some(max)) = (overall.percent, overall.total_max_score) {
        lines.push(format!(
            "Score %: {} ({} / {})",
            format_percent(percent),
            format_value(overall.total_weighted_score),
            format_value(max)
        ));
    }
    lines.push(format!("Status:  {}", paint_status(overall.status, use_colors)));
    blocks.push(lines.join("\n"));

    blocks.join("\n\n")
}

/// Format KPI definitions as the threshold table shown next to the input form.
pub fn format_definitions(definitions: &[KpiDefinition], use_colors: bool) -> String {
    if definitions.is_empty() {
        return "No KPIs defined.".to_string();
    }

    // Keep sections together, in first-seen order.
    let mut section_order: HashMap<&str, usize> = HashMap::new();
    for def in definitions {
        let next = section_order.len();
        section_order.entry(def.section.as_str()).or_insert(next);
    }
    let mut sorted: Vec<&KpiDefinition> = definitions.iter().collect();
    sorted.sort_by_key(|d| section_order[d.section.as_str()]);

    let rows = sorted
        .iter()
        .map(|d| {
            vec![
                d.section.clone(),
                d.metric.clone(),
                format_optional(d.low_threshold),
                format_optional(d.moderate_threshold),
                format_optional(d.high_threshold),
                format_value(d.weight),
                format_optional(d.max_score),
            ]
        })
        .collect();

    let headers = ["Section", "Metric", "Low", "Moderate", "High", "Weight", "Max"];
    let aligns = [
        Align::Left,
        Align::Left,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
        Align::Right,
    ];
    Grid {
        headers: &headers,
        aligns: &aligns,
        rows,
    }
    .render(use_colors, |_, _, cell| cell)
}

/// Full report as pretty-printed JSON
pub fn format_json(report: &ScoreReport) -> anyhow::Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Format metric results as tab-separated values for scripting
/// Columns: section, metric, input, risk, score, weight, weighted (no headers, no colors)
pub fn format_tsv(report: &ScoreReport) -> String {
    report
        .metrics
        .iter()
        .map(|m| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                m.section,
                m.metric,
                format_value(m.value),
                m.risk_level,
                m.raw_score,
                format_value(m.weight),
                format_value(m.weighted_score)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{score, UserInputs};

    fn retention_defs() -> Vec<KpiDefinition> {
        vec![
            KpiDefinition::new("Churn", "Retention", 5.0, 2.0)
                .with_weight(2.0)
                .with_high_threshold(0.0),
            KpiDefinition::new("NPS", "Retention", 50.0, 30.0),
        ]
    }

    fn sample_report() -> ScoreReport {
        let inputs = UserInputs::from([("Churn".to_string(), 6.0), ("NPS".to_string(), 40.0)]);
        score(&retention_defs(), &inputs).unwrap()
    }

    #[test]
    fn test_format_json_report() {
        let json = format_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["overall"]["status"], "Green");
        assert_eq!(value["overall"]["total_weight"], 3.0);
        assert_eq!(value["metrics"].as_array().unwrap().len(), 2);
        assert!(value["overall"]["percent"].is_null());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(6.0), "6");
        assert_eq!(format_value(8.0 / 3.0), "2.67");
        assert_eq!(format_value(0.5), "0.5");
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-0.001), "0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(8.0 / 9.0), "88.9%");
        assert_eq!(format_percent(1.0), "100.0%");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Churn", 10), "Churn");
        assert_eq!(truncate_text("Net Promoter Score", 10), "Net Pro...");
        assert_eq!(truncate_text("Net", 2), "Ne");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 4, Align::Left), "ab  ");
        assert_eq!(pad("ab", 4, Align::Right), "  ab");
        assert_eq!(pad("abcdef", 4, Align::Left), "abcdef");
    }

    #[test]
    fn test_format_report_blocks() {
        let output = format_report_with_width(&sample_report(), false, None);
        assert!(output.contains("Detailed KPI Results"));
        assert!(output.contains("Section Summary"));
        assert!(output.contains("Overall Health Score"));
        assert!(output.contains("Average: 2.67 (8 / 3)"));
        assert!(output.contains("Status:  Green"));
        // No max scores configured, so no percentage line
        assert!(!output.contains("Score %:"));
    }

    #[test]
    fn test_format_report_metric_rows() {
        let output = format_report_with_width(&sample_report(), false, None);
        let churn = output.lines().find(|l| l.contains("Churn")).unwrap();
        assert!(churn.contains("Low"));
        assert!(churn.ends_with('6'));
        let nps = output.lines().find(|l| l.contains("NPS")).unwrap();
        assert!(nps.contains("Moderate"));
    }

    #[test]
    fn test_format_report_with_percent() {
        let defs: Vec<KpiDefinition> = retention_defs()
            .into_iter()
            .map(|d| d.with_max_score(6.0))
            .collect();
        let inputs = UserInputs::from([("Churn".to_string(), 6.0), ("NPS".to_string(), 40.0)]);
        let report = score(&defs, &inputs).unwrap();
        let output = format_report_with_width(&report, false, None);
        assert!(output.contains("Score %: 66.7% (8 / 12)"));
    }

    #[test]
    fn test_format_report_truncates_metric_on_narrow_terminal() {
        let defs = vec![KpiDefinition::new(
            "A very long metric name that will not fit",
            "S",
            5.0,
            2.0,
        )];
        let inputs = UserInputs::from([(defs[0].metric.clone(), 1.0)]);
        let report = score(&defs, &inputs).unwrap();
        let output = format_report_with_width(&report, false, Some(20));
        assert!(output.contains("A very long metri..."));
        assert!(!output.contains("will not fit"));
    }

    #[test]
    fn test_format_report_columns_aligned() {
        let output = format_report_with_width(&sample_report(), false, None);
        let lines: Vec<&str> = output.lines().collect();
        let header = lines.iter().position(|l| l.starts_with("Section  ")).unwrap();
        let metric_col = lines[header].find("Metric").unwrap();
        assert_eq!(lines[header + 1].find("Churn"), Some(metric_col));
        assert_eq!(lines[header + 2].find("NPS"), Some(metric_col));
    }

    #[test]
    fn test_format_definitions() {
        let output = format_definitions(&retention_defs(), false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Section"));
        assert!(lines[1].contains("Churn"));
        // NPS has no high threshold or max score
        assert!(lines[2].contains('-'));
    }

    #[test]
    fn test_format_definitions_groups_sections() {
        let defs = vec![
            KpiDefinition::new("A", "Support", 1.0, 0.0),
            KpiDefinition::new("B", "Adoption", 1.0, 0.0),
            KpiDefinition::new("C", "Support", 1.0, 0.0),
        ];
        let output = format_definitions(&defs, false);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[1].starts_with("Support"));
        assert!(lines[2].starts_with("Support"));
        assert!(lines[3].starts_with("Adoption"));
    }

    #[test]
    fn test_format_definitions_empty() {
        assert_eq!(format_definitions(&[], false), "No KPIs defined.");
    }

    #[test]
    fn test_format_tsv() {
        let output = format_tsv(&sample_report());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Retention\tChurn\t6\tLow\t3\t2\t6");
        assert_eq!(lines[1], "Retention\tNPS\t40\tModerate\t2\t1\t2");
    }

    #[test]
    fn test_colors_do_not_break_plain_text() {
        let output = format_report_with_width(&sample_report(), true, None);
        assert!(output.contains("Churn"));
        assert!(output.contains('\u{1b}'));
    }
}
