use std::io::Write;

use kpi_health::inputs::{load_inputs, parse_inputs};
use kpi_health::schema::{load, KpiDefinition};
use kpi_health::scoring::{score, RiskLevel, Status, UserInputs};
use kpi_health::table::{load_table, parse_workbook, Cell, RawTable, SourceFormat};
use kpi_health::{ConfigError, ScoreError};

const DEMO_WORKBOOK: &str = include_str!("../demos/health.yaml");
const DEMO_INPUTS: &str = include_str!("../demos/inputs.yaml");

fn demo_definitions() -> Vec<KpiDefinition> {
    let table = parse_workbook(DEMO_WORKBOOK, SourceFormat::Yaml, "Input").unwrap();
    load(&table).unwrap()
}

#[test]
fn test_demo_workbook_loads_sections() {
    let defs = demo_definitions();
    let pairs: Vec<(&str, &str)> = defs
        .iter()
        .map(|d| (d.section.as_str(), d.metric.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Adoption", "Active users (%)"),
            ("Adoption", "Feature usage"),
            ("Support", "CSAT"),
            ("Support", "Resolved within SLA (%)"),
            ("Retention", "Renewal likelihood"),
            ("Retention", "NPS"),
        ]
    );
    assert_eq!(defs[0].weight, 2.0);
    assert_eq!(defs[0].max_score, Some(6.0));
}

#[test]
fn test_demo_scoring() {
    let defs = demo_definitions();
    let inputs = parse_inputs(DEMO_INPUTS, SourceFormat::Yaml).unwrap();
    let report = score(&defs, &inputs).unwrap();

    let levels: Vec<RiskLevel> = report.metrics.iter().map(|m| m.risk_level).collect();
    assert_eq!(
        levels,
        vec![
            RiskLevel::Moderate,
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::Low,
            RiskLevel::Low,
            RiskLevel::High,
        ]
    );

    let averages: Vec<f64> = report.sections.iter().map(|s| s.section_average).collect();
    assert!((averages[0] - 7.0 / 3.0).abs() < 1e-9);
    assert!((averages[1] - 2.5).abs() < 1e-9);
    assert!((averages[2] - 7.0 / 3.0).abs() < 1e-9);

    assert_eq!(report.overall.total_weighted_score, 19.0);
    assert_eq!(report.overall.total_weight, 8.0);
    assert_eq!(report.overall.overall_average, 2.375);
    assert_eq!(report.overall.status, Status::Yellow);
    assert_eq!(report.overall.total_max_score, Some(24.0));
    assert!((report.overall.percent.unwrap() - 19.0 / 24.0).abs() < 1e-9);
}

#[test]
fn test_interleaved_headers_round_trip() {
    let header = vec![
        Cell::Text("KPIs".to_string()),
        Cell::Text("Low Risk".to_string()),
        Cell::Text("Moderate Risk".to_string()),
        Cell::Text("Weight".to_string()),
    ];

    for sections in 1..=4 {
        for per_section in 1..=3 {
            let mut rows = vec![header.clone()];
            let mut expected = Vec::new();
            for s in 0..sections {
                let section = format!("Section {}", s);
                rows.push(vec![Cell::Text(section.clone()), Cell::Empty, Cell::Empty, Cell::Empty]);
                for k in 0..per_section {
                    let metric = format!("Metric {}.{}", s, k);
                    rows.push(vec![
                        Cell::Text(metric.clone()),
                        Cell::Number(10.0),
                        Cell::Number(5.0),
                        Cell::Number(1.0),
                    ]);
                    expected.push((section.clone(), metric));
                }
            }

            let defs = load(&RawTable::new(rows)).unwrap();
            let actual: Vec<(String, String)> = defs
                .into_iter()
                .map(|d| (d.section, d.metric))
                .collect();
            assert_eq!(actual, expected);
        }
    }
}

#[test]
fn test_missing_input_names_metric() {
    let defs = demo_definitions();
    let mut inputs = parse_inputs(DEMO_INPUTS, SourceFormat::Yaml).unwrap();
    inputs.remove("CSAT");

    let err = score(&defs, &inputs).unwrap_err();
    assert_eq!(
        err,
        ScoreError::MissingInput {
            metric: "CSAT".to_string()
        }
    );
    assert_eq!(err.to_string(), "missing input for metric 'CSAT'");
}

#[test]
fn test_title_only_sheet_is_rejected() {
    let table = RawTable::new(vec![
        vec![Cell::Text("Customer Health".to_string())],
        vec![Cell::Text("Churn".to_string()), Cell::Number(5.0)],
    ]);
    assert_eq!(load(&table).unwrap_err(), ConfigError::NoHeaderRow);
}

#[test]
fn test_json_files_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let workbook_path = dir.path().join("kpis.json");
    let mut workbook = std::fs::File::create(&workbook_path).unwrap();
    write!(
        workbook,
        r#"{{"sheets": {{"Input": [
            ["KPIs", "Low Risk", "Moderate Risk", "High Risk", "Weight"],
            ["Retention", null, null, null, null],
            ["Churn", 5, 2, null, 2],
            ["NPS", 50, 30, null, 1]
        ]}}}}"#
    )
    .unwrap();

    let inputs_path = dir.path().join("inputs.json");
    std::fs::write(&inputs_path, r#"{"Churn": 6, "NPS": 40}"#).unwrap();

    let table = load_table(&workbook_path, "Input").unwrap();
    let defs = load(&table).unwrap();
    let inputs: UserInputs = load_inputs(&inputs_path).unwrap();
    let report = score(&defs, &inputs).unwrap();

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].section, "Retention");
    assert!((report.sections[0].section_average - 8.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.overall.status, Status::Green);
    assert_eq!(report.overall.percent, None);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overall"]["status"], "Green");
    assert_eq!(json["metrics"][0]["risk_level"], "Low");
}
