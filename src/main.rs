use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use kpi_health::schema::{DefinitionCache, KpiDefinition};
use kpi_health::scoring::{ScoreReport, UserInputs};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Result tables with the overall status band
    Table,
    /// One tab-separated line per KPI
    Tsv,
    /// Full report as JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the KPIs and thresholds loaded from the workbook
    Show {
        /// Workbook export (JSON or YAML); overrides `table` in the config
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Sheet to read (default: Input)
        #[arg(short, long)]
        sheet: Option<String>,
    },
    /// Score a customer's KPI values
    Score {
        /// Workbook export (JSON or YAML); overrides `table` in the config
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Sheet to read (default: Input)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Metric values file (YAML or JSON). Prompts for each KPI when omitted.
        #[arg(short, long)]
        inputs: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Parser, Debug)]
#[command(name = "kpi-health")]
#[command(about = "Customer health scoring from KPI risk thresholds", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/kpi-health/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match kpi_health::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = kpi_health::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let (table, sheet) = match &cli.command {
        Commands::Show { table, sheet } | Commands::Score { table, sheet, .. } => {
            (table.clone(), sheet.clone())
        }
    };

    let Some(table_path) = table.or_else(|| config.table.clone()) else {
        eprintln!("No workbook given. Pass --table or set `table:` in the config file.");
        std::process::exit(EXIT_CONFIG);
    };
    let sheet = sheet.unwrap_or_else(|| config.sheet_name().to_string());

    let cache = DefinitionCache::new(table_path, sheet, config.synonyms());
    let definitions = load_definitions(&cache);

    log::info!(
        "Loaded {} KPIs from {}",
        definitions.len(),
        cache.path().display()
    );

    let use_colors = kpi_health::output::should_use_colors();

    match cli.command {
        Commands::Show { .. } => {
            println!(
                "{}",
                kpi_health::output::format_definitions(&definitions, use_colors)
            );
        }
        Commands::Score {
            inputs: Some(inputs_path),
            format,
            ..
        } => {
            let inputs = match kpi_health::inputs::load_inputs(&inputs_path) {
                Ok(i) => i,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };
            match score_and_print(&definitions, &inputs, format, use_colors) {
                Ok(()) => {}
                Err(e) => {
                    eprintln!("Scoring error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            }
        }
        Commands::Score {
            inputs: None,
            format,
            ..
        } => {
            let mut definitions = definitions;
            loop {
                let inputs = match kpi_health::inputs::prompt_inputs(&definitions) {
                    Ok(i) => i,
                    Err(e) => {
                        eprintln!("Input error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                };
                println!();
                if let Err(e) = score_and_print(&definitions, &inputs, format, use_colors) {
                    eprintln!("Scoring error: {:#}", e);
                }
                println!();

                match kpi_health::inputs::prompt_yes_no("Score another customer?", false) {
                    Ok(true) => {}
                    Ok(false) | Err(_) => break,
                }

                // Pick up workbook edits made between runs
                let reloaded = cache.get_or(&definitions);
                match kpi_health::scoring::validate_definitions(&reloaded) {
                    Ok(()) => definitions = reloaded,
                    Err(errors) => log::warn!(
                        "KPI definition errors: {}; keeping the previously loaded KPIs",
                        errors.join("; ")
                    ),
                }
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Load and validate definitions, exiting with EXIT_CONFIG on failure.
fn load_definitions(cache: &DefinitionCache) -> Arc<Vec<KpiDefinition>> {
    let definitions = match cache.get() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = kpi_health::scoring::validate_definitions(&definitions) {
        eprintln!("KPI definition errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    definitions
}

fn score_and_print(
    definitions: &[KpiDefinition],
    inputs: &UserInputs,
    format: OutputFormat,
    use_colors: bool,
) -> anyhow::Result<()> {
    let report: ScoreReport = kpi_health::scoring::score(definitions, inputs)?;
    match format {
        OutputFormat::Table => {
            println!("{}", kpi_health::output::format_report(&report, use_colors));
        }
        OutputFormat::Tsv => {
            println!("{}", kpi_health::output::format_tsv(&report));
        }
        OutputFormat::Json => {
            println!("{}", kpi_health::output::format_json(&report)?);
        }
    }
    Ok(())
}
