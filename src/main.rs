//! Survey Digest - survey result summarizer
//!
//! A CLI tool that reads an exported survey result, computes the
//! happiness score and participant count, groups the free-text answers
//! by question and writes a Markdown or JSON report. It can also check
//! a CSV export for data-quality problems.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, invalid JSON/CSV, bad config, etc.)

mod cli;
mod config;
mod error;
mod loader;
mod models;
mod quality;
mod report;
mod survey;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::{Digest, QualityReport, SurveyReport};
use quality::DataQualityChecker;
use std::path::Path;
use survey::{FreeTextGrouper, SurveyAggregator};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Survey Digest v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Digest failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .surveydigest.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the output, score placeholder and quality checks.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete digest workflow.
fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let to_stdout = config.general.output == "-";
    let mut digest = Digest::default();

    if let Some(ref input) = args.input {
        let report = summarize_survey(input, &config)?;
        if !to_stdout && !args.quiet {
            print_survey_summary(&report);
        }
        digest.survey = Some(report);
    }

    if let Some(ref table) = args.quality {
        let report = check_quality(table, &config)?;
        if !to_stdout && !args.quiet {
            print_quality_summary(&report);
        }
        digest.quality = Some(report);
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&digest)?,
        OutputFormat::Markdown => report::generate_markdown_report(&digest, &config.report),
    };

    if to_stdout {
        println!("{}", output);
    } else {
        std::fs::write(&config.general.output, &output)
            .with_context(|| format!("Failed to write report to {}", config.general.output))?;
        info!("Report written to {}", config.general.output);
        if !args.quiet {
            println!("\n✅ Report saved to: {}", config.general.output);
        }
    }

    Ok(())
}

/// Load, aggregate and group one survey result.
fn summarize_survey(input: &Path, config: &Config) -> Result<SurveyReport> {
    let result = loader::load_survey(input)?;

    let mut aggregator =
        SurveyAggregator::new().with_score_placeholder(config.report.score_placeholder.clone());
    aggregator.set_result(result);

    debug!(
        "Scoring {} opinion-scale questions",
        aggregator.opinion_scale_questions().len()
    );

    let grouper = FreeTextGrouper::new(aggregator.free_text_questions())
        .with_column(config.report.column());
    debug!(
        "Grouped {} free-text answers into {} groups",
        grouper.items().len(),
        grouper.groups().len()
    );
    for group in grouper.groups() {
        debug!(
            "  {}: {} answers",
            group.label,
            grouper.group_items(group).len()
        );
    }
    if let Some(column) = grouper.columns().first() {
        debug!("Answer column: '{}' (min width {})", column.name, column.min_width);
    }

    Ok(report::build_survey_report(
        &aggregator,
        grouper,
        &input.display().to_string(),
    ))
}

/// Run the data-quality checks on a delimited file.
fn check_quality(table: &Path, config: &Config) -> Result<QualityReport> {
    let separator = quality::parse_separator(&config.quality.separator)?;

    let checker = DataQualityChecker::from_path(table, separator)?
        .with_iqr_multiplier(config.quality.iqr_multiplier);
    debug!(
        "Checking {} rows, columns: {}",
        checker.row_count(),
        checker.headers().join(", ")
    );

    Ok(checker.generate_report())
}

fn print_survey_summary(report: &SurveyReport) {
    println!("📋 Survey: {}", report.title);
    if !report.created_at.is_empty() {
        println!("   Started: {}", report.created_at);
    }
    println!("   Participants: {}", report.number_of_people);
    println!("   Happiness score: {} / 100", report.happiness_score);
    println!(
        "   Free-text answers: {} across {} questions",
        report.items.len(),
        report.groups.len()
    );
}

fn print_quality_summary(report: &QualityReport) {
    println!("🔎 Data quality: {} ({} rows)", report.source, report.row_count);
    println!(
        "   Non-uniform columns: {} | Duplicate groups: {} | Rows with missing values: {}",
        report.uniformity.len(),
        report.duplicate_rows.len(),
        report.missing_value_rows.len()
    );
    let outliers: usize = report.outliers.values().map(Vec::len).sum();
    println!("   Outliers: {}", outliers);
    if !report.has_findings() {
        println!("   No problems found.");
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
