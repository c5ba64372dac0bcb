//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Survey Digest - summarize survey results
///
/// Reads an exported survey result file and writes a report with the
/// survey title, start date, number of participants, the overall
/// happiness score and all free-text answers grouped by question.
/// Optionally checks a CSV export for data-quality problems.
///
/// Examples:
///   survey-digest --input survey_results.json
///   survey-digest --input survey_results.json --format json --output -
///   survey-digest --quality responses.csv --separator ';'
///   survey-digest --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Survey result JSON file to summarize
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["init_config", "quality"]
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the report (`-` for stdout)
    ///
    /// Defaults to the configured output, survey_report.md unless changed.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveydigest.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Text shown when the happiness score cannot be computed
    #[arg(long, value_name = "TEXT", env = "SURVEY_DIGEST_SCORE_PLACEHOLDER")]
    pub score_placeholder: Option<String>,

    /// CSV file to check for data-quality problems
    ///
    /// Reports non-uniform columns, duplicate rows, missing values and outliers.
    #[arg(long, value_name = "CSV")]
    pub quality: Option<PathBuf>,

    /// Column separator of the --quality file (single character, `\t` for tab)
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<String>,

    /// Outlier fence distance in interquartile ranges
    #[arg(long, value_name = "FACTOR")]
    pub iqr_multiplier: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .surveydigest.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && self.quality.is_none() {
            return Err("Nothing to do: pass --input and/or --quality".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            validate_file("Survey file", input)?;
        }

        if let Some(ref quality) = self.quality {
            validate_file("Quality file", quality)?;
        }

        if let Some(ref separator) = self.separator {
            crate::quality::parse_separator(separator).map_err(|e| e.to_string())?;
        }

        if let Some(multiplier) = self.iqr_multiplier {
            crate::quality::check_iqr_multiplier(multiplier).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn validate_file(label: &str, path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{} does not exist: {}", label, path.display()));
    }
    if !path.is_file() {
        return Err(format!("{} is not a file: {}", label, path.display()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    pub(crate) fn make_args() -> Args {
        Args {
            input: Some(fixture("survey_results.json")),
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            score_placeholder: None,
            quality: None,
            separator: None,
            iqr_multiplier: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        let args = make_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("does/not/exist.json"));
        let err = args.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validation_input_is_directory() {
        let mut args = make_args();
        args.input = Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
        assert!(args.validate().unwrap_err().contains("not a file"));
    }

    #[test]
    fn test_validation_nothing_to_do() {
        let mut args = make_args();
        args.input = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_quality_only() {
        let mut args = make_args();
        args.input = None;
        args.quality = Some(fixture("responses.csv"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_separator() {
        let mut args = make_args();
        args.separator = Some("::".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_multiplier() {
        let mut args = make_args();
        args.iqr_multiplier = Some(-1.0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "survey-digest",
            "--input",
            "survey.json",
            "--format",
            "json",
            "-o",
            "-",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("survey.json")));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.output, Some(PathBuf::from("-")));
    }

    #[test]
    fn test_input_required_without_quality() {
        assert!(Args::try_parse_from(["survey-digest"]).is_err());
        assert!(Args::try_parse_from(["survey-digest", "--init-config"]).is_ok());
        assert!(Args::try_parse_from(["survey-digest", "--quality", "data.csv"]).is_ok());
    }
}
