//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.surveydigest.toml` files.

use crate::models::Column;
use crate::quality::{self, DEFAULT_IQR_MULTIPLIER};
use crate::survey::DEFAULT_SCORE_PLACEHOLDER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".surveydigest.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Data-quality check settings.
    #[serde(default)]
    pub quality: QualityConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. `-` writes to stdout.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "survey_report.md".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Shown instead of the happiness score when it cannot be computed.
    #[serde(default = "default_score_placeholder")]
    pub score_placeholder: String,

    /// Header of the free-text answer column.
    #[serde(default = "default_column_name")]
    pub column_name: String,

    /// Minimum width of the free-text answer column.
    #[serde(default = "default_column_min_width")]
    pub column_min_width: u32,

    /// Render each answer group collapsed.
    #[serde(default = "default_true")]
    pub collapse_groups: bool,

    /// Render groups of questions nobody answered.
    #[serde(default = "default_true")]
    pub show_empty_groups: bool,

    /// Include the per-question score table.
    #[serde(default = "default_true")]
    pub include_question_scores: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            score_placeholder: default_score_placeholder(),
            column_name: default_column_name(),
            column_min_width: default_column_min_width(),
            collapse_groups: true,
            show_empty_groups: true,
            include_question_scores: true,
        }
    }
}

impl ReportConfig {
    /// Display column for the free-text listing.
    pub fn column(&self) -> Column {
        Column {
            name: self.column_name.clone(),
            min_width: self.column_min_width,
            ..Column::default()
        }
    }
}

fn default_score_placeholder() -> String {
    DEFAULT_SCORE_PLACEHOLDER.to_string()
}

fn default_column_name() -> String {
    Column::default().name
}

fn default_column_min_width() -> u32 {
    Column::default().min_width
}

fn default_true() -> bool {
    true
}

/// Data-quality check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Column separator of the checked file.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Outlier fences lie this many IQRs beyond the quartiles.
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            iqr_multiplier: default_iqr_multiplier(),
        }
    }
}

fn default_separator() -> String {
    ",".to_string()
}

fn default_iqr_multiplier() -> f64 {
    DEFAULT_IQR_MULTIPLIER
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref placeholder) = args.score_placeholder {
            self.report.score_placeholder = placeholder.clone();
        }

        if let Some(ref separator) = args.separator {
            self.quality.separator = separator.clone();
        }
        if let Some(multiplier) = args.iqr_multiplier {
            self.quality.iqr_multiplier = multiplier;
        }
    }

    /// Check values that serde accepts but the checks cannot use.
    ///
    /// Run after [`merge_with_args`](Self::merge_with_args) so that file and
    /// CLI values are both covered.
    pub fn validate(&self) -> Result<()> {
        quality::parse_separator(&self.quality.separator)
            .context("Invalid quality.separator")?;
        quality::check_iqr_multiplier(self.quality.iqr_multiplier)
            .context("Invalid quality.iqr_multiplier")?;
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
