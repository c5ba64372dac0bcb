//! Data models for the survey digest.
//!
//! This module contains the survey input structures as they arrive on disk,
//! the derived views handed to the report layer, and the report documents
//! themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// A complete survey result set as produced by the survey tool export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyResult {
    /// Survey name.
    #[serde(rename = "survey_title", default)]
    pub title: String,
    /// Creation timestamp, ISO 8601-ish. Only parsed for display.
    #[serde(default)]
    pub created_at: String,
    /// Questions in document order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A survey question, discriminated by the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    /// Numeric rating question (`"type": "number"`).
    #[serde(rename = "number")]
    OpinionScale(OpinionScaleQuestion),
    /// Open-ended question (`"type": "text"`).
    #[serde(rename = "text")]
    FreeText(FreeTextQuestion),
}

impl Question {
    /// Returns the question text regardless of the variant.
    pub fn question_text(&self) -> &str {
        match self {
            Question::OpinionScale(q) => &q.question_text,
            Question::FreeText(q) => &q.question_text,
        }
    }

    /// Returns the number of responses recorded for this question.
    pub fn response_count(&self) -> usize {
        match self {
            Question::OpinionScale(q) => q.responses.len(),
            Question::FreeText(q) => q.responses.len(),
        }
    }

    /// Returns the kind of this question.
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::OpinionScale(_) => QuestionKind::OpinionScale,
            Question::FreeText(_) => QuestionKind::FreeText,
        }
    }
}

/// Kind of a question, mirroring the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    OpinionScale,
    FreeText,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::OpinionScale => write!(f, "number"),
            QuestionKind::FreeText => write!(f, "text"),
        }
    }
}

/// A question answered on a numeric scale (usually 0 to 5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpinionScaleQuestion {
    pub question_text: String,
    #[serde(default)]
    pub responses: Vec<f64>,
}

/// A question answered with free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextQuestion {
    pub question_text: String,
    #[serde(default)]
    pub responses: Vec<String>,
}

/// One row of the flattened free-text listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatResponseItem {
    /// Unique within one listing, derived from question and response position.
    pub key: String,
    /// The literal response text.
    pub name: String,
}

/// A contiguous run of the flat listing that belongs to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseGroup {
    /// Text of the owning question, also used as the group identity.
    pub label: String,
    /// Index of the first item of this group in the flat listing.
    pub start_index: usize,
    /// Number of items in this group. May be zero.
    pub count: usize,
}

impl ResponseGroup {
    /// Half-open range of this group inside the flat listing.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.start_index + self.count
    }

    /// Returns true if the group holds no responses.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Slice of `items` covered by this group.
    ///
    /// Out-of-range groups yield an empty slice.
    pub fn slice<'a>(&self, items: &'a [FlatResponseItem]) -> &'a [FlatResponseItem] {
        items.get(self.range()).unwrap_or(&[])
    }
}

/// Display column for the free-text listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    /// Header text.
    pub name: String,
    /// Field of [`FlatResponseItem`] rendered in this column.
    pub field_name: String,
    pub min_width: u32,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            key: "name".to_string(),
            name: "Text answers".to_string(),
            field_name: "name".to_string(),
            min_width: 200,
        }
    }
}

/// Happiness score of a single opinion-scale question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_text: String,
    /// Number of responses the score was computed from.
    pub responses: usize,
    /// Score on a 0-100 scale, `None` when there are no responses.
    pub score: Option<f64>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the file the report was built from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl ReportMetadata {
    /// Creates metadata for a report generated now.
    pub fn now(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Everything the report layer shows for one survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub metadata: ReportMetadata,
    pub title: String,
    /// Creation date formatted as `DD.MM.YYYY`, empty when unknown.
    pub created_at: String,
    pub number_of_people: usize,
    /// Rounded overall score or the configured placeholder.
    pub happiness_score: String,
    pub question_scores: Vec<QuestionScore>,
    pub columns: Vec<Column>,
    pub items: Vec<FlatResponseItem>,
    pub groups: Vec<ResponseGroup>,
}

impl SurveyReport {
    /// Returns the items belonging to `group`.
    pub fn group_items(&self, group: &ResponseGroup) -> &[FlatResponseItem] {
        group.slice(&self.items)
    }
}

/// Output document of one run: a survey summary, a quality report, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Digest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey: Option<SurveyReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
}

/// Findings of a tabular data-quality check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Path of the checked file.
    pub source: String,
    /// Number of data rows (header excluded).
    pub row_count: usize,
    /// Column name to rows whose value kind deviates from the column.
    #[serde(rename = "UNIFORMITY")]
    pub uniformity: BTreeMap<String, Vec<usize>>,
    /// Groups of identical rows.
    #[serde(rename = "DUPLICATE_ROWS")]
    pub duplicate_rows: Vec<Vec<usize>>,
    /// Rows with at least one missing cell.
    #[serde(rename = "MISSING_VALUE_ROWS")]
    pub missing_value_rows: Vec<usize>,
    /// Numeric column name to rows outside the IQR fences.
    #[serde(rename = "OUTLIERS")]
    pub outliers: BTreeMap<String, Vec<usize>>,
}

impl QualityReport {
    /// Returns true if any check reported a finding.
    pub fn has_findings(&self) -> bool {
        !self.uniformity.is_empty()
            || !self.duplicate_rows.is_empty()
            || !self.missing_value_rows.is_empty()
            || self.outliers.values().any(|rows| !rows.is_empty())
    }
}
