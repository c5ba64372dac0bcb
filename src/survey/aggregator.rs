//! Survey aggregation.
//!
//! Holds the current survey result and exposes the derived summary values:
//! title, display date, respondent count, happiness scores and the free-text
//! questions. Every getter degrades to an empty or zero default while no
//! survey is held.

use crate::models::{
    FreeTextQuestion, OpinionScaleQuestion, Question, QuestionScore, SurveyResult,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

/// Scale factor from a 0-5 rating to a 0-100 score.
const SCORE_SCALE: f64 = 20.0;

/// Placeholder shown when the overall score cannot be computed.
pub const DEFAULT_SCORE_PLACEHOLDER: &str = "N/A";

/// Output format of [`SurveyAggregator::created_at`].
const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Accepted timestamp layouts without an offset, tried in order.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Derives summary values from a single survey result.
///
/// The question partitions are recomputed on every [`set_result`](Self::set_result),
/// so a getter never observes views of a previously held survey.
#[derive(Debug, Clone)]
pub struct SurveyAggregator {
    result: Option<SurveyResult>,
    free_text: Vec<FreeTextQuestion>,
    opinion_scale: Vec<OpinionScaleQuestion>,
    score_placeholder: String,
}

impl Default for SurveyAggregator {
    fn default() -> Self {
        Self {
            result: None,
            free_text: Vec::new(),
            opinion_scale: Vec::new(),
            score_placeholder: DEFAULT_SCORE_PLACEHOLDER.to_string(),
        }
    }
}

impl SurveyAggregator {
    /// Create an aggregator that holds no survey yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `placeholder` as the display value of an undefined overall score.
    pub fn with_score_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.score_placeholder = placeholder.into();
        self
    }

    /// Replace the held survey result wholesale.
    pub fn set_result(&mut self, result: SurveyResult) {
        let (free_text, opinion_scale) = partition_questions(&result.questions);

        debug!(
            "Survey '{}': {} opinion-scale, {} free-text questions",
            result.title,
            opinion_scale.len(),
            free_text.len()
        );

        self.free_text = free_text;
        self.opinion_scale = opinion_scale;
        self.result = Some(result);
    }

    /// Survey title, or `""` when no survey is held.
    pub fn title(&self) -> &str {
        self.result.as_ref().map_or("", |r| r.title.as_str())
    }

    /// Creation date as `DD.MM.YYYY`.
    ///
    /// Returns `""` when no survey is held or the date cannot be parsed.
    pub fn created_at(&self) -> String {
        self.result
            .as_ref()
            .and_then(|r| parse_date(&r.created_at))
            .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Number of respondents.
    ///
    /// Taken from the response count of the first opinion-scale question;
    /// later questions are not consulted.
    pub fn number_of_people(&self) -> usize {
        self.opinion_scale
            .first()
            .map_or(0, |q| q.responses.len())
    }

    /// Free-text questions in document order.
    pub fn free_text_questions(&self) -> &[FreeTextQuestion] {
        &self.free_text
    }

    /// Opinion-scale questions in document order.
    pub fn opinion_scale_questions(&self) -> &[OpinionScaleQuestion] {
        &self.opinion_scale
    }

    /// Happiness score of every opinion-scale question, in document order.
    pub fn question_scores(&self) -> Vec<QuestionScore> {
        self.opinion_scale
            .iter()
            .map(|q| QuestionScore {
                question_text: q.question_text.clone(),
                responses: q.responses.len(),
                score: question_happiness_score(q),
            })
            .collect()
    }

    /// Mean of the per-question scores.
    ///
    /// `None` when there are no opinion-scale questions, when any of them has
    /// no responses, or when the result is not finite.
    pub fn overall_happiness_score(&self) -> Option<f64> {
        overall_happiness_score(&self.opinion_scale)
    }

    /// Overall happiness score rounded to an integer string.
    ///
    /// Falls back to the score placeholder when the score is undefined.
    pub fn happiness_score(&self) -> String {
        match self.overall_happiness_score() {
            Some(score) => format!("{:.0}", score.round()),
            None => {
                debug!("Happiness score undefined, using placeholder");
                self.score_placeholder.clone()
            }
        }
    }
}

/// Split questions into free-text and opinion-scale lists, keeping order.
pub fn partition_questions(
    questions: &[Question],
) -> (Vec<FreeTextQuestion>, Vec<OpinionScaleQuestion>) {
    let mut free_text = Vec::new();
    let mut opinion_scale = Vec::new();

    for question in questions {
        match question {
            Question::FreeText(q) => free_text.push(q.clone()),
            Question::OpinionScale(q) => opinion_scale.push(q.clone()),
        }
    }

    (free_text, opinion_scale)
}

/// Happiness score of a single question: `sum * 20 / n`.
pub fn question_happiness_score(question: &OpinionScaleQuestion) -> Option<f64> {
    if question.responses.is_empty() {
        return None;
    }

    let sum: f64 = question.responses.iter().sum();
    Some(sum * SCORE_SCALE / question.responses.len() as f64)
}

/// Mean of the per-question happiness scores.
pub fn overall_happiness_score(questions: &[OpinionScaleQuestion]) -> Option<f64> {
    if questions.is_empty() {
        return None;
    }

    let total = questions
        .iter()
        .map(question_happiness_score)
        .sum::<Option<f64>>()?;

    Some(total / questions.len() as f64).filter(|score| score.is_finite())
}

/// Parse the date part of an ISO 8601-like timestamp.
///
/// Timestamps carrying an offset keep the calendar date of that offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}
