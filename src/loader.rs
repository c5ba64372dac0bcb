//! Survey result loading.
//!
//! Reads an exported survey result document from disk. The aggregation code
//! only ever sees a fully decoded [`SurveyResult`].

use crate::error::SurveyError;
use crate::models::SurveyResult;
use std::path::Path;
use tracing::{debug, info};

/// Load a survey result from a JSON file.
pub fn load_survey(path: &Path) -> Result<SurveyResult, SurveyError> {
    info!("Loading survey from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_survey(&content, path)
}

/// Parse survey JSON that was read from `path`.
pub fn parse_survey(content: &str, path: &Path) -> Result<SurveyResult, SurveyError> {
    let result: SurveyResult =
        serde_json::from_str(content).map_err(|source| SurveyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        "Parsed survey '{}' with {} questions",
        result.title,
        result.questions.len()
    );
    for question in &result.questions {
        debug!(
            "  [{}] {} ({} responses)",
            question.kind(),
            question.question_text(),
            question.response_count()
        );
    }

    Ok(result)
}
