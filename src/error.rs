//! Errors raised at the file boundary.
//!
//! The aggregation core never fails; only reading and decoding input files can.

use std::path::PathBuf;

/// Error type for loading survey and tabular input.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The survey file is not a valid survey result document.
    #[error("Failed to parse survey file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The tabular file could not be decoded.
    #[error("Failed to read CSV file {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// Column separators are a single ASCII byte.
    #[error("Separator must be a single ASCII character, got {0:?}")]
    InvalidSeparator(String),

    /// Outlier fences need a finite, non-negative distance.
    #[error("IQR multiplier must be a finite, non-negative number, got {0}")]
    InvalidIqrMultiplier(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_names_path() {
        let err = SurveyError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let message = err.to_string();
        assert!(message.contains("missing.json"));
        assert!(message.contains("no such file"));
    }

    #[test]
    fn test_invalid_separator_message() {
        let err = SurveyError::InvalidSeparator(";;".to_string());
        assert!(err.to_string().contains("\";;\""));
    }

    #[test]
    fn test_invalid_iqr_multiplier_message() {
        let err = SurveyError::InvalidIqrMultiplier(-1.0);
        assert!(err.to_string().contains("-1"));
    }
}
