//! Tabular data-quality checks.
//!
//! Loads a delimited file with a header row and reports non-uniform columns,
//! duplicate rows, rows with missing values and IQR outliers. Row numbers are
//! 0-based indices into the data rows; the header is not counted.

use crate::error::SurveyError;
use crate::models::QualityReport;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Default fence multiplier for outlier detection.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Cell contents treated as missing (besides blank cells).
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Value class of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Integer or floating point number.
    Numeric,
    /// `true` or `false`, any case.
    Boolean,
    /// The literal `none`, any case.
    None,
    Text,
}

impl CellKind {
    /// Classify a non-missing cell.
    pub fn classify(value: &str) -> Self {
        let value = value.trim();

        if value.parse::<i64>().is_ok() || value.parse::<f64>().is_ok() {
            return CellKind::Numeric;
        }

        match value.to_lowercase().as_str() {
            "true" | "false" => CellKind::Boolean,
            "none" => CellKind::None,
            _ => CellKind::Text,
        }
    }
}

/// Returns true if the cell counts as a missing value.
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || MISSING_MARKERS.contains(&value)
}

/// Parse a separator option into a single byte.
pub fn parse_separator(separator: &str) -> Result<u8, SurveyError> {
    match separator.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ if separator == "\\t" => Ok(b'\t'),
        _ => Err(SurveyError::InvalidSeparator(separator.to_string())),
    }
}

/// Reject multipliers that would invert or erase the outlier fences.
pub fn check_iqr_multiplier(multiplier: f64) -> Result<f64, SurveyError> {
    if multiplier.is_finite() && multiplier >= 0.0 {
        Ok(multiplier)
    } else {
        Err(SurveyError::InvalidIqrMultiplier(multiplier))
    }
}

/// Runs data-quality checks over an in-memory table.
#[derive(Debug, Clone)]
pub struct DataQualityChecker {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    iqr_multiplier: f64,
}

impl DataQualityChecker {
    /// Load a table from a delimited file.
    pub fn from_path(path: &Path, separator: u8) -> Result<Self, SurveyError> {
        info!("Loading table from: {}", path.display());

        let file = std::fs::File::open(path).map_err(|source| SurveyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(file, separator, &path.display().to_string()).map_err(|source| {
            SurveyError::Csv {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Load a table from any reader. `source` names the data in the report.
    pub fn from_reader<R: Read>(reader: R, separator: u8, source: &str) -> csv::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            // Short rows are padded so that absent cells count as missing.
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }

        debug!("Loaded {} rows x {} columns", rows.len(), headers.len());

        Ok(Self {
            source: source.to_string(),
            headers,
            rows,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        })
    }

    /// Use `multiplier` times the IQR as outlier fence distance.
    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows whose value class deviates from the column's dominant class.
    ///
    /// Columns with a single class are omitted. Ties for the dominant class
    /// go to the class that appears first.
    pub fn check_uniformity(&self) -> BTreeMap<String, Vec<usize>> {
        let mut report = BTreeMap::new();

        for (col, header) in self.headers.iter().enumerate() {
            let kinds: Vec<(usize, CellKind)> = self
                .column(col)
                .filter(|(_, value)| !is_missing(value))
                .map(|(row, value)| (row, CellKind::classify(value)))
                .collect();

            let mut counts: Vec<(CellKind, usize)> = Vec::new();
            for (_, kind) in &kinds {
                match counts.iter_mut().find(|(k, _)| k == kind) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((*kind, 1)),
                }
            }

            if counts.len() <= 1 {
                continue;
            }

            let mut dominant = counts[0];
            for entry in &counts[1..] {
                if entry.1 > dominant.1 {
                    dominant = *entry;
                }
            }

            let deviating: Vec<usize> = kinds
                .iter()
                .filter(|(_, kind)| *kind != dominant.0)
                .map(|(row, _)| *row)
                .collect();

            debug!(
                "Column '{}' is not uniform: {} deviating rows",
                header,
                deviating.len()
            );
            report.insert(header.clone(), deviating);
        }

        report
    }

    /// Groups of identical rows, ordered by first occurrence.
    pub fn check_duplicates(&self) -> Vec<Vec<usize>> {
        let mut first_seen: HashMap<&[String], usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (idx, row) in self.rows.iter().enumerate() {
            match first_seen.get(row.as_slice()) {
                Some(&group) => groups[group].push(idx),
                None => {
                    first_seen.insert(row.as_slice(), groups.len());
                    groups.push(vec![idx]);
                }
            }
        }

        groups.retain(|group| group.len() > 1);
        groups
    }

    /// Rows with at least one missing cell.
    pub fn check_missing_values(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|value| is_missing(value)))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Rows outside the IQR fences, for every numeric column.
    ///
    /// A column is numeric when all of its non-missing cells parse as numbers
    /// and at least one such cell exists.
    pub fn check_outliers(&self) -> BTreeMap<String, Vec<usize>> {
        let mut report = BTreeMap::new();

        for (col, header) in self.headers.iter().enumerate() {
            let Some(values) = self.numeric_column(col) else {
                continue;
            };

            let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
            sorted.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile(&sorted, 0.25);
            let q3 = quantile(&sorted, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - self.iqr_multiplier * iqr;
            let upper = q3 + self.iqr_multiplier * iqr;

            let outliers: Vec<usize> = values
                .iter()
                .filter(|(_, v)| *v < lower || *v > upper)
                .map(|(row, _)| *row)
                .collect();

            debug!(
                "Column '{}': Q1={} Q3={} fences=[{}, {}] outliers={}",
                header,
                q1,
                q3,
                lower,
                upper,
                outliers.len()
            );
            report.insert(header.clone(), outliers);
        }

        report
    }

    /// Run every check.
    pub fn generate_report(&self) -> QualityReport {
        QualityReport {
            source: self.source.clone(),
            row_count: self.rows.len(),
            uniformity: self.check_uniformity(),
            duplicate_rows: self.check_duplicates(),
            missing_value_rows: self.check_missing_values(),
            outliers: self.check_outliers(),
        }
    }

    fn column(&self, col: usize) -> impl Iterator<Item = (usize, &str)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, row)| (idx, row.get(col).map_or("", String::as_str)))
    }

    fn numeric_column(&self, col: usize) -> Option<Vec<(usize, f64)>> {
        let values = self
            .column(col)
            .filter(|(_, value)| !is_missing(value))
            .map(|(row, value)| value.trim().parse::<f64>().ok().map(|v| (row, v)))
            .collect::<Option<Vec<_>>>()?;

        (!values.is_empty()).then_some(values)
    }
}

/// Quantile of sorted data using linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = (n - 1) as f64 * q;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn checker(data: &str) -> DataQualityChecker {
        DataQualityChecker::from_reader(data.as_bytes(), b',', "inline").unwrap()
    }

    fn fixture_checker() -> DataQualityChecker {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("responses.csv");
        DataQualityChecker::from_path(&path, b',').unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(CellKind::classify("42"), CellKind::Numeric);
        assert_eq!(CellKind::classify("-3.5"), CellKind::Numeric);
        assert_eq!(CellKind::classify("TRUE"), CellKind::Boolean);
        assert_eq!(CellKind::classify("false"), CellKind::Boolean);
        assert_eq!(CellKind::classify("None"), CellKind::None);
        assert_eq!(CellKind::classify("hello"), CellKind::Text);
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(""));
        assert!(is_missing("   "));
        assert!(is_missing("NA"));
        assert!(is_missing("null"));
        assert!(!is_missing("none"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_parse_separator() {
        assert_eq!(parse_separator(",").unwrap(), b',');
        assert_eq!(parse_separator(";").unwrap(), b';');
        assert_eq!(parse_separator("\\t").unwrap(), b'\t');
        assert!(parse_separator(",,").is_err());
        assert!(parse_separator("").is_err());
        assert!(parse_separator("é").is_err());
    }

    #[test]
    fn test_check_iqr_multiplier() {
        assert_eq!(check_iqr_multiplier(1.5).unwrap(), 1.5);
        assert_eq!(check_iqr_multiplier(0.0).unwrap(), 0.0);
        assert!(check_iqr_multiplier(-1.0).is_err());
        assert!(check_iqr_multiplier(f64::NAN).is_err());
        assert!(check_iqr_multiplier(f64::INFINITY).is_err());
    }

    #[test]
    fn test_quantile_linear() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&data, 0.25), 1.75);
        assert_eq!(quantile(&data, 0.5), 2.5);
        assert_eq!(quantile(&data, 0.75), 3.25);
        assert_eq!(quantile(&[7.0], 0.25), 7.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_fixture_report() {
        let checker = fixture_checker();
        assert_eq!(checker.headers(), ["name", "age", "score", "member"]);
        assert_eq!(checker.row_count(), 7);

        let report = checker.generate_report();
        assert_eq!(report.row_count, 7);
        assert!(report.source.ends_with("responses.csv"));

        assert_eq!(report.uniformity.len(), 2);
        assert_eq!(report.uniformity.get("score"), Some(&vec![3]));
        assert_eq!(report.uniformity.get("member"), Some(&vec![5]));

        assert_eq!(report.duplicate_rows, vec![vec![1, 4]]);
        assert_eq!(report.missing_value_rows, vec![2]);

        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers.get("age"), Some(&vec![5]));
        assert!(report.has_findings());
    }

    #[test]
    fn test_uniform_columns_are_omitted() {
        let checker = checker("a,b\n1,x\n2.5,y\n3,z\n");
        assert!(checker.check_uniformity().is_empty());
    }

    #[test]
    fn test_uniformity_tie_goes_to_first_kind() {
        let checker = checker("a\nhello\n1\n");
        assert_eq!(checker.check_uniformity().get("a"), Some(&vec![1]));
    }

    #[test]
    fn test_duplicates_grouped_separately() {
        let checker = checker("a,b\n1,x\n2,y\n1,x\n2,y\n1,x\n3,z\n");
        assert_eq!(checker.check_duplicates(), vec![vec![0, 2, 4], vec![1, 3]]);
    }

    #[test]
    fn test_short_rows_are_missing() {
        let checker = checker("a,b,c\n1,2,3\n4,5\n");
        assert_eq!(checker.check_missing_values(), vec![1]);
    }

    #[test]
    fn test_outliers_numeric_columns_only() {
        let checker = checker("n,t\n10,a\n11,b\n12,c\n13,d\n100,e\n");
        let outliers = checker.check_outliers();
        assert_eq!(outliers.get("n"), Some(&vec![4]));
        assert!(!outliers.contains_key("t"));
    }

    #[test]
    fn test_outlier_multiplier() {
        // Q1 = 11, Q3 = 13, IQR = 2; 100 stays inside fences of 50 * IQR
        let checker = checker("n\n10\n11\n12\n13\n100\n").with_iqr_multiplier(50.0);
        assert_eq!(checker.check_outliers().get("n"), Some(&Vec::new()));
    }

    #[test]
    fn test_semicolon_separator() {
        let checker =
            DataQualityChecker::from_reader("a;b\n1;2\n".as_bytes(), b';', "inline").unwrap();
        assert_eq!(checker.headers(), ["a", "b"]);
        assert!(!checker.generate_report().has_findings());
    }

    #[test]
    fn test_from_path_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = DataQualityChecker::from_path(&temp_dir.path().join("none.csv"), b',')
            .unwrap_err();
        assert!(matches!(err, SurveyError::Io { .. }));
    }

    #[test]
    fn test_empty_table() {
        let checker = checker("a,b\n");
        let report = checker.generate_report();
        assert_eq!(report.row_count, 0);
        assert!(!report.has_findings());
        assert!(report.outliers.is_empty());
    }
}
