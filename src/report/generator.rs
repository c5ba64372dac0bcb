//! Report generation.
//!
//! This module assembles the survey summary from the aggregation results and
//! renders it, together with an optional data-quality report, as Markdown or
//! JSON. No values are computed here beyond formatting.

use crate::config::ReportConfig;
use crate::models::{
    Digest, FlatResponseItem, QualityReport, QuestionScore, ReportMetadata, ResponseGroup,
    SurveyReport,
};
use crate::survey::{FreeTextGrouper, SurveyAggregator};
use anyhow::Result;
use std::collections::BTreeMap;

/// Collect everything the report shows for the aggregated survey.
pub fn build_survey_report(
    aggregator: &SurveyAggregator,
    grouper: FreeTextGrouper,
    source: &str,
) -> SurveyReport {
    let (items, groups, columns) = grouper.into_parts();

    SurveyReport {
        metadata: ReportMetadata::now(source),
        title: aggregator.title().to_string(),
        created_at: aggregator.created_at(),
        number_of_people: aggregator.number_of_people(),
        happiness_score: aggregator.happiness_score(),
        question_scores: aggregator.question_scores(),
        columns,
        items,
        groups,
    }
}

/// Generate a complete Markdown document.
pub fn generate_markdown_report(digest: &Digest, config: &ReportConfig) -> String {
    let mut output = String::new();

    if let Some(ref survey) = digest.survey {
        output.push_str(&generate_survey_markdown(survey, config));
    }

    if let Some(ref quality) = digest.quality {
        output.push_str(&generate_quality_markdown(quality));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON document.
pub fn generate_json_report(digest: &Digest) -> Result<String> {
    serde_json::to_string_pretty(digest).map_err(Into::into)
}

/// Generate the survey summary section.
pub fn generate_survey_markdown(report: &SurveyReport, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    let title = if report.title.is_empty() {
        "Untitled survey"
    } else {
        report.title.as_str()
    };
    output.push_str(&format!("# 📋 {}\n\n", title));

    output.push_str(&generate_participation_line(report));

    output.push_str(&format!(
        "## 💬 Happiness Score: {} / 100\n\n",
        report.happiness_score
    ));

    if config.include_question_scores {
        output.push_str(&generate_question_scores_section(
            &report.question_scores,
            &config.score_placeholder,
        ));
    }

    output.push_str(&generate_answers_section(report, config));

    output
}

/// "This survey was started on ..." sentence.
fn generate_participation_line(report: &SurveyReport) -> String {
    let mut line = String::new();

    if !report.created_at.is_empty() {
        line.push_str(&format!(
            "This survey was started on {}. ",
            report.created_at
        ));
    }
    line.push_str(&format!(
        "Overall, {} people participated in the survey.\n\n",
        report.number_of_people
    ));

    line
}

/// Generate the per-question score table.
fn generate_question_scores_section(scores: &[QuestionScore], placeholder: &str) -> String {
    if scores.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("### Scores by Question\n\n");
    section.push_str("| Question | Responses | Score |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for score in scores {
        let value = score
            .score
            .map(|s| format!("{:.0}", s.round()))
            .unwrap_or_else(|| placeholder.to_string());
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&score.question_text),
            score.responses,
            value
        ));
    }
    section.push('\n');

    section
}

/// Generate the grouped free-text answers.
fn generate_answers_section(report: &SurveyReport, config: &ReportConfig) -> String {
    let mut section = String::new();

    let heading = report
        .columns
        .first()
        .map_or("Text answers", |column| column.name.as_str());
    section.push_str(&format!("## {}\n\n", heading));

    if report.groups.is_empty() {
        section.push_str("This survey has no free-text questions.\n\n");
        return section;
    }

    let visible: Vec<&ResponseGroup> = report
        .groups
        .iter()
        .filter(|group| config.show_empty_groups || !group.is_empty())
        .collect();

    if visible.is_empty() {
        section.push_str("Nobody answered the free-text questions.\n\n");
        return section;
    }

    for group in visible {
        section.push_str(&generate_group_block(
            group,
            report.group_items(group),
            config.collapse_groups,
        ));
    }

    section
}

/// Generate a single answer group.
fn generate_group_block(
    group: &ResponseGroup,
    items: &[FlatResponseItem],
    collapsed: bool,
) -> String {
    let mut block = String::new();

    let summary = format!("{} ({})", group.label, group.count);
    if collapsed {
        block.push_str(&format!("<details>\n<summary>{}</summary>\n\n", summary));
    } else {
        block.push_str(&format!("### {}\n\n", summary));
    }

    if items.is_empty() {
        block.push_str("*No answers.*\n\n");
    } else {
        for item in items {
            block.push_str(&format!("- {}\n", single_line(&item.name)));
        }
        block.push('\n');
    }

    if collapsed {
        block.push_str("</details>\n\n");
    }

    block
}

/// Generate the data-quality section.
pub fn generate_quality_markdown(report: &QualityReport) -> String {
    let mut section = String::new();

    section.push_str("# 🔎 Data Quality Report\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", report.source));
    section.push_str(&format!("- **Rows Checked:** {}\n\n", report.row_count));

    section.push_str("## Uniformity\n\n");
    section.push_str(&generate_column_rows_table(
        &report.uniformity,
        "Deviating Rows",
        "All columns hold a single kind of value.",
    ));

    section.push_str("## Duplicate Rows\n\n");
    if report.duplicate_rows.is_empty() {
        section.push_str("No duplicate rows.\n\n");
    } else {
        for group in &report.duplicate_rows {
            section.push_str(&format!("- Rows {}\n", join_rows(group)));
        }
        section.push('\n');
    }

    section.push_str("## Missing Values\n\n");
    if report.missing_value_rows.is_empty() {
        section.push_str("No rows with missing values.\n\n");
    } else {
        section.push_str(&format!(
            "Rows with missing values: {}\n\n",
            join_rows(&report.missing_value_rows)
        ));
    }

    section.push_str("## Outliers\n\n");
    section.push_str(&generate_column_rows_table(
        &report.outliers,
        "Outlier Rows",
        "No numeric columns.",
    ));

    section
}

/// Column-to-rows table, or `empty_text` when there are no columns.
fn generate_column_rows_table(
    columns: &BTreeMap<String, Vec<usize>>,
    rows_header: &str,
    empty_text: &str,
) -> String {
    if columns.is_empty() {
        return format!("{}\n\n", empty_text);
    }

    let mut table = String::new();

    table.push_str(&format!("| Column | {} |\n", rows_header));
    table.push_str("|:---|:---|\n");
    for (column, rows) in columns {
        let rows = if rows.is_empty() {
            "none".to_string()
        } else {
            join_rows(rows)
        };
        table.push_str(&format!("| {} | {} |\n", escape_cell(column), rows));
    }
    table.push('\n');

    table
}

/// Generate the report footer.
pub fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by survey-digest v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|row| row.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
