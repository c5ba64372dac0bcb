//! Free-text response grouping.
//!
//! Flattens the answers of all free-text questions into one listing and
//! records which contiguous range of the listing belongs to which question.

use crate::models::{Column, FlatResponseItem, FreeTextQuestion, ResponseGroup};

/// Flat listing of free-text answers with per-question group boundaries.
#[derive(Debug, Clone, Default)]
pub struct FreeTextGrouper {
    items: Vec<FlatResponseItem>,
    groups: Vec<ResponseGroup>,
    columns: Vec<Column>,
}

impl FreeTextGrouper {
    /// Build the listing for `questions`, preserving question and answer order.
    pub fn new(questions: &[FreeTextQuestion]) -> Self {
        Self {
            items: flatten_responses(questions),
            groups: response_groups(questions),
            columns: vec![Column::default()],
        }
    }

    /// Replace the display column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns = vec![column];
        self
    }

    /// All answers, question by question.
    pub fn items(&self) -> &[FlatResponseItem] {
        &self.items
    }

    /// One group per input question, including empty ones.
    pub fn groups(&self) -> &[ResponseGroup] {
        &self.groups
    }

    /// Column schema for rendering [`FlatResponseItem::name`].
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the items belonging to `group`.
    pub fn group_items(&self, group: &ResponseGroup) -> &[FlatResponseItem] {
        group.slice(&self.items)
    }

    /// Consume the grouper, returning items, groups and columns.
    pub fn into_parts(self) -> (Vec<FlatResponseItem>, Vec<ResponseGroup>, Vec<Column>) {
        (self.items, self.groups, self.columns)
    }
}

/// Concatenate all answers in question order, then answer order.
///
/// Keys are `"{question_index}-{response_index}"`, unique even when the
/// same answer text appears more than once.
pub fn flatten_responses(questions: &[FreeTextQuestion]) -> Vec<FlatResponseItem> {
    questions
        .iter()
        .enumerate()
        .flat_map(|(q_idx, question)| {
            question
                .responses
                .iter()
                .enumerate()
                .map(move |(r_idx, response)| FlatResponseItem {
                    key: item_key(q_idx, r_idx),
                    name: response.clone(),
                })
        })
        .collect()
}

/// Group boundaries matching [`flatten_responses`].
pub fn response_groups(questions: &[FreeTextQuestion]) -> Vec<ResponseGroup> {
    let mut groups = Vec::with_capacity(questions.len());
    let mut start_index = 0;

    for question in questions {
        let count = question.responses.len();
        groups.push(ResponseGroup {
            label: question.question_text.clone(),
            start_index,
            count,
        });
        start_index += count;
    }

    groups
}

fn item_key(question_index: usize, response_index: usize) -> String {
    format!("{}-{}", question_index, response_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn question(text: &str, responses: &[&str]) -> FreeTextQuestion {
        FreeTextQuestion {
            question_text: text.to_string(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn assert_groups_cover_items(questions: &[FreeTextQuestion]) {
        let grouper = FreeTextGrouper::new(questions);

        let total: usize = grouper.groups().iter().map(|g| g.count).sum();
        assert_eq!(total, grouper.items().len());

        for (group, question) in grouper.groups().iter().zip(questions) {
            let names: Vec<_> = grouper
                .group_items(group)
                .iter()
                .map(|item| item.name.clone())
                .collect();
            assert_eq!(names, question.responses);
        }
    }

    #[test]
    fn test_flatten_preserves_order() {
        let questions = vec![question("A", &["a1", "a2"]), question("B", &["b1"])];
        let grouper = FreeTextGrouper::new(&questions);

        let names: Vec<_> = grouper.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_groups_track_start_index() {
        let questions = vec![
            question("A", &["a1", "a2"]),
            question("B", &["b1"]),
            question("C", &["c1", "c2", "c3"]),
        ];
        let groups = response_groups(&questions);

        assert_eq!(groups.len(), 3);
        assert_eq!((groups[0].start_index, groups[0].count), (0, 2));
        assert_eq!((groups[1].start_index, groups[1].count), (2, 1));
        assert_eq!((groups[2].start_index, groups[2].count), (3, 3));
        assert_eq!(groups[2].label, "C");
        assert_groups_cover_items(&questions);
    }

    #[test]
    fn test_empty_group_is_kept() {
        let questions = vec![
            question("A", &["a1"]),
            question("Empty", &[]),
            question("C", &["c1", "c2"]),
        ];
        let grouper = FreeTextGrouper::new(&questions);
        let groups = grouper.groups();

        assert_eq!(groups.len(), 3);
        assert!(groups[1].is_empty());
        assert_eq!(groups[1].start_index, 1);
        assert_eq!(groups[2].start_index, 1);
        assert!(grouper.group_items(&groups[1]).is_empty());
        assert_groups_cover_items(&questions);
    }

    #[test]
    fn test_keys_unique_for_duplicate_answers() {
        let questions = vec![
            question("A", &["same", "same"]),
            question("B", &["same"]),
        ];
        let items = flatten_responses(&questions);

        let keys: HashSet<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(items[0].key, "0-0");
        assert_eq!(items[1].key, "0-1");
        assert_eq!(items[2].key, "1-0");
    }

    #[test]
    fn test_keys_are_deterministic() {
        let questions = vec![question("A", &["x", "y"])];
        assert_eq!(flatten_responses(&questions), flatten_responses(&questions));
    }

    #[test]
    fn test_no_questions() {
        let grouper = FreeTextGrouper::new(&[]);
        assert!(grouper.items().is_empty());
        assert!(grouper.groups().is_empty());
        assert_eq!(grouper.columns().len(), 1);
    }

    #[test]
    fn test_columns_are_fixed() {
        let first = FreeTextGrouper::new(&[question("A", &["x"])]);
        let second = FreeTextGrouper::new(&[]);
        assert_eq!(first.columns(), second.columns());
        assert_eq!(first.columns()[0].name, "Text answers");
    }

    #[test]
    fn test_with_column_overrides_header() {
        let column = Column {
            name: "Antworten".to_string(),
            ..Column::default()
        };
        let grouper = FreeTextGrouper::new(&[]).with_column(column);
        assert_eq!(grouper.columns()[0].name, "Antworten");
        assert_eq!(grouper.columns()[0].field_name, "name");
    }

    #[test]
    fn test_into_parts() {
        let grouper = FreeTextGrouper::new(&[question("A", &["x"]), question("B", &[])]);
        let (items, groups, columns) = grouper.into_parts();
        assert_eq!(items.len(), 1);
        assert_eq!(groups.len(), 2);
        assert_eq!(columns.len(), 1);
    }
}
