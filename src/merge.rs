//! Column selection across several loaded tables.

use std::collections::BTreeMap;
use std::fmt;

use crate::data::model::Dataset;

/// Separator between the source name and the column name in a request.
pub const REFERENCE_SEPARATOR: char = ':';

/// Name of the table produced by [`merge`].
pub const MERGED_NAME: &str = "merged";

// ---------------------------------------------------------------------------
// ColumnReference – a parsed `source:column` token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    /// `None` when the token had no separator.
    pub source: Option<String>,
    pub column: String,
}

impl ColumnReference {
    /// Split once on the first `:`. Everything after it, including further
    /// separators, is the column name.
    pub fn parse(token: &str) -> Self {
        match token.split_once(REFERENCE_SEPARATOR) {
            Some((source, column)) => ColumnReference {
                source: Some(source.to_string()),
                column: column.to_string(),
            },
            None => ColumnReference {
                source: None,
                column: token.to_string(),
            },
        }
    }

    /// Column name in the merged output: `source_column`.
    pub fn output_name(&self) -> String {
        match &self.source {
            Some(source) => format!("{source}_{}", self.column),
            None => self.column.clone(),
        }
    }
}

impl fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{source}{REFERENCE_SEPARATOR}{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

/// Copy the requested columns, in request order, into a new table.
///
/// Requests that do not resolve are logged and skipped. The first copied
/// column fixes the row count of the result: later columns are truncated to
/// it or padded with missing cells.
pub fn merge(datasets: &BTreeMap<String, Dataset>, requests: &[String]) -> Dataset {
    let mut merged = Dataset::new(MERGED_NAME);
    let mut rows: Option<usize> = None;

    for token in requests {
        let reference = ColumnReference::parse(token);
        log::debug!("Processing {reference}");

        let Some(source) = reference.source.as_deref() else {
            log::warn!("'{token}' has no source prefix (expected source{REFERENCE_SEPARATOR}column). Skipping...");
            continue;
        };
        let Some(dataset) = datasets.get(source) else {
            log::warn!("No CSV file found with name '{source}'. Skipping...");
            continue;
        };
        let Some(column) = dataset.column(&reference.column) else {
            log::warn!(
                "Column '{}' not found in file '{source}'. Skipping...",
                reference.column
            );
            continue;
        };

        let target = *rows.get_or_insert(column.values.len());
        let mut values: Vec<f64> = column.values.iter().copied().take(target).collect();
        values.resize(target, f64::NAN);

        let name = reference.output_name();
        if merged.column(&name).is_some() {
            log::warn!("Column '{name}' requested twice. Skipping...");
            continue;
        }
        if let Err(e) = merged.push_column(name, values) {
            log::warn!("{e}. Skipping...");
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> BTreeMap<String, Dataset> {
        let mut a = Dataset::new("A");
        a.push_column("x", vec![1.0, 2.0, 3.0]).unwrap();
        a.push_column("y", vec![4.0, 5.0, 6.0]).unwrap();
        let mut b = Dataset::new("B");
        b.push_column("z", vec![7.0, 8.0]).unwrap();
        b.push_column("w", vec![1.0, 1.0]).unwrap();

        [a, b].into_iter().map(|d| (d.name.clone(), d)).collect()
    }

    fn requests(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            ColumnReference::parse("A:x"),
            ColumnReference {
                source: Some("A".into()),
                column: "x".into()
            }
        );
        assert_eq!(ColumnReference::parse("run_1:a:b").column, "a:b");
        assert_eq!(ColumnReference::parse("plain_name").source, None);
    }

    #[test]
    fn test_copies_column_under_prefixed_name() {
        let merged = merge(&inputs(), &requests(&["A:x"]));
        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["A_x"]);
        assert_eq!(merged.column("A_x").unwrap().values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_unknown_source_and_column_are_skipped() {
        let merged = merge(&inputs(), &requests(&["C:x", "A:nope", "A:y", "x"]));
        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["A_y"]);
    }

    #[test]
    fn test_keeps_request_order() {
        let merged = merge(&inputs(), &requests(&["A:y", "A:x"]));
        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["A_y", "A_x"]);
    }

    #[test]
    fn test_nothing_resolved_gives_empty_table() {
        let merged = merge(&inputs(), &requests(&["missing:col"]));
        assert_eq!(merged.width(), 0);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_columns_aligned_to_first() {
        let merged = merge(&inputs(), &requests(&["B:z", "A:x"]));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.column("A_x").unwrap().values, vec![1.0, 2.0]);

        let merged = merge(&inputs(), &requests(&["A:x", "B:z"]));
        let z = &merged.column("B_z").unwrap().values;
        assert_eq!(&z[..2], &[7.0, 8.0]);
        assert!(z[2].is_nan());
    }
}
