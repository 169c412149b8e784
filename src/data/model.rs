use crate::data::schema::Metric;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Column – one named numeric sequence
// ---------------------------------------------------------------------------

/// A single named column. Missing cells are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    /// Values with missing cells dropped, in row order.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded table
// ---------------------------------------------------------------------------

/// A named table of equally long numeric columns, kept in CSV column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Identifier derived from the source (usually the file stem).
    pub name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Dataset {
            name: name.into(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Append a column. The first column fixes the row count; every later
    /// column must match it.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.rows {
            return Err(Error::ColumnLength {
                dataset: self.name.clone(),
                column: name,
                expected: self.rows,
                actual: values.len(),
            });
        }
        self.rows = values.len();
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Typed lookup for a benchmark column.
    pub fn metric(&self, metric: Metric) -> Result<&Column> {
        self.column(metric.as_str())
            .ok_or_else(|| Error::MissingColumn {
                dataset: self.name.clone(),
                column: metric.as_str().to_string(),
            })
    }

    /// First row of a benchmark column, e.g. the pool size or chunk count
    /// that stays constant for a run.
    pub fn first_value(&self, metric: Metric) -> Result<f64> {
        self.metric(metric)?
            .values
            .first()
            .copied()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| Error::EmptyColumn {
                dataset: self.name.clone(),
                column: metric.as_str().to_string(),
            })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Keep only the rows for which `keep` returns true. The closure gets the
    /// dataset and the row index.
    pub fn retain_rows<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Dataset, usize) -> bool,
    {
        let kept: Vec<usize> = (0..self.rows).filter(|&row| keep(self, row)).collect();
        Dataset {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: kept.iter().map(|&row| c.values[row]).collect(),
                })
                .collect(),
            rows: kept.len(),
        }
    }

    /// Keep only the columns whose name passes `keep`. The row count is
    /// unchanged even if no column is left.
    pub fn retain_columns<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&str) -> bool,
    {
        Dataset {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| keep(&c.name))
                .cloned()
                .collect(),
            rows: self.rows,
        }
    }

    /// Stack `other` below `self`. The result has the union of both column
    /// sets (columns of `self` first); cells a table does not have are
    /// missing.
    pub fn concat_rows(&self, other: &Dataset) -> Dataset {
        let mut names: Vec<&str> = self.column_names().collect();
        for name in other.column_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let mut values = Vec::with_capacity(self.rows + other.rows);
                for table in [self, other] {
                    match table.column(name) {
                        Some(c) => values.extend_from_slice(&c.values),
                        None => values.extend(std::iter::repeat(f64::NAN).take(table.rows)),
                    }
                }
                Column {
                    name: name.to_string(),
                    values,
                }
            })
            .collect();

        Dataset {
            name: self.name.clone(),
            columns,
            rows: self.rows + other.rows,
        }
    }
}
