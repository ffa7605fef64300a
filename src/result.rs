//! Materialized statement results

use serde::Serialize;
use serde_json::Value;

/// Result of one statement
///
/// Row-producing statements fill `columns` and `rows`. Other statements leave
/// both empty and report the number of affected rows instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    affected_rows: u64,
}

impl ResultSet {
    /// Result of a row-producing statement
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
        }
    }

    /// Result of a statement that produced no rows
    pub fn with_affected_rows(affected_rows: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows,
        }
    }

    /// Column names, in select-list order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows changed by an INSERT/UPDATE/DELETE
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// True if the statement had a select list
    pub fn is_query_result(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Position of a column by name (ASCII case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Value at `row`, `column`
    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Value of the named column in `row`
    pub fn get_by_name(&self, row: usize, column: &str) -> Option<&Value> {
        self.column_index(column).and_then(|c| self.get(row, c))
    }

    /// First column of the first row
    pub fn first_value(&self) -> Option<&Value> {
        self.get(0, 0)
    }

    /// Consume into rows
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

impl IntoIterator for ResultSet {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
