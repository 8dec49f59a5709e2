use std::collections::HashSet;

use crate::domain::schema::{EntityKind, EntitySchema};
use crate::domain::value::Value;
use crate::error::{PipelineError, Result};

pub type Row = Vec<Value>;

/// An in-memory entity table: ordered columns and rows of typed cells.
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub entity: EntityKind,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(entity: EntityKind, columns: Vec<String>) -> Self {
        Self {
            entity,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.entity.schema()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index`, but a missing column is an error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| PipelineError::MissingColumn {
            entity: self.entity.to_string(),
            column: name.to_string(),
        })
    }

    pub fn push_row(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a Value> {
        self.column_index(column).and_then(|idx| row.get(idx))
    }

    /// Distinct non-null values of a column, used as a parent key set
    pub fn key_set(&self, column: &str) -> Result<HashSet<String>> {
        let idx = self.require_column(column)?;
        Ok(self.rows.iter().filter_map(|row| row[idx].key()).collect())
    }

    /// Append a column, computing each cell from the existing row
    pub fn add_column<F>(&mut self, name: &str, mut compute: F)
    where
        F: FnMut(&Table, &Row) -> Value,
    {
        let this: &Table = self;
        let values: Vec<Value> = this.rows.iter().map(|row| compute(this, row)).collect();
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Keep only rows matching the predicate, returning how many were removed
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }
}
