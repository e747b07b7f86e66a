//! Generic gene-indexed table used for annotated results and gene maps

use std::fmt;

use serde::Serialize;

use crate::error::{DgeError, Result};

/// A single table value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Int(u64),
    Num(f64),
    Text(String),
}

impl Cell {
    /// Parse a text field; empty and `NA` become `Null`
    pub fn from_field(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() || field == "NA" {
            Cell::Null
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text view of the cell, `None` for nulls
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NA"),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Num(v) => write!(f, "{:.6}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

fn check_unique_columns(columns: &[String]) -> Result<()> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(DgeError::DuplicateId {
                kind: "column".to_string(),
                id: column.clone(),
            });
        }
    }
    Ok(())
}

/// Column names plus row-major cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        check_unique_columns(&columns)?;
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "table row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    columns.len()
                ),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like `column_index` but fails with a `MissingColumn` error
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| DgeError::missing_column(table, name))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Values of a column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Same cells under new column names
    pub fn with_columns(self, columns: Vec<String>) -> Result<Self> {
        check_unique_columns(&columns)?;
        if columns.len() != self.columns.len() {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "cannot rename {} columns with {} names",
                    self.columns.len(),
                    columns.len()
                ),
            });
        }
        Ok(Self {
            columns,
            rows: self.rows,
        })
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[String], table: &str) -> Result<Self> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n, table))
            .collect::<Result<Vec<usize>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Self::new(names.to_vec(), rows)
    }

    /// Keep rows for which `keep` returns true
    pub fn filter_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[Cell]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Append the rows of another table with identical columns
    pub fn append(&mut self, other: Table) -> Result<()> {
        if other.columns != self.columns {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "cannot append table with columns [{}] to [{}]",
                    other.columns.join(", "),
                    self.columns.join(", ")
                ),
            });
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}
