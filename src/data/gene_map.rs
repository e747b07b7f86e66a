//! Gene identifier to annotation attribute mapping

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Table;
use crate::error::{DgeError, Result};

/// What to do with repeated identifiers when building a [`GeneMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first row for each identifier
    #[default]
    FirstWins,
    /// Fail with the number of duplicates found
    Reject,
}

/// Annotation attributes keyed by a unique gene identifier
#[derive(Debug, Clone)]
pub struct GeneMap {
    id_column: String,
    attributes: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    index: HashMap<String, usize>,
}

impl GeneMap {
    /// Build a gene map from a table. Rows with a null identifier are skipped.
    pub fn from_table(table: &Table, id_column: &str, policy: DuplicatePolicy) -> Result<Self> {
        let id_idx = table.require_column(id_column, "gene map")?;

        let attributes: Vec<String> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_idx)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::new();
        let mut index = HashMap::new();
        let mut n_duplicates = 0usize;

        for row in table.rows() {
            let Some(id) = row[id_idx].as_text() else {
                continue;
            };
            if index.contains_key(&id) {
                n_duplicates += 1;
                continue;
            }
            let values: Vec<Option<String>> = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != id_idx)
                .map(|(_, c)| c.as_text())
                .collect();
            index.insert(id, rows.len());
            rows.push(values);
        }

        if n_duplicates > 0 {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(DgeError::DuplicateGeneMapIds {
                        column: id_column.to_string(),
                        n_duplicates,
                    });
                }
                DuplicatePolicy::FirstWins => {
                    log::warn!(
                        "Gene map had {} duplicate '{}' row(s); kept the first occurrence of each",
                        n_duplicates,
                        id_column
                    );
                }
            }
        }

        Ok(Self {
            id_column: id_column.to_string(),
            attributes,
            rows,
            index,
        })
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Attribute column names, excluding the id column
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, gene_id: &str) -> bool {
        self.index.contains_key(gene_id)
    }

    /// Attribute values for a gene, in `attributes()` order
    pub fn get(&self, gene_id: &str) -> Option<&[Option<String>]> {
        self.index.get(gene_id).map(|&i| self.rows[i].as_slice())
    }
}
