//! Sources of gene identifier mappings

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::data::Table;
use crate::error::{DgeError, Result};
use crate::io::read_table;

/// Which annotation attributes to fetch for which identifier type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationQuery {
    /// BioMart dataset, e.g. `mmusculus_gene_ensembl`
    pub dataset: String,
    /// Attribute the gene ids are matched against
    pub filter: String,
    /// Attributes to return; the filter attribute should be among them
    pub attributes: Vec<String>,
}

impl Default for AnnotationQuery {
    fn default() -> Self {
        Self {
            dataset: "mmusculus_gene_ensembl".to_string(),
            filter: "ensembl_gene_id".to_string(),
            attributes: [
                "ensembl_gene_id",
                "mgi_symbol",
                "mgi_description",
                "gene_biotype",
                "entrezgene_id",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl AnnotationQuery {
    pub fn validate(&self) -> Result<()> {
        if !self.attributes.contains(&self.filter) {
            return Err(DgeError::InvalidConfig {
                reason: format!(
                    "annotation attributes must include the filter attribute '{}'",
                    self.filter
                ),
            });
        }
        Ok(())
    }
}

/// Something that can map gene identifiers to annotation attributes.
///
/// Implementations return a table with one column per requested attribute;
/// duplicate identifiers are allowed and resolved by the caller.
pub trait GeneMapSource {
    /// Short name used in error messages and logs
    fn name(&self) -> &str;

    fn fetch(&self, gene_ids: &[String], query: &AnnotationQuery) -> Result<Table>;
}

/// Gene map read from a delimited export on disk (e.g. a saved BioMart result)
#[derive(Debug, Clone)]
pub struct TableGeneMapSource {
    path: PathBuf,
}

impl TableGeneMapSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl GeneMapSource for TableGeneMapSource {
    fn name(&self) -> &str {
        "gene map file"
    }

    fn fetch(&self, gene_ids: &[String], query: &AnnotationQuery) -> Result<Table> {
        let table = read_table(&self.path).map_err(|e| DgeError::GeneMapSource {
            source_name: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let projected = table.select(&query.attributes, "gene map file")?;
        let id_idx = projected.require_column(&query.filter, "gene map file")?;

        let wanted: HashSet<&str> = gene_ids.iter().map(String::as_str).collect();
        Ok(projected.filter_rows(|row| {
            row[id_idx]
                .as_text()
                .map_or(false, |id| wanted.contains(id.as_str()))
        }))
    }
}
