//! Gene annotation: identifier mapping sources, left join and column names

mod biomart;
mod canonical;
mod join;
mod source;

use serde::{Deserialize, Serialize};

use crate::data::DuplicatePolicy;
use crate::error::Result;

pub use biomart::{build_query_xml, parse_response, BiomartClient, BiomartConfig};
pub use canonical::{canonical_column_name, canonicalize_columns, names_equivalent, CANONICAL_COLUMNS};
pub use join::annotate;
pub use source::{AnnotationQuery, GeneMapSource, TableGeneMapSource};

/// Annotation settings of the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub query: AnnotationQuery,
    /// Handling of repeated ids returned by the source
    pub duplicates: DuplicatePolicy,
    /// Name of the gene id column in result tables before canonicalization
    pub results_id_column: String,
    pub biomart: BiomartConfig,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            query: AnnotationQuery::default(),
            duplicates: DuplicatePolicy::FirstWins,
            results_id_column: "ensembl_gene_id".to_string(),
            biomart: BiomartConfig::default(),
        }
    }
}

impl AnnotationConfig {
    pub fn validate(&self) -> Result<()> {
        self.query.validate()?;
        self.biomart.validate()
    }
}
