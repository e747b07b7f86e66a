//! Real-valued gene-by-sample matrices returned by expression models

use ndarray::{Array2, ArrayView1};

use super::{Cell, Table};
use crate::error::{DgeError, Result};

/// Normalized or transformed expression values (genes x samples)
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    data: Array2<f64>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
}

impl ExpressionMatrix {
    pub fn new(data: Array2<f64>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (n_genes, n_samples) = data.dim();
        if gene_ids.len() != n_genes || sample_ids.len() != n_samples {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "expression matrix is {}x{} but got {} gene and {} sample IDs",
                    n_genes,
                    n_samples,
                    gene_ids.len(),
                    sample_ids.len()
                ),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(DgeError::InvalidInput {
                reason: "expression values must be finite".to_string(),
            });
        }
        Ok(Self {
            data,
            gene_ids,
            sample_ids,
        })
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_genes(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn gene_values(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.data.row(gene_idx)
    }

    /// Gene-indexed table with `id_column` first and one column per sample
    pub fn to_table(&self, id_column: &str) -> Result<Table> {
        let mut columns = Vec::with_capacity(self.sample_ids.len() + 1);
        columns.push(id_column.to_string());
        columns.extend(self.sample_ids.iter().cloned());

        let rows = self
            .gene_ids
            .iter()
            .zip(self.data.rows())
            .map(|(gene, values)| {
                let mut row = Vec::with_capacity(values.len() + 1);
                row.push(Cell::Text(gene.clone()));
                row.extend(values.iter().map(|&v| Cell::Num(v)));
                row
            })
            .collect();

        Table::new(columns, rows)
    }
}
