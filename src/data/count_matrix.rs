//! Count matrix representation for RNA-seq data

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DgeError, Result};

/// Raw read counts, rows are genes and columns are samples
#[derive(Debug, Clone)]
pub struct CountMatrix {
    counts: Array2<u64>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
}

fn check_unique(ids: &[String], kind: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(DgeError::DuplicateId {
                kind: kind.to_string(),
                id: id.clone(),
            });
        }
    }
    Ok(())
}

impl CountMatrix {
    /// Create a new count matrix, validating dimensions and id uniqueness
    pub fn new(counts: Array2<u64>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (n_genes, n_samples) = counts.dim();

        if gene_ids.len() != n_genes {
            return Err(DgeError::InvalidInput {
                reason: format!("expected {} gene IDs, got {}", n_genes, gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(DgeError::InvalidInput {
                reason: format!("expected {} sample IDs, got {}", n_samples, sample_ids.len()),
            });
        }

        check_unique(&gene_ids, "gene")?;
        check_unique(&sample_ids, "sample")?;

        Ok(Self {
            counts,
            gene_ids,
            sample_ids,
        })
    }

    pub fn n_genes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.counts.ncols()
    }

    pub fn counts(&self) -> ArrayView2<'_, u64> {
        self.counts.view()
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Counts for one gene across all samples
    pub fn gene_counts(&self, gene_idx: usize) -> ArrayView1<'_, u64> {
        self.counts.row(gene_idx)
    }

    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Total counts per sample (library size)
    pub fn library_sizes(&self) -> Vec<u64> {
        self.counts.axis_iter(Axis(1)).map(|col| col.sum()).collect()
    }

    /// Counts as floating point, for the model collaborators
    pub fn to_f64(&self) -> Array2<f64> {
        self.counts.mapv(|x| x as f64)
    }

    /// Subset to specific genes, keeping their order
    pub fn subset_genes(&self, gene_indices: &[usize]) -> Result<Self> {
        let new_counts = self.counts.select(Axis(0), gene_indices);
        let new_gene_ids: Vec<String> = gene_indices
            .iter()
            .map(|&i| self.gene_ids[i].clone())
            .collect();

        Self::new(new_counts, new_gene_ids, self.sample_ids.clone())
    }

    /// Reorder (or subset) samples to match `sample_ids` exactly
    pub fn reorder_samples(&self, sample_ids: &[String]) -> Result<Self> {
        let indices = sample_ids
            .iter()
            .map(|id| {
                self.sample_index(id).ok_or_else(|| DgeError::SampleMismatch {
                    reason: format!("sample '{}' not present in count matrix", id),
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        Self::new(
            self.counts.select(Axis(1), &indices),
            self.gene_ids.clone(),
            sample_ids.to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_count_matrix_creation() {
        let counts = array![[10, 20, 30], [5, 15, 25]];
        let matrix = CountMatrix::new(counts, ids("gene", 2), ids("s", 3)).unwrap();
        assert_eq!(matrix.n_genes(), 2);
        assert_eq!(matrix.n_samples(), 3);
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let counts = array![[1, 2], [3, 4]];
        let genes = vec!["ENSMUSG01".to_string(), "ENSMUSG01".to_string()];
        let err = CountMatrix::new(counts, genes, ids("s", 2)).unwrap_err();
        assert!(matches!(err, DgeError::DuplicateId { .. }));
    }

    #[test]
    fn test_library_sizes() {
        let counts = array![[10, 20], [5, 15]];
        let matrix = CountMatrix::new(counts, ids("gene", 2), ids("s", 2)).unwrap();
        assert_eq!(matrix.library_sizes(), vec![15, 35]);
    }

    #[test]
    fn test_reorder_samples_by_identifier() {
        let counts = array![[1, 2, 3]];
        let matrix = CountMatrix::new(counts, ids("gene", 1), ids("s", 3)).unwrap();
        let order = vec!["s3".to_string(), "s1".to_string(), "s2".to_string()];
        let reordered = matrix.reorder_samples(&order).unwrap();
        assert_eq!(reordered.sample_ids(), order.as_slice());
        assert_eq!(reordered.gene_counts(0).to_vec(), vec![3, 1, 2]);

        let missing = vec!["s9".to_string()];
        assert!(matrix.reorder_samples(&missing).is_err());
    }
}
