//! Principal component analysis of samples on the most variable genes

use std::cmp::Ordering;

use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::data::ExpressionMatrix;
use crate::error::{DgeError, Result};

/// First two principal components of the samples
#[derive(Debug, Clone, Serialize)]
pub struct PcaResult {
    pub sample_ids: Vec<String>,
    pub pc1: Vec<f64>,
    pub pc2: Vec<f64>,
    /// Fraction of total variance explained by PC1 and PC2 (0..=1)
    pub percent_variance: [f64; 2],
    pub n_genes_used: usize,
}

fn pca_error(reason: String) -> DgeError {
    DgeError::ExternalModel {
        stage: "principal component analysis".to_string(),
        reason,
    }
}

/// PCA over the `ntop` genes with the highest variance across samples.
///
/// Genes are centered, the samples x genes matrix is decomposed by SVD and
/// sample coordinates are `U * S`.
pub fn principal_components(matrix: &ExpressionMatrix, ntop: usize) -> Result<PcaResult> {
    let n_samples = matrix.n_samples();
    let n_genes = matrix.n_genes();

    if n_samples < 2 {
        return Err(pca_error(format!("need at least 2 samples, got {}", n_samples)));
    }
    if n_genes == 0 || ntop == 0 {
        return Err(pca_error("no genes to analyze".to_string()));
    }

    let variances: Vec<f64> = (0..n_genes)
        .into_par_iter()
        .map(|i| matrix.gene_values(i).iter().variance())
        .collect();

    let mut top: Vec<usize> = (0..n_genes).collect();
    top.sort_by(|&a, &b| {
        variances[b]
            .partial_cmp(&variances[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    top.truncate(ntop.min(n_genes));

    let data = matrix.data();
    let means: Vec<f64> = top.iter().map(|&g| data.row(g).iter().mean()).collect();
    let centered = DMatrix::from_fn(n_samples, top.len(), |s, k| data[[top[k], s]] - means[k]);

    let svd = centered.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| pca_error("SVD did not produce left singular vectors".to_string()))?;
    let singular = svd.singular_values;

    let mut order: Vec<usize> = (0..singular.len()).collect();
    order.sort_by(|&a, &b| singular[b].partial_cmp(&singular[a]).unwrap_or(Ordering::Equal));

    let total: f64 = singular.iter().map(|s| s * s).sum();
    if total <= f64::EPSILON {
        return Err(pca_error("selected genes have no variance across samples".to_string()));
    }

    let component = |rank: usize| -> (Vec<f64>, f64) {
        match order.get(rank) {
            Some(&c) => (
                u.column(c).iter().map(|x| x * singular[c]).collect(),
                singular[c] * singular[c] / total,
            ),
            None => (vec![0.0; n_samples], 0.0),
        }
    };
    let (pc1, var1) = component(0);
    let (pc2, var2) = component(1);

    Ok(PcaResult {
        sample_ids: matrix.sample_ids().to_vec(),
        pc1,
        pc2,
        percent_variance: [var1, var2],
        n_genes_used: top.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn strings(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_two_groups_separate_on_pc1() {
        let data = array![
            [2.0, 2.1, 1.9, 8.0, 8.1, 7.9],
            [9.0, 9.2, 8.8, 3.0, 3.1, 2.9],
            [5.0, 5.1, 4.9, 5.0, 5.2, 4.8],
            [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        ];
        let m = ExpressionMatrix::new(data, strings("G", 4), strings("s", 6)).unwrap();
        let pca = principal_components(&m, 500).unwrap();

        assert_eq!(pca.n_genes_used, 4);
        assert!(pca.percent_variance[0] > 0.9);
        assert!(pca.percent_variance[0] + pca.percent_variance[1] <= 1.0 + 1e-12);

        let group_a = pca.pc1[0].signum();
        assert!(pca.pc1[..3].iter().all(|x| x.signum() == group_a));
        assert!(pca.pc1[3..].iter().all(|x| x.signum() == -group_a));
    }

    #[test]
    fn test_ntop_limits_genes() {
        let data = array![[1.0, 5.0], [2.0, 2.5], [3.0, 3.0]];
        let m = ExpressionMatrix::new(data, strings("G", 3), strings("s", 2)).unwrap();
        let pca = principal_components(&m, 2).unwrap();
        assert_eq!(pca.n_genes_used, 2);
        assert!((pca.percent_variance[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_rejected() {
        let m = ExpressionMatrix::new(array![[1.0]], strings("G", 1), strings("s", 1)).unwrap();
        assert!(principal_components(&m, 10).is_err());
    }
}
