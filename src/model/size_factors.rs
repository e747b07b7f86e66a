//! Size factor estimation using the median of ratios method

use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};

use crate::error::{DgeError, Result};

/// Method for size factor estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFactorMethod {
    /// Standard median of ratios over genes with no zero count
    #[default]
    Ratio,
    /// Geometric means over positive counts only, for sparse data
    PosCounts,
}

fn size_factor_error(reason: String) -> DgeError {
    DgeError::ExternalModel {
        stage: "size factor estimation".to_string(),
        reason,
    }
}

/// Estimate one scale factor per sample (column) of `counts`
pub fn estimate_size_factors(counts: ArrayView2<f64>, method: SizeFactorMethod) -> Result<Array1<f64>> {
    let (n_genes, n_samples) = counts.dim();

    if n_genes == 0 || n_samples == 0 {
        return Err(DgeError::EmptyData {
            reason: "Count matrix is empty".to_string(),
        });
    }

    // Log geometric mean per gene; genes without a usable mean are skipped
    let log_geo_means: Vec<(usize, f64)> = counts
        .axis_iter(Axis(0))
        .enumerate()
        .filter_map(|(i, row)| match method {
            SizeFactorMethod::Ratio => row
                .iter()
                .all(|&x| x > 0.0)
                .then(|| (i, row.iter().map(|x| x.ln()).sum::<f64>() / n_samples as f64)),
            SizeFactorMethod::PosCounts => {
                let log_sum: f64 = row.iter().filter(|&&x| x > 0.0).map(|x| x.ln()).sum();
                // divide by all samples, not just the positive ones
                row.iter().any(|&x| x > 0.0).then(|| (i, log_sum / n_samples as f64))
            }
        })
        .collect();

    if log_geo_means.is_empty() {
        return Err(size_factor_error(match method {
            SizeFactorMethod::Ratio => {
                "every gene contains a zero; try the poscounts method".to_string()
            }
            SizeFactorMethod::PosCounts => "no genes with positive counts".to_string(),
        }));
    }

    let mut size_factors = Array1::zeros(n_samples);

    for j in 0..n_samples {
        let log_ratios: Vec<f64> = log_geo_means
            .iter()
            .filter(|&&(i, _)| counts[[i, j]] > 0.0)
            .map(|&(i, log_geo)| counts[[i, j]].ln() - log_geo)
            .collect();

        size_factors[j] = if log_ratios.is_empty() {
            match method {
                SizeFactorMethod::Ratio => {
                    return Err(size_factor_error(format!("no valid ratios for sample {}", j)))
                }
                SizeFactorMethod::PosCounts => 1.0,
            }
        } else {
            Data::new(log_ratios).median().exp()
        };
    }

    if method == SizeFactorMethod::PosCounts {
        // rescale to geometric mean one
        let log_mean = size_factors.iter().map(|x: &f64| x.ln()).sum::<f64>() / n_samples as f64;
        size_factors.mapv_inplace(|x| x / log_mean.exp());
    }

    if size_factors.iter().any(|&x| x <= 0.0 || !x.is_finite()) {
        return Err(size_factor_error("invalid size factors computed".to_string()));
    }

    Ok(size_factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ratio_recovers_depth() {
        // second sample sequenced twice as deep
        let counts = array![[10.0, 20.0], [30.0, 60.0], [50.0, 100.0]];
        let sf = estimate_size_factors(counts.view(), SizeFactorMethod::Ratio).unwrap();
        assert!((sf[1] / sf[0] - 2.0).abs() < 1e-10);
        assert!((sf[0] * sf[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_ratio_needs_a_gene_without_zeros() {
        let counts = array![[0.0, 20.0], [30.0, 0.0]];
        assert!(estimate_size_factors(counts.view(), SizeFactorMethod::Ratio).is_err());
        let sf = estimate_size_factors(counts.view(), SizeFactorMethod::PosCounts).unwrap();
        assert!(sf.iter().all(|&x| x > 0.0 && x.is_finite()));
    }
}
