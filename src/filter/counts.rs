//! Dual-threshold pre-filtering of low-signal genes

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::CountMatrix;
use crate::error::{DgeError, Result};

/// How a statistic is compared against its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value >= threshold`
    #[default]
    Inclusive,
    /// `value > threshold`
    Strict,
}

impl Comparison {
    fn passes(self, value: u64, threshold: u64) -> bool {
        match self {
            Comparison::Inclusive => value >= threshold,
            Comparison::Strict => value > threshold,
        }
    }
}

/// Thresholds for [`filter_counts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    /// Floor on the total reads of a gene
    pub min_total: u64,
    /// Floor on the total reads once the largest sample is removed
    pub min_signal: u64,
    pub comparison: Comparison,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_total: 500,
            min_signal: 500,
            comparison: Comparison::Inclusive,
        }
    }
}

impl FilterThresholds {
    /// Whether a gene with the given row sum and row max is kept
    pub fn keeps(&self, row_sum: u64, row_max: u64) -> bool {
        self.comparison.passes(row_sum, self.min_total)
            && self.comparison.passes(row_sum - row_max, self.min_signal)
    }
}

/// Outcome counts of a filtering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSummary {
    pub n_input: usize,
    pub n_kept: usize,
    /// Genes below the total-reads floor
    pub failed_total: usize,
    /// Genes above the total floor whose signal is carried by one sample
    pub failed_signal: usize,
}

fn row_sum_max(counts: &CountMatrix, gene_idx: usize) -> (u64, u64) {
    let row = counts.gene_counts(gene_idx);
    let sum = row.iter().sum::<u64>();
    let max = row.iter().copied().max().unwrap_or(0);
    (sum, max)
}

/// Keep genes whose row sum meets `min_total` and whose row sum minus the
/// largest single-sample count meets `min_signal`.
///
/// Row statistics cover exactly the sample columns of the matrix. Fails with
/// [`DgeError::NoGenesPassedFilter`] when nothing survives.
pub fn filter_counts(
    counts: &CountMatrix,
    thresholds: &FilterThresholds,
) -> Result<(CountMatrix, FilterSummary)> {
    if counts.n_samples() == 0 {
        return Err(DgeError::EmptyData {
            reason: "count matrix has no sample columns".to_string(),
        });
    }

    let stats: Vec<(u64, u64)> = (0..counts.n_genes())
        .into_par_iter()
        .map(|i| row_sum_max(counts, i))
        .collect();

    let mut summary = FilterSummary {
        n_input: counts.n_genes(),
        ..FilterSummary::default()
    };
    let mut keep = Vec::new();

    for (i, &(sum, max)) in stats.iter().enumerate() {
        if thresholds.keeps(sum, max) {
            keep.push(i);
        } else if !thresholds.comparison.passes(sum, thresholds.min_total) {
            summary.failed_total += 1;
        } else {
            summary.failed_signal += 1;
        }
    }
    summary.n_kept = keep.len();

    if keep.is_empty() {
        return Err(DgeError::NoGenesPassedFilter {
            n_input: counts.n_genes(),
            min_total: thresholds.min_total,
            min_signal: thresholds.min_signal,
        });
    }

    Ok((counts.subset_genes(&keep)?, summary))
}
