//! Ordered categorical factor for the treatment condition

use serde::Serialize;

use crate::error::{DgeError, Result};

/// An ordered categorical variable, one level per sample.
///
/// Level order is the configured order, not alphabetical; the first level
/// acts as the baseline for the expression model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionFactor {
    levels: Vec<String>,
    codes: Vec<usize>,
}

impl ConditionFactor {
    /// Build a factor from canonical labels; every label must be one of `levels`
    pub fn new(levels: Vec<String>, labels: &[String]) -> Result<Self> {
        if levels.is_empty() {
            return Err(DgeError::InvalidInput {
                reason: "condition factor needs at least one level".to_string(),
            });
        }

        let codes = labels
            .iter()
            .map(|label| {
                levels
                    .iter()
                    .position(|level| level == label)
                    .ok_or_else(|| DgeError::InvalidInput {
                        reason: format!(
                            "label '{}' is not a level of the factor ({})",
                            label,
                            levels.join(", ")
                        ),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(Self { levels, codes })
    }

    /// Configured levels in factor order
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Reference level
    pub fn baseline(&self) -> &str {
        &self.levels[0]
    }

    pub fn n_samples(&self) -> usize {
        self.codes.len()
    }

    /// Level index per sample
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn label(&self, sample_idx: usize) -> &str {
        &self.levels[self.codes[sample_idx]]
    }

    pub fn labels(&self) -> Vec<&str> {
        self.codes.iter().map(|&c| self.levels[c].as_str()).collect()
    }

    /// Distinct labels present in the data, sorted ascending
    pub fn observed_levels_sorted(&self) -> Vec<String> {
        let mut observed: Vec<String> = self.labels().into_iter().map(str::to_string).collect();
        observed.sort();
        observed.dedup();
        observed
    }

    pub fn samples_with_level(&self, level: &str) -> Vec<usize> {
        self.labels()
            .into_iter()
            .enumerate()
            .filter(|(_, l)| *l == level)
            .map(|(i, _)| i)
            .collect()
    }

    /// Keep the given samples in the given order
    pub fn subset(&self, sample_indices: &[usize]) -> Self {
        Self {
            levels: self.levels.clone(),
            codes: sample_indices.iter().map(|&i| self.codes[i]).collect(),
        }
    }
}
