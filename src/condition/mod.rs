//! Metadata normalization: condition relabeling, factor ordering and sample ids

mod sample_id;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{ConditionFactor, RawMetadata, SampleMetadata};
use crate::error::{DgeError, Result};

pub use sample_id::SampleIdNormalizer;

/// Closed set of condition levels plus raw-label aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionScheme {
    /// Levels in factor order; the first is the baseline
    pub levels: Vec<String>,
    /// Raw label -> canonical level
    pub aliases: BTreeMap<String, String>,
}

impl Default for ConditionScheme {
    fn default() -> Self {
        let levels = ["Naive", "Tolerant", "SingleDST", "Listeria"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut aliases = BTreeMap::new();
        aliases.insert("NaiveTCR75".to_string(), "Naive".to_string());
        Self { levels, aliases }
    }
}

impl ConditionScheme {
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(DgeError::InvalidConfig {
                reason: "at least one condition level is required".to_string(),
            });
        }
        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].contains(level) {
                return Err(DgeError::InvalidConfig {
                    reason: format!("condition level '{}' listed twice", level),
                });
            }
        }
        for (raw, target) in &self.aliases {
            if !self.levels.contains(target) {
                return Err(DgeError::InvalidConfig {
                    reason: format!("alias '{}' points to unknown level '{}'", raw, target),
                });
            }
        }
        Ok(())
    }

    /// Canonical level for a raw label, if the label is recognized
    pub fn canonical(&self, raw: &str) -> Option<&str> {
        let raw = raw.trim();
        if let Some(level) = self.levels.iter().find(|l| l.as_str() == raw) {
            return Some(level);
        }
        self.aliases.get(raw).map(String::as_str)
    }

    fn accepted(&self) -> String {
        self.levels
            .iter()
            .chain(self.aliases.keys())
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Which metadata columns are read and retained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub sample_id_column: String,
    pub condition_column: String,
    /// Extra columns kept besides the sample id and condition
    pub retain_columns: Vec<String>,
    pub id_normalizer: SampleIdNormalizer,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample_id_column: "SampleID".to_string(),
            condition_column: "Condition".to_string(),
            retain_columns: Vec::new(),
            id_normalizer: SampleIdNormalizer::default(),
        }
    }
}

impl SampleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_id_column == self.condition_column {
            return Err(DgeError::InvalidConfig {
                reason: "sample id and condition columns must differ".to_string(),
            });
        }
        self.id_normalizer.validate()
    }

    /// All column names the normalized metadata keeps
    pub fn retained_columns(&self) -> Vec<String> {
        let mut cols = vec![self.sample_id_column.clone(), self.condition_column.clone()];
        cols.extend(self.retain_columns.iter().cloned());
        cols
    }
}

/// Turn raw metadata into normalized sample metadata.
///
/// Condition labels are mapped onto the closed level set of `scheme`, sample
/// ids are normalized, and only the columns listed by
/// [`SampleConfig::retained_columns`] survive.
pub fn normalize_metadata(
    raw: &RawMetadata,
    config: &SampleConfig,
    scheme: &ConditionScheme,
) -> Result<SampleMetadata> {
    if raw.n_rows() == 0 {
        return Err(DgeError::EmptyData {
            reason: "metadata has no samples".to_string(),
        });
    }

    let raw_ids = raw
        .column(&config.sample_id_column)
        .ok_or_else(|| DgeError::missing_column("metadata", &config.sample_id_column))?;
    let raw_conditions = raw
        .column(&config.condition_column)
        .ok_or_else(|| DgeError::missing_column("metadata", &config.condition_column))?;

    let sample_ids = raw_ids
        .iter()
        .map(|id| config.id_normalizer.normalize(id))
        .collect::<Result<Vec<String>>>()?;

    let labels = raw_conditions
        .iter()
        .zip(raw_ids.iter())
        .map(|(value, sample)| {
            scheme
                .canonical(value)
                .map(str::to_string)
                .ok_or_else(|| DgeError::UnknownCondition {
                    sample: sample.to_string(),
                    value: value.to_string(),
                    accepted: scheme.accepted(),
                })
        })
        .collect::<Result<Vec<String>>>()?;

    let factor = ConditionFactor::new(scheme.levels.clone(), &labels)?;
    let mut metadata = SampleMetadata::new(sample_ids, &config.condition_column, factor)?;

    for name in &config.retain_columns {
        let values = raw
            .column(name)
            .ok_or_else(|| DgeError::missing_column("metadata", name))?;
        metadata.add_column(name, values.into_iter().map(str::to_string).collect())?;
    }

    let retained = config.retained_columns();
    for dropped in raw.columns().iter().filter(|c| !retained.contains(c)) {
        log::debug!("Dropping metadata column '{}'", dropped);
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn raw_metadata(conditions: &[&str]) -> RawMetadata {
        let records = conditions
            .iter()
            .enumerate()
            .map(|(i, c)| strings(&[&format!("TCR-{}", i + 1), c, "14"]))
            .collect();
        RawMetadata::new(strings(&["SampleID", "Condition", "SacrificeDay"]), records).unwrap()
    }

    #[test]
    fn test_alias_rewritten_to_canonical() {
        let raw = raw_metadata(&["NaiveTCR75", "Tolerant", "Listeria"]);
        let meta = normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default())
            .unwrap();

        assert_eq!(meta.condition().labels(), vec!["Naive", "Tolerant", "Listeria"]);
        assert_eq!(meta.condition().baseline(), "Naive");
        assert_eq!(meta.sample_ids(), &strings(&["TCR__1", "TCR__2", "TCR__3"])[..]);
    }

    #[test]
    fn test_unknown_condition_is_fatal() {
        let raw = raw_metadata(&["Naive", "Salmonella"]);
        let err = normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default())
            .unwrap_err();
        match err {
            DgeError::UnknownCondition { sample, value, .. } => {
                assert_eq!(sample, "TCR-2");
                assert_eq!(value, "Salmonella");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_only_configured_columns_retained() {
        let raw = raw_metadata(&["Naive", "SingleDST"]);
        let meta = normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default())
            .unwrap();
        assert!(meta.column("SacrificeDay").is_none());

        let config = SampleConfig {
            retain_columns: strings(&["SacrificeDay"]),
            ..SampleConfig::default()
        };
        let meta = normalize_metadata(&raw, &config, &ConditionScheme::default()).unwrap();
        assert_eq!(meta.column("SacrificeDay").unwrap(), &strings(&["14", "14"])[..]);
    }

    #[test]
    fn test_missing_condition_column() {
        let raw = RawMetadata::new(strings(&["SampleID"]), vec![strings(&["a"])]).unwrap();
        let err = normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default())
            .unwrap_err();
        assert!(matches!(err, DgeError::MissingColumn { ref column, .. } if column == "Condition"));
    }

    #[test]
    fn test_scheme_validation() {
        let mut scheme = ConditionScheme::default();
        scheme.aliases.insert("LM".to_string(), "Salmonella".to_string());
        assert!(scheme.validate().is_err());
        assert!(ConditionScheme::default().validate().is_ok());
    }
}
