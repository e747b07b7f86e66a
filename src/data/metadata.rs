//! Sample metadata, raw as read from disk and normalized for analysis

use std::collections::HashSet;

use serde::Serialize;

use super::ConditionFactor;
use crate::error::{DgeError, Result};

/// Metadata table exactly as read: a header and string records
#[derive(Debug, Clone)]
pub struct RawMetadata {
    columns: Vec<String>,
    records: Vec<Vec<String>>,
}

impl RawMetadata {
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            if record.len() != columns.len() {
                return Err(DgeError::InvalidInput {
                    reason: format!(
                        "metadata row {} has {} fields, expected {}",
                        i + 1,
                        record.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    /// Values of a named column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.records.iter().map(|r| r[idx].as_str()).collect())
    }
}

/// Normalized sample metadata: unique sample ids, the condition factor and
/// any explicitly retained extra columns
#[derive(Debug, Clone, Serialize)]
pub struct SampleMetadata {
    sample_ids: Vec<String>,
    condition_name: String,
    condition: ConditionFactor,
    extra: Vec<(String, Vec<String>)>,
}

impl SampleMetadata {
    pub fn new(sample_ids: Vec<String>, condition_name: &str, condition: ConditionFactor) -> Result<Self> {
        let mut seen = HashSet::new();
        for id in &sample_ids {
            if !seen.insert(id.as_str()) {
                return Err(DgeError::DuplicateId {
                    kind: "sample".to_string(),
                    id: id.clone(),
                });
            }
        }

        if condition.n_samples() != sample_ids.len() {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "condition has {} values for {} samples",
                    condition.n_samples(),
                    sample_ids.len()
                ),
            });
        }

        Ok(Self {
            sample_ids,
            condition_name: condition_name.to_string(),
            condition,
            extra: Vec::new(),
        })
    }

    /// Attach a retained string column
    pub fn add_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.sample_ids.len() {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    self.sample_ids.len()
                ),
            });
        }
        self.extra.retain(|(n, _)| n != name);
        self.extra.push((name.to_string(), values));
        Ok(())
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Name of the factor column used as explanatory variable
    pub fn condition_name(&self) -> &str {
        &self.condition_name
    }

    pub fn condition(&self) -> &ConditionFactor {
        &self.condition
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.extra
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Names of every retained column, sample id and condition first
    pub fn column_names(&self, sample_id_column: &str) -> Vec<String> {
        let mut names = vec![sample_id_column.to_string(), self.condition_name.clone()];
        names.extend(self.extra.iter().map(|(n, _)| n.clone()));
        names
    }

    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Condition label for a sample id
    pub fn condition_of(&self, sample_id: &str) -> Option<&str> {
        self.sample_index(sample_id).map(|i| self.condition.label(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_raw_metadata_columns() {
        let raw = RawMetadata::new(
            strings(&["SampleID", "Condition", "Day"]),
            vec![strings(&["a", "Naive", "7"]), strings(&["b", "Listeria", "8"])],
        )
        .unwrap();

        assert_eq!(raw.column("Condition").unwrap(), vec!["Naive", "Listeria"]);
        assert!(raw.column("Batch").is_none());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RawMetadata::new(strings(&["SampleID", "Condition"]), vec![strings(&["a"])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_metadata() {
        let levels = strings(&["Naive", "Listeria"]);
        let factor = ConditionFactor::new(levels, &strings(&["Naive", "Listeria"])).unwrap();
        let mut meta = SampleMetadata::new(strings(&["s1", "s2"]), "Condition", factor).unwrap();
        meta.add_column("Batch", strings(&["b1", "b2"])).unwrap();

        assert_eq!(meta.condition_of("s2"), Some("Listeria"));
        assert_eq!(meta.column("Batch").unwrap(), strings(&["b1", "b2"]).as_slice());
        assert_eq!(
            meta.column_names("SampleID"),
            strings(&["SampleID", "Condition", "Batch"])
        );
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let factor =
            ConditionFactor::new(strings(&["Naive"]), &strings(&["Naive", "Naive"])).unwrap();
        assert!(SampleMetadata::new(strings(&["s1", "s1"]), "Condition", factor).is_err());
    }
}
