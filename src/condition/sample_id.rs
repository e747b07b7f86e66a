//! Sample identifier normalization shared by counts headers and metadata rows

use serde::{Deserialize, Serialize};

use crate::error::{DgeError, Result};

/// Replaces a separator character with a two-character marker.
///
/// The same value must be applied to count-matrix column names and metadata
/// sample ids so both sides produce identical strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleIdNormalizer {
    pub separator: char,
    pub marker: String,
}

impl Default for SampleIdNormalizer {
    fn default() -> Self {
        Self {
            separator: '-',
            marker: "__".to_string(),
        }
    }
}

impl SampleIdNormalizer {
    pub fn validate(&self) -> Result<()> {
        if self.marker.chars().count() != 2 {
            return Err(DgeError::InvalidConfig {
                reason: format!(
                    "sample id marker must be two characters, got '{}'",
                    self.marker
                ),
            });
        }
        if self.marker.contains(self.separator) {
            return Err(DgeError::InvalidConfig {
                reason: format!(
                    "sample id marker '{}' must not contain the separator '{}'",
                    self.marker, self.separator
                ),
            });
        }
        Ok(())
    }

    /// Normalize a raw identifier. Identifiers that already contain the
    /// marker are rejected since the mapping could not be reversed.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        if raw.contains(self.marker.as_str()) {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "sample id '{}' already contains the marker '{}'",
                    raw, self.marker
                ),
            });
        }
        Ok(raw.replace(self.separator, &self.marker))
    }

    pub fn denormalize(&self, normalized: &str) -> String {
        normalized.replace(self.marker.as_str(), &self.separator.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_metadata_normalize_identically() {
        let n = SampleIdNormalizer::default();
        // header cell and metadata cell for the same library
        let from_counts = n.normalize("Tol-DST-3").unwrap();
        let from_metadata = n.normalize(" Tol-DST-3 ").unwrap();
        assert_eq!(from_counts, "Tol__DST__3");
        assert_eq!(from_counts, from_metadata);
    }

    #[test]
    fn test_round_trip_and_marker_rejection() {
        let n = SampleIdNormalizer::default();
        assert_eq!(n.denormalize(&n.normalize("LM-1").unwrap()), "LM-1");
        assert!(n.normalize("LM__1").is_err());
    }

    #[test]
    fn test_validate_marker() {
        let bad = SampleIdNormalizer {
            separator: '.',
            marker: "...".to_string(),
        };
        assert!(bad.validate().is_err());

        let overlapping = SampleIdNormalizer {
            separator: '_',
            marker: "__".to_string(),
        };
        assert!(overlapping.validate().is_err());
        assert!(SampleIdNormalizer::default().validate().is_ok());
    }
}
