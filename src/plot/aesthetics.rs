//! Per-treatment plotting aesthetics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::palette::{color_by_name, shape_by_description, MarkerShape, PaletteColor};
use crate::data::ConditionFactor;
use crate::error::{DgeError, Result};

/// Palette names for one treatment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentStyle {
    pub fill: String,
    pub shape: String,
    pub outline: String,
}

impl TreatmentStyle {
    fn new(fill: &str, shape: &str, outline: &str) -> Self {
        Self {
            fill: fill.to_string(),
            shape: shape.to_string(),
            outline: outline.to_string(),
        }
    }
}

/// Condition label -> style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreatmentStyles(pub BTreeMap<String, TreatmentStyle>);

impl Default for TreatmentStyles {
    fn default() -> Self {
        // every treatment shares the marker; fill color tells them apart
        let styles = [
            ("Listeria", "black"),
            ("Naive", "green"),
            ("SingleDST", "white"),
            ("Tolerant", "purple"),
        ]
        .iter()
        .map(|&(label, fill)| {
            (
                label.to_string(),
                TreatmentStyle::new(fill, "fillable triangle", "black"),
            )
        })
        .collect();
        Self(styles)
    }
}

impl TreatmentStyles {
    /// Check that every name resolves in the palettes
    pub fn validate(&self) -> Result<()> {
        for style in self.0.values() {
            color_by_name(&style.fill)?;
            color_by_name(&style.outline)?;
            shape_by_description(&style.shape)?;
        }
        Ok(())
    }
}

/// Resolved styling of one treatment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreatmentAesthetic {
    pub label: String,
    pub fill: PaletteColor,
    pub shape: MarkerShape,
    pub outline: PaletteColor,
}

/// Flat row for the aesthetics table output
#[derive(Debug, Clone, Serialize)]
pub struct AestheticRecord {
    pub label: String,
    pub fill: &'static str,
    pub fill_hex: String,
    pub shape: &'static str,
    pub shape_id: u8,
    pub outline: &'static str,
    pub outline_hex: String,
}

impl TreatmentAesthetic {
    pub fn record(&self) -> AestheticRecord {
        AestheticRecord {
            label: self.label.clone(),
            fill: self.fill.name,
            fill_hex: self.fill.hex(),
            shape: self.shape.description,
            shape_id: self.shape.id,
            outline: self.outline.name,
            outline_hex: self.outline.hex(),
        }
    }
}

/// One aesthetic per distinct observed condition label, in sorted label
/// order. The configured styles must cover exactly the observed labels.
pub fn build_aesthetics(
    condition: &ConditionFactor,
    styles: &TreatmentStyles,
) -> Result<Vec<TreatmentAesthetic>> {
    let labels = condition.observed_levels_sorted();

    let missing: Vec<&str> = labels
        .iter()
        .filter(|l| !styles.0.contains_key(*l))
        .map(String::as_str)
        .collect();
    let unused: Vec<&str> = styles
        .0
        .keys()
        .filter(|k| !labels.contains(*k))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() || !unused.is_empty() {
        return Err(DgeError::StyleMismatch {
            reason: format!(
                "no style for [{}]; style for unobserved [{}]",
                missing.join(", "),
                unused.join(", ")
            ),
        });
    }

    labels
        .into_iter()
        .map(|label| {
            let style = &styles.0[&label];
            Ok(TreatmentAesthetic {
                fill: color_by_name(&style.fill)?,
                shape: shape_by_description(&style.shape)?,
                outline: color_by_name(&style.outline)?,
                label,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(labels: &[&str]) -> ConditionFactor {
        let levels = ["Naive", "Tolerant", "SingleDST", "Listeria"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        ConditionFactor::new(levels, &labels).unwrap()
    }

    #[test]
    fn test_rows_follow_sorted_labels() {
        let condition = factor(&["Naive", "Tolerant", "Listeria", "SingleDST", "Naive", "Listeria"]);
        let aes = build_aesthetics(&condition, &TreatmentStyles::default()).unwrap();

        let labels: Vec<&str> = aes.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, condition.observed_levels_sorted());
        assert_eq!(labels, vec!["Listeria", "Naive", "SingleDST", "Tolerant"]);

        let fills: Vec<&str> = aes.iter().map(|a| a.fill.name).collect();
        assert_eq!(fills, vec!["black", "green", "white", "purple"]);
        assert!(aes.iter().all(|a| a.shape.id == 24 && a.outline.name == "black"));
    }

    #[test]
    fn test_label_set_mismatch_fails() {
        let condition = factor(&["Naive", "Listeria"]);
        match build_aesthetics(&condition, &TreatmentStyles::default()).unwrap_err() {
            DgeError::StyleMismatch { reason } => {
                assert!(reason.contains("SingleDST"));
                assert!(reason.contains("Tolerant"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let mut styles = TreatmentStyles::default();
        styles.0.retain(|k, _| k != "Naive");
        let condition = factor(&["Naive", "Listeria", "SingleDST", "Tolerant"]);
        assert!(build_aesthetics(&condition, &styles).is_err());
    }

    #[test]
    fn test_unknown_palette_name() {
        let mut styles = TreatmentStyles::default();
        styles.0.get_mut("Naive").unwrap().fill = "teal".to_string();
        assert!(styles.validate().is_err());
        assert!(TreatmentStyles::default().validate().is_ok());
    }

    #[test]
    fn test_record_flattens() {
        let condition = factor(&["Naive", "Tolerant", "Listeria", "SingleDST"]);
        let aes = build_aesthetics(&condition, &TreatmentStyles::default()).unwrap();
        let record = aes[3].record();
        assert_eq!(record.label, "Tolerant");
        assert_eq!(record.fill_hex, "#A020F0");
        assert_eq!(record.shape_id, 24);
    }
}
