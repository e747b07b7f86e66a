//! Workflow configuration, loadable from YAML

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotationConfig;
use crate::condition::{ConditionScheme, SampleConfig};
use crate::error::{DgeError, Result};
use crate::filter::FilterThresholds;
use crate::io::CountsLayout;
use crate::model::ModelConfig;
use crate::plot::{PlotConfig, TreatmentStyles};

/// Every tunable of a workflow run. Missing sections take their defaults,
/// so an empty document reproduces the reference analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub filter: FilterThresholds,
    pub samples: SampleConfig,
    pub conditions: ConditionScheme,
    pub counts: CountsLayout,
    pub annotation: AnnotationConfig,
    pub styles: TreatmentStyles,
    pub plot: PlotConfig,
    pub model: ModelConfig,
}

impl WorkflowConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_yaml(&text)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.samples.validate()?;
        self.conditions.validate()?;
        self.annotation.validate()?;
        self.styles.validate()?;
        self.plot.validate()?;
        self.model.validate()?;

        if self.counts.gene_id_column.trim().is_empty() {
            return Err(DgeError::InvalidConfig {
                reason: "counts.gene_id_column must not be empty".to_string(),
            });
        }

        let unknown: Vec<&str> = self
            .styles
            .0
            .keys()
            .filter(|label| !self.conditions.levels.contains(*label))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(DgeError::InvalidConfig {
                reason: format!("styles given for unknown conditions: {}", unknown.join(", ")),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Comparison;

    #[test]
    fn test_empty_document_is_default() {
        let config = WorkflowConfig::from_yaml("{}").unwrap();
        assert_eq!(config, WorkflowConfig::default());
        assert_eq!(config.filter.min_total, 500);
        assert_eq!(config.model.ntop, 500);
    }

    #[test]
    fn test_partial_override() {
        let yaml = "\
filter:
  min_total: 100
  comparison: strict
plot:
  title: QC
";
        let config = WorkflowConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.filter.min_total, 100);
        assert_eq!(config.filter.min_signal, 500);
        assert_eq!(config.filter.comparison, Comparison::Strict);
        assert_eq!(config.plot.title, "QC");
        assert_eq!(config.plot.width, 800);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = WorkflowConfig::default();
        let text = config.to_yaml().unwrap();
        assert_eq!(WorkflowConfig::from_yaml(&text).unwrap(), config);
    }

    #[test]
    fn test_style_for_unknown_condition_rejected() {
        let yaml = "\
styles:
  Mystery: { fill: red, shape: filled circle, outline: black }
";
        assert!(matches!(
            WorkflowConfig::from_yaml(yaml),
            Err(DgeError::InvalidConfig { .. })
        ));
    }
}
