//! Error types for the RNA-seq workflow

use thiserror::Error;

/// Main error type for workflow operations
#[derive(Error, Debug)]
pub enum DgeError {
    #[error("Missing required column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Sample mismatch between counts and metadata: {reason}")]
    SampleMismatch { reason: String },

    #[error("Unrecognized condition '{value}' for sample '{sample}' (accepted: {accepted})")]
    UnknownCondition {
        sample: String,
        value: String,
        accepted: String,
    },

    #[error("Duplicate {kind} identifier '{id}'")]
    DuplicateId { kind: String, id: String },

    #[error("Invalid count value '{value}' for gene '{gene}', sample '{sample}'")]
    InvalidCount {
        gene: String,
        sample: String,
        value: String,
    },

    #[error("No genes passed the count filter ({n_input} genes in, min_total={min_total}, min_signal={min_signal})")]
    NoGenesPassedFilter {
        n_input: usize,
        min_total: u64,
        min_signal: u64,
    },

    #[error("Gene map contains {n_duplicates} duplicate identifier(s) in column '{column}'")]
    DuplicateGeneMapIds { column: String, n_duplicates: usize },

    #[error("Treatment styles do not match observed conditions: {reason}")]
    StyleMismatch { reason: String },

    #[error("Palette lookup failed: {reason}")]
    Palette { reason: String },

    #[error("Expression model failed during {stage}: {reason}")]
    ExternalModel { stage: String, reason: String },

    #[error("Gene map source '{source_name}' failed: {reason}")]
    GeneMapSource { source_name: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Plot rendering failed: {reason}")]
    Plot { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl DgeError {
    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        DgeError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, DgeError>;
