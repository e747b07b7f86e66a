//! rust_dge_workflow: RNA-seq count filtering, gene annotation and PCA QC
//!
//! The crate covers the bookkeeping around a differential-expression run:
//! reading featureCounts output and sample metadata, removing low-signal
//! genes, putting the condition factor in a fixed order, joining gene
//! annotations onto result tables and drawing a PCA plot with one marker
//! style per treatment. Normalization and transformation are delegated to an
//! [`model::ExpressionModel`].
//!
//! # Example
//!
//! ```ignore
//! use rust_dge_workflow::prelude::*;
//!
//! let config = WorkflowConfig::from_path("workflow.yaml")?;
//! let model = ShiftedLogModel::new(config.model.clone())?;
//! let source = TableGeneMapSource::new("mart_export.tsv");
//!
//! let output = run_workflow(&config, "counts.txt", "metadata.tsv", &model, &source)?;
//! output.write_outputs("results", &config)?;
//! ```

pub mod annotate;
pub mod cli;
pub mod condition;
pub mod config;
pub mod data;
pub mod error;
pub mod filter;
pub mod io;
pub mod model;
pub mod plot;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::annotate::{annotate, AnnotationConfig, BiomartClient, GeneMapSource, TableGeneMapSource};
    pub use crate::condition::{normalize_metadata, ConditionScheme, SampleConfig, SampleIdNormalizer};
    pub use crate::config::WorkflowConfig;
    pub use crate::data::{CountMatrix, ExpressionMatrix, GeneMap, SampleMetadata, Table};
    pub use crate::error::{DgeError, Result};
    pub use crate::filter::{filter_counts, FilterSummary, FilterThresholds};
    pub use crate::io::{align_samples, read_count_matrix, read_metadata, read_table, write_table};
    pub use crate::model::{ExpressionModel, ModelFit, PrecomputedModel, ShiftedLogModel};
    pub use crate::plot::{build_aesthetics, render_pca_plot, TreatmentAesthetic};
    pub use crate::{run_workflow, WorkflowOutput, WorkflowSummary};
}

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::Serialize;

use prelude::*;

/// Output file names inside the output directory
pub mod outputs {
    pub const FILTERED_COUNTS: &str = "filtered_counts.tsv";
    pub const NORMALIZED_ANNOTATED: &str = "normalized_counts_annotated.tsv";
    pub const TRANSFORMED_ANNOTATED: &str = "transformed_annotated.tsv";
    pub const PCA_COORDINATES: &str = "pca_coordinates.tsv";
    pub const AESTHETICS: &str = "treatment_aesthetics.tsv";
    pub const PCA_PLOT: &str = "pca.svg";
    pub const SUMMARY: &str = "summary.json";
}

/// Run statistics written to `summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub n_samples: usize,
    /// Condition level -> number of samples, in factor order
    pub samples_per_condition: Vec<(String, usize)>,
    pub filter: FilterSummary,
    pub model: String,
    pub size_factors: Option<BTreeMap<String, f64>>,
    pub pca_genes_used: usize,
    /// Percent of variance on PC1 and PC2
    pub pca_percent_variance: [f64; 2],
    pub gene_map_source: String,
    pub genes_annotated: usize,
    pub genes_unannotated: usize,
}

/// Everything produced by [`run_workflow`]
#[derive(Debug, Clone)]
pub struct WorkflowOutput {
    pub samples: SampleMetadata,
    pub filtered: CountMatrix,
    pub fit: ModelFit,
    pub normalized_annotated: Table,
    pub transformed_annotated: Table,
    pub aesthetics: Vec<TreatmentAesthetic>,
    pub summary: WorkflowSummary,
}

/// Run the complete workflow
///
/// metadata -> normalized factor -> counts aligned to metadata -> filter ->
/// model fit -> gene map -> annotated tables -> treatment aesthetics
pub fn run_workflow<P: AsRef<Path>, Q: AsRef<Path>>(
    config: &WorkflowConfig,
    counts_path: P,
    metadata_path: Q,
    model: &dyn ExpressionModel,
    source: &dyn GeneMapSource,
) -> Result<WorkflowOutput> {
    config.validate()?;

    info!("Loading metadata from: {}", metadata_path.as_ref().display());
    let raw = read_metadata(metadata_path)?;
    let samples = normalize_metadata(&raw, &config.samples, &config.conditions)?;
    info!(
        "  {} samples, condition levels: {}",
        samples.n_samples(),
        samples.condition().levels().join(", ")
    );

    info!("Loading count matrix from: {}", counts_path.as_ref().display());
    let counts = read_count_matrix(counts_path, &config.counts, &config.samples.id_normalizer)?;
    info!("  {} genes, {} samples", counts.n_genes(), counts.n_samples());
    let counts = align_samples(&counts, &samples)?;

    let (filtered, filter_summary) = filter_counts(&counts, &config.filter)?;
    info!(
        "Filtering kept {} of {} genes ({} below total, {} single-sample signal)",
        filter_summary.n_kept, filter_summary.n_input, filter_summary.failed_total, filter_summary.failed_signal
    );

    info!("Fitting expression model: {}", model.name());
    let fit = model.fit(&filtered, &samples, samples.condition_name())?;

    info!("Fetching gene annotations from {}", source.name());
    let query = &config.annotation.query;
    let map_table = source.fetch(filtered.gene_ids(), query)?;
    let gene_map = GeneMap::from_table(&map_table, &query.filter, config.annotation.duplicates)?;
    let genes_annotated = filtered.gene_ids().iter().filter(|g| gene_map.contains(g)).count();
    info!("  {} of {} genes annotated", genes_annotated, filtered.n_genes());

    let id_column = &config.annotation.results_id_column;
    let normalized_annotated = annotate(&fit.normalized.to_table(id_column)?, id_column, &gene_map)?;
    let transformed_annotated = annotate(&fit.transformed.to_table(id_column)?, id_column, &gene_map)?;

    let aesthetics = build_aesthetics(samples.condition(), &config.styles)?;

    let condition = samples.condition();
    let samples_per_condition: Vec<(String, usize)> = condition
        .levels()
        .iter()
        .map(|level| (level.clone(), condition.samples_with_level(level).len()))
        .collect();
    let size_factors: Option<BTreeMap<String, f64>> = fit.size_factors.as_ref().map(|sf| {
        filtered
            .sample_ids()
            .iter()
            .cloned()
            .zip(sf.iter().copied())
            .collect()
    });

    let summary = WorkflowSummary {
        n_samples: samples.n_samples(),
        samples_per_condition,
        filter: filter_summary,
        model: model.name().to_string(),
        size_factors,
        pca_genes_used: fit.pca.n_genes_used,
        pca_percent_variance: [fit.pca.percent_variance[0] * 100.0, fit.pca.percent_variance[1] * 100.0],
        gene_map_source: source.name().to_string(),
        genes_annotated,
        genes_unannotated: filtered.n_genes() - genes_annotated,
    };

    Ok(WorkflowOutput {
        samples,
        filtered,
        fit,
        normalized_annotated,
        transformed_annotated,
        aesthetics,
        summary,
    })
}

impl WorkflowOutput {
    /// Write every output file into `dir`, creating it if needed
    pub fn write_outputs<P: AsRef<Path>>(&self, dir: P, config: &WorkflowConfig) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        io::write_count_matrix(
            dir.join(outputs::FILTERED_COUNTS),
            &self.filtered,
            &config.counts.gene_id_column,
        )?;
        write_table(dir.join(outputs::NORMALIZED_ANNOTATED), &self.normalized_annotated)?;
        write_table(dir.join(outputs::TRANSFORMED_ANNOTATED), &self.transformed_annotated)?;

        let points = plot::pca_points(&self.fit.pca, &self.samples)?;
        io::write_records(dir.join(outputs::PCA_COORDINATES), &points)?;

        let records: Vec<_> = self.aesthetics.iter().map(TreatmentAesthetic::record).collect();
        io::write_records(dir.join(outputs::AESTHETICS), &records)?;

        render_pca_plot(
            &self.fit.pca,
            &self.samples,
            &self.aesthetics,
            &config.plot,
            dir.join(outputs::PCA_PLOT),
        )?;
        io::write_json(dir.join(outputs::SUMMARY), &self.summary)?;

        info!("Results written to {}", dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use std::fs;

    const COUNTS: &str = "\
# Program:featureCounts v2.0.1
Geneid\tChr\tStart\tEnd\tStrand\tLength\tS-1\tS-2\tS-3\tS-4\tS-5\tS-6\tS-7\tS-8
G1\tchr1\t100\t900\t+\t800\t100\t120\t300\t280\t500\t520\t900\t880
G2\tchr1\t1000\t1900\t-\t900\t400\t380\t200\t210\t100\t90\t50\t60
G3\tchr2\t50\t500\t+\t450\t1000\t0\t0\t0\t0\t0\t0\t0
G4\tchr2\t700\t900\t+\t200\t10\t10\t10\t10\t10\t10\t10\t10
G5\tchr3\t10\t400\t-\t390\t200\t200\t200\t200\t200\t200\t200\t200
G6\tchr3\t600\t990\t+\t390\t300\t310\t290\t305\t295\t300\t310\t320
";

    // rows deliberately not in count order; Batch is not retained
    const METADATA: &str = "\
SampleID\tCondition\tBatch
S-8\tListeria\tb
S-1\tNaiveTCR75\ta
S-2\tNaive\tb
S-3\tTolerant\ta
S-4\tTolerant\tb
S-5\tSingleDST\ta
S-6\tSingleDST\tb
S-7\tListeria\ta
";

    struct InMemorySource(Table);

    impl GeneMapSource for InMemorySource {
        fn name(&self) -> &str {
            "in-memory"
        }

        fn fetch(&self, _gene_ids: &[String], _query: &crate::annotate::AnnotationQuery) -> Result<Table> {
            Ok(self.0.clone())
        }
    }

    fn gene_map_source() -> InMemorySource {
        let columns = ["ensembl_gene_id", "mgi_symbol", "mgi_description", "gene_biotype", "entrezgene_id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = |id: &str, symbol: &str| -> Vec<Cell> {
            vec![
                Cell::Text(id.to_string()),
                Cell::Text(symbol.to_string()),
                Cell::Text(format!("{} protein", symbol)),
                Cell::Text("protein_coding".to_string()),
                Cell::Null,
            ]
        };
        let rows = vec![row("G1", "Cd4"), row("G2", "Foxp3"), row("G1", "Cd4dup"), row("G5", "Actb")];
        InMemorySource(Table::new(columns, rows).unwrap())
    }

    fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let counts = dir.join("counts.txt");
        let metadata = dir.join("metadata.tsv");
        fs::write(&counts, COUNTS).unwrap();
        fs::write(&metadata, METADATA).unwrap();
        (counts, metadata)
    }

    #[test]
    fn test_workflow_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (counts, metadata) = write_inputs(dir.path());
        let config = WorkflowConfig::default();

        let output = run_workflow(
            &config,
            &counts,
            &metadata,
            &ShiftedLogModel::default(),
            &gene_map_source(),
        )
        .unwrap();

        // G3 fails the single-sample rule, G4 the total floor
        assert_eq!(output.filtered.gene_ids(), &["G1", "G2", "G5", "G6"]);
        assert_eq!(output.summary.filter.failed_total, 1);
        assert_eq!(output.summary.filter.failed_signal, 1);

        // counts follow metadata order with normalized ids
        assert_eq!(output.filtered.sample_ids()[0], "S__8");
        assert_eq!(output.samples.condition_of("S__1"), Some("Naive"));

        let table = &output.normalized_annotated;
        assert_eq!(table.columns()[0], "GeneID");
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.cell(0, "MGI_Symbol"), Some(&Cell::Text("Cd4".to_string())));
        assert_eq!(table.cell(3, "MGI_Symbol"), Some(&Cell::Null));
        assert_eq!(output.summary.genes_annotated, 3);
        assert_eq!(output.summary.genes_unannotated, 1);

        let labels: Vec<&str> = output.aesthetics.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Listeria", "Naive", "SingleDST", "Tolerant"]);
        assert_eq!(
            output.summary.samples_per_condition[0],
            ("Naive".to_string(), 2)
        );

        let out_dir = dir.path().join("results");
        output.write_outputs(&out_dir, &config).unwrap();
        for name in [
            outputs::FILTERED_COUNTS,
            outputs::NORMALIZED_ANNOTATED,
            outputs::TRANSFORMED_ANNOTATED,
            outputs::PCA_COORDINATES,
            outputs::AESTHETICS,
            outputs::PCA_PLOT,
            outputs::SUMMARY,
        ] {
            assert!(out_dir.join(name).exists(), "missing {}", name);
        }

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(outputs::SUMMARY)).unwrap()).unwrap();
        assert_eq!(summary["filter"]["n_kept"], 4);
        assert_eq!(summary["model"], "shifted-log");

        let annotated = fs::read_to_string(out_dir.join(outputs::NORMALIZED_ANNOTATED)).unwrap();
        assert!(annotated.lines().nth(4).unwrap().ends_with("NA\tNA\tNA\tNA"));
    }

    #[test]
    fn test_style_mismatch_stops_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let (counts, metadata) = write_inputs(dir.path());
        let mut config = WorkflowConfig::default();
        config.styles.0.remove("Tolerant");

        let err = run_workflow(
            &config,
            &counts,
            &metadata,
            &ShiftedLogModel::default(),
            &gene_map_source(),
        )
        .unwrap_err();
        assert!(matches!(err, DgeError::StyleMismatch { .. }));
    }

    #[test]
    fn test_unreachable_floor_empties_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let (counts, metadata) = write_inputs(dir.path());
        let mut config = WorkflowConfig::default();
        config.filter.min_total = 100_000;

        let err = run_workflow(
            &config,
            &counts,
            &metadata,
            &ShiftedLogModel::default(),
            &gene_map_source(),
        )
        .unwrap_err();
        assert!(matches!(err, DgeError::NoGenesPassedFilter { n_input: 6, .. }));
    }
}
