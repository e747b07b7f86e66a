//! Command-line interface for rust_dge_workflow

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_dge_workflow")]
#[command(version)]
#[command(about = "RNA-seq count filtering, gene annotation and PCA QC")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full workflow
    #[command(
        long_about = "Run the full workflow\n\n\
            Loads featureCounts output and sample metadata, filters low-signal genes,\n\
            normalizes and transforms the counts, joins gene annotations onto the\n\
            normalized and transformed tables, and draws a PCA plot styled per treatment.",
        after_long_help = "\
Examples:
  # Shifted-log model, annotations from a saved BioMart export
  rust_dge_workflow run -c counts.txt -m metadata.tsv --gene-map mart_export.tsv -o results

  # Query Ensembl BioMart directly, custom thresholds in YAML
  rust_dge_workflow run -c counts.txt -m metadata.tsv --biomart --config workflow.yaml

  # Use normalized counts and VST values computed by DESeq2
  rust_dge_workflow run -c counts.txt -m metadata.tsv --gene-map mart_export.tsv \\
    --normalized deseq2_normalized.tsv --transformed deseq2_vst.tsv"
    )]
    Run {
        /// Path to the counts file
        #[arg(short, long,
            long_help = "Path to the counts file.\n\
                featureCounts layout: '#' comment lines, a Geneid column, annotation\n\
                columns (Chr, Start, End, Strand, Length) and one column per sample.\n\
                Tab and comma delimiters are auto-detected.")]
        counts: PathBuf,

        /// Path to the sample metadata file
        #[arg(short, long,
            long_help = "Path to the sample metadata file.\n\
                Must contain the sample id column (SampleID) and the condition column\n\
                (Condition); other columns are dropped unless retained in the config.")]
        metadata: PathBuf,

        /// YAML workflow configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Delimited gene map export to annotate with
        #[arg(long, value_name = "FILE", conflicts_with = "biomart", required_unless_present = "biomart")]
        gene_map: Option<PathBuf>,

        /// Query Ensembl BioMart for annotations
        #[arg(long)]
        biomart: bool,

        /// Precomputed normalized counts table
        #[arg(long, value_name = "FILE", requires = "transformed",
            long_help = "Precomputed normalized counts table (genes x samples).\n\
                Gene ids come from --precomputed-id-column or from R row names\n\
                (write.table output with or without col.names = NA). Sample headers\n\
                may be raw (S-1) or normalized (S__1).")]
        normalized: Option<PathBuf>,

        /// Precomputed transformed (e.g. VST) table
        #[arg(long, value_name = "FILE", requires = "normalized")]
        transformed: Option<PathBuf>,

        /// Gene id column of the precomputed tables
        #[arg(long, default_value = "GeneID")]
        precomputed_id_column: String,

        /// Number of threads (0 = all cores)
        #[arg(short = 't', long, default_value_t = 0)]
        threads: usize,
    },

    /// Filter low-signal genes from a counts file
    #[command(
        long_about = "Filter low-signal genes from a counts file\n\n\
            A gene is kept when its total count meets --min-total and its total minus\n\
            the largest single-sample count meets --min-signal. Only the samples listed\n\
            in the metadata are counted.",
        after_long_help = "\
Examples:
  rust_dge_workflow filter -c counts.txt -m metadata.tsv -o filtered_counts.tsv
  rust_dge_workflow filter -c counts.txt -m metadata.tsv --min-total 1000 --strict"
    )]
    Filter {
        /// Path to the counts file
        #[arg(short, long)]
        counts: PathBuf,

        /// Path to the sample metadata file
        #[arg(short, long)]
        metadata: PathBuf,

        /// YAML workflow configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Minimum total count per gene [default: from config, 500]
        #[arg(long)]
        min_total: Option<u64>,

        /// Minimum count outside the largest sample [default: from config, 500]
        #[arg(long)]
        min_signal: Option<u64>,

        /// Compare with '>' instead of '>='
        #[arg(long)]
        strict: bool,

        /// Output file path
        #[arg(short, long, default_value = "filtered_counts.tsv")]
        output: PathBuf,
    },

    /// Annotate a gene-indexed table with a gene map
    #[command(
        long_about = "Annotate a gene-indexed table with a gene map\n\n\
            Left-joins the gene map onto the table by gene id. Every input row is kept\n\
            in order; genes without an entry get NA. Known BioMart column names are\n\
            renamed (ensembl_gene_id -> GeneID, mgi_symbol -> MGI_Symbol, ...).",
        after_long_help = "\
Examples:
  rust_dge_workflow annotate -i deseq2_results.tsv --id-column ensembl_gene_id \\
    --gene-map mart_export.tsv -o deseq2_results_annotated.tsv"
    )]
    Annotate {
        /// Table to annotate
        #[arg(short, long)]
        input: PathBuf,

        /// Gene id column of the input table
        #[arg(long, default_value = "ensembl_gene_id")]
        id_column: String,

        /// Delimited gene map file
        #[arg(long, value_name = "FILE")]
        gene_map: PathBuf,

        /// Gene id column of the gene map
        #[arg(long, default_value = "ensembl_gene_id")]
        map_id_column: String,

        /// Fail instead of keeping the first row when the map repeats an id
        #[arg(long)]
        reject_duplicates: bool,

        /// Output file path
        #[arg(short, long, default_value = "annotated.tsv")]
        output: PathBuf,
    },
}
