//! rust_dge_workflow command-line interface

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, LevelFilter};

use rust_dge_workflow::cli::{Cli, Commands};
use rust_dge_workflow::data::DuplicatePolicy;
use rust_dge_workflow::filter::Comparison;
use rust_dge_workflow::io::write_count_matrix;
use rust_dge_workflow::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            counts,
            metadata,
            config,
            output,
            gene_map,
            biomart,
            normalized,
            transformed,
            precomputed_id_column,
            threads,
        }) => run_full(RunArgs {
            counts,
            metadata,
            config,
            output,
            gene_map: if biomart { None } else { gene_map },
            precomputed: normalized.zip(transformed),
            precomputed_id_column,
            threads,
        }),
        Some(Commands::Filter {
            counts,
            metadata,
            config,
            min_total,
            min_signal,
            strict,
            output,
        }) => run_filter(&counts, &metadata, config.as_deref(), min_total, min_signal, strict, &output),
        Some(Commands::Annotate {
            input,
            id_column,
            gene_map,
            map_id_column,
            reject_duplicates,
            output,
        }) => run_annotate(&input, &id_column, &gene_map, &map_id_column, reject_duplicates, &output),
        None => {
            println!("rust_dge_workflow v{}", VERSION);
            println!("Run `rust_dge_workflow --help` for usage.");
            return;
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

struct RunArgs {
    counts: PathBuf,
    metadata: PathBuf,
    config: Option<PathBuf>,
    output: PathBuf,
    /// `None` means query BioMart
    gene_map: Option<PathBuf>,
    precomputed: Option<(PathBuf, PathBuf)>,
    precomputed_id_column: String,
    threads: usize,
}

fn load_config(path: Option<&Path>) -> Result<WorkflowConfig> {
    match path {
        Some(path) => WorkflowConfig::from_path(path),
        None => Ok(WorkflowConfig::default()),
    }
}

fn run_full(args: RunArgs) -> Result<()> {
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .ok();
    }

    let config = load_config(args.config.as_deref())?;

    let model: Box<dyn ExpressionModel> = match args.precomputed {
        Some((normalized, transformed)) => Box::new(PrecomputedModel::new(
            normalized,
            transformed,
            &args.precomputed_id_column,
            config.model.ntop,
        )
        .with_normalizer(config.samples.id_normalizer.clone())),
        None => Box::new(ShiftedLogModel::new(config.model.clone())?),
    };
    let source: Box<dyn GeneMapSource> = match args.gene_map {
        Some(path) => Box::new(TableGeneMapSource::new(path)),
        None => Box::new(BiomartClient::new(config.annotation.biomart.clone())?),
    };

    let output = run_workflow(&config, &args.counts, &args.metadata, model.as_ref(), source.as_ref())?;
    output.write_outputs(&args.output, &config)?;

    info!("Done!");
    Ok(())
}

fn run_filter(
    counts_path: &Path,
    metadata_path: &Path,
    config_path: Option<&Path>,
    min_total: Option<u64>,
    min_signal: Option<u64>,
    strict: bool,
    output_path: &Path,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut thresholds = config.filter;
    if let Some(min_total) = min_total {
        thresholds.min_total = min_total;
    }
    if let Some(min_signal) = min_signal {
        thresholds.min_signal = min_signal;
    }
    if strict {
        thresholds.comparison = Comparison::Strict;
    }

    info!("Loading metadata from: {}", metadata_path.display());
    let samples = normalize_metadata(&read_metadata(metadata_path)?, &config.samples, &config.conditions)?;

    info!("Loading count matrix from: {}", counts_path.display());
    let counts = read_count_matrix(counts_path, &config.counts, &config.samples.id_normalizer)?;
    let counts = align_samples(&counts, &samples)?;

    let (filtered, summary) = filter_counts(&counts, &thresholds)?;
    info!(
        "Kept {} of {} genes ({} below total, {} single-sample signal)",
        summary.n_kept, summary.n_input, summary.failed_total, summary.failed_signal
    );

    info!("Writing filtered counts to: {}", output_path.display());
    write_count_matrix(output_path, &filtered, &config.counts.gene_id_column)?;
    Ok(())
}

fn run_annotate(
    input_path: &Path,
    id_column: &str,
    gene_map_path: &Path,
    map_id_column: &str,
    reject_duplicates: bool,
    output_path: &Path,
) -> Result<()> {
    let policy = if reject_duplicates {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::FirstWins
    };

    info!("Loading table from: {}", input_path.display());
    let table = read_table(input_path)?;
    info!("Loading gene map from: {}", gene_map_path.display());
    let gene_map = GeneMap::from_table(&read_table(gene_map_path)?, map_id_column, policy)?;
    info!("  {} genes in map", gene_map.len());

    let annotated = annotate(&table, id_column, &gene_map)?;
    info!("Writing annotated table to: {}", output_path.display());
    write_table(output_path, &annotated)?;
    Ok(())
}
