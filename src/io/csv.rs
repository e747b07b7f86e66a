//! Delimited-text readers for counts, metadata and gene-indexed tables

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::condition::SampleIdNormalizer;
use crate::data::{Cell, CountMatrix, ExpressionMatrix, RawMetadata, SampleMetadata, Table};
use crate::error::{DgeError, Result};

/// Column layout of the counts file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountsLayout {
    pub gene_id_column: String,
    /// Non-sample columns to ignore (featureCounts annotation columns)
    pub auxiliary_columns: Vec<String>,
}

impl Default for CountsLayout {
    fn default() -> Self {
        Self {
            gene_id_column: "Geneid".to_string(),
            auxiliary_columns: ["Chr", "Start", "End", "Strand", "Length"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Pick tab or comma from the first non-comment line
fn detect_delimiter(path: &Path) -> Result<u8> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        return Ok(if line.contains('\t') { b'\t' } else { b',' });
    }
    Err(DgeError::EmptyData {
        reason: format!("{} has no header line", path.display()),
    })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    open_reader_with(path, false)
}

/// `flexible` lets rows differ in length from the header; callers check
fn open_reader_with(path: &Path, flexible: bool) -> Result<csv::Reader<File>> {
    let delimiter = detect_delimiter(path)?;
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(flexible)
        .from_path(path)?;
    Ok(reader)
}

fn header(reader: &mut csv::Reader<File>) -> Result<Vec<String>> {
    Ok(reader.headers()?.iter().map(str::to_string).collect())
}

/// Read the metadata table as raw strings
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<RawMetadata> {
    let mut reader = open_reader(path.as_ref())?;
    let columns = header(&mut reader)?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    RawMetadata::new(columns, records)
}

fn parse_count(value: &str, gene: &str, sample: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| DgeError::InvalidCount {
        gene: gene.to_string(),
        sample: sample.to_string(),
        value: value.to_string(),
    })
}

/// Read a raw count matrix.
///
/// Every column other than the gene id and the layout's auxiliary columns is
/// a sample column; its name is passed through `normalizer` so it matches the
/// normalized metadata sample ids.
pub fn read_count_matrix<P: AsRef<Path>>(
    path: P,
    layout: &CountsLayout,
    normalizer: &SampleIdNormalizer,
) -> Result<CountMatrix> {
    let mut reader = open_reader(path.as_ref())?;
    let columns = header(&mut reader)?;

    let gene_idx = columns
        .iter()
        .position(|c| c == &layout.gene_id_column)
        .ok_or_else(|| DgeError::missing_column("counts", &layout.gene_id_column))?;

    let sample_cols: Vec<usize> = (0..columns.len())
        .filter(|&i| i != gene_idx && !layout.auxiliary_columns.contains(&columns[i]))
        .collect();
    if sample_cols.is_empty() {
        return Err(DgeError::InvalidInput {
            reason: "counts file has no sample columns".to_string(),
        });
    }

    let sample_ids = sample_cols
        .iter()
        .map(|&i| normalizer.normalize(&columns[i]))
        .collect::<Result<Vec<String>>>()?;

    let mut gene_ids = Vec::new();
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let gene = record.get(gene_idx).unwrap_or_default().to_string();
        for (&col, sample) in sample_cols.iter().zip(sample_ids.iter()) {
            values.push(parse_count(record.get(col).unwrap_or_default(), &gene, sample)?);
        }
        gene_ids.push(gene);
    }

    if gene_ids.is_empty() {
        return Err(DgeError::EmptyData {
            reason: "No genes found in count matrix".to_string(),
        });
    }

    let counts = Array2::from_shape_vec((gene_ids.len(), sample_ids.len()), values).map_err(|e| {
        DgeError::InvalidInput {
            reason: format!("count matrix shape: {}", e),
        }
    })?;

    CountMatrix::new(counts, gene_ids, sample_ids)
}

/// Check that counts and metadata describe the same samples, by identifier,
/// and reorder the count columns to metadata order.
pub fn align_samples(counts: &CountMatrix, metadata: &SampleMetadata) -> Result<CountMatrix> {
    let in_counts: HashSet<&str> = counts.sample_ids().iter().map(String::as_str).collect();
    let in_metadata: HashSet<&str> = metadata.sample_ids().iter().map(String::as_str).collect();

    let mut missing: Vec<&str> = in_metadata.difference(&in_counts).copied().collect();
    let mut extra: Vec<&str> = in_counts.difference(&in_metadata).copied().collect();
    if !missing.is_empty() || !extra.is_empty() {
        missing.sort_unstable();
        extra.sort_unstable();
        return Err(DgeError::SampleMismatch {
            reason: format!(
                "{} counts columns vs {} metadata rows; missing from counts: [{}]; not in metadata: [{}]",
                counts.n_samples(),
                metadata.n_samples(),
                missing.join(", "),
                extra.join(", ")
            ),
        });
    }

    if counts.sample_ids() != metadata.sample_ids() {
        log::info!("Reordering count columns to match metadata sample order");
    }
    counts.reorder_samples(metadata.sample_ids())
}

/// Read any delimited table; every cell is text or null
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let mut reader = open_reader(path.as_ref())?;
    let columns = header(&mut reader)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from_field).collect());
    }

    Table::new(columns, rows)
}

/// Read a gene-by-sample table of real values, e.g. normalized counts or
/// variance-stabilized values written by another tool.
///
/// The gene ids come from `id_column` or, for R's `write.table` output, from
/// the row names: either a blank first header cell (`col.names = NA`) or a
/// header with one field fewer than the data rows (the default).
pub fn read_expression_matrix<P: AsRef<Path>>(path: P, id_column: &str) -> Result<ExpressionMatrix> {
    let path = path.as_ref();
    let mut reader = open_reader_with(path, true)?;
    let mut columns = header(&mut reader)?;
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let id_idx = match columns.iter().position(|c| c == id_column) {
        Some(idx) => idx,
        None if columns.first().map(String::as_str) == Some("") => 0,
        None if records.first().map_or(false, |r| r.len() == columns.len() + 1) => {
            columns.insert(0, String::new());
            0
        }
        None => return Err(DgeError::missing_column(&path.display().to_string(), id_column)),
    };

    let sample_ids: Vec<String> = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx)
        .map(|(_, c)| c.clone())
        .collect();

    let mut gene_ids = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len() * sample_ids.len());
    for (line, record) in records.iter().enumerate() {
        if record.len() != columns.len() {
            return Err(DgeError::InvalidInput {
                reason: format!(
                    "{}: data row {} has {} fields, header has {}",
                    path.display(),
                    line + 1,
                    record.len(),
                    columns.len()
                ),
            });
        }
        let gene = record.get(id_idx).unwrap_or_default().to_string();
        for (i, field) in record.iter().enumerate().filter(|(i, _)| *i != id_idx) {
            let v = field.parse::<f64>().map_err(|_| DgeError::InvalidInput {
                reason: format!(
                    "non-numeric value '{}' for gene '{}', column '{}'",
                    field, gene, columns[i]
                ),
            })?;
            values.push(v);
        }
        gene_ids.push(gene);
    }

    let data = Array2::from_shape_vec((gene_ids.len(), sample_ids.len()), values).map_err(|e| {
        DgeError::InvalidInput {
            reason: format!("expression matrix shape: {}", e),
        }
    })?;

    ExpressionMatrix::new(data, gene_ids, sample_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{normalize_metadata, ConditionScheme, SampleConfig};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_featurecounts_matrix() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# Program:featureCounts v2.0.1").unwrap();
        writeln!(file, "Geneid\tChr\tStart\tEnd\tStrand\tLength\tNv-1\tLM-1").unwrap();
        writeln!(file, "ENSMUSG00000000001\tchr3\t1\t100\t-\t100\t120\t80").unwrap();
        writeln!(file, "ENSMUSG00000000003\tchrX\t5\t900\t+\t895\t0\t3").unwrap();

        let matrix =
            read_count_matrix(file.path(), &CountsLayout::default(), &SampleIdNormalizer::default())
                .unwrap();
        assert_eq!(matrix.n_genes(), 2);
        assert_eq!(matrix.sample_ids(), &["Nv__1".to_string(), "LM__1".to_string()]);
        assert_eq!(matrix.gene_counts(0).to_vec(), vec![120, 80]);
    }

    #[test]
    fn test_comma_delimited_and_missing_gene_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "gene,s1,s2").unwrap();
        writeln!(file, "G1,1,2").unwrap();

        let err = read_count_matrix(file.path(), &CountsLayout::default(), &SampleIdNormalizer::default())
            .unwrap_err();
        assert!(matches!(err, DgeError::MissingColumn { ref column, .. } if column == "Geneid"));

        let layout = CountsLayout {
            gene_id_column: "gene".to_string(),
            ..CountsLayout::default()
        };
        let matrix = read_count_matrix(file.path(), &layout, &SampleIdNormalizer::default()).unwrap();
        assert_eq!(matrix.n_samples(), 2);
    }

    #[test]
    fn test_non_integer_count_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Geneid\ts1").unwrap();
        writeln!(file, "G1\t2.5").unwrap();

        let err = read_count_matrix(file.path(), &CountsLayout::default(), &SampleIdNormalizer::default())
            .unwrap_err();
        assert!(matches!(err, DgeError::InvalidCount { .. }));
    }

    #[test]
    fn test_align_samples_by_identifier() {
        let mut counts_file = NamedTempFile::new().unwrap();
        writeln!(counts_file, "Geneid\tB-1\tA-1").unwrap();
        writeln!(counts_file, "G1\t7\t3").unwrap();

        let mut meta_file = NamedTempFile::new().unwrap();
        writeln!(meta_file, "SampleID\tCondition\tDay").unwrap();
        writeln!(meta_file, "A-1\tNaive\t3").unwrap();
        writeln!(meta_file, "B-1\t\"Listeria\"\t3").unwrap();

        let raw = read_metadata(meta_file.path()).unwrap();
        let metadata =
            normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default()).unwrap();
        let counts = read_count_matrix(
            counts_file.path(),
            &CountsLayout::default(),
            &SampleIdNormalizer::default(),
        )
        .unwrap();

        let aligned = align_samples(&counts, &metadata).unwrap();
        assert_eq!(aligned.sample_ids(), metadata.sample_ids());
        assert_eq!(aligned.gene_counts(0).to_vec(), vec![3, 7]);
    }

    #[test]
    fn test_align_samples_reports_mismatch() {
        let mut counts_file = NamedTempFile::new().unwrap();
        writeln!(counts_file, "Geneid\tA-1\tC-1").unwrap();
        writeln!(counts_file, "G1\t7\t3").unwrap();

        let mut meta_file = NamedTempFile::new().unwrap();
        writeln!(meta_file, "SampleID,Condition").unwrap();
        writeln!(meta_file, "A-1,Naive").unwrap();
        writeln!(meta_file, "B-1,Tolerant").unwrap();

        let raw = read_metadata(meta_file.path()).unwrap();
        let metadata =
            normalize_metadata(&raw, &SampleConfig::default(), &ConditionScheme::default()).unwrap();
        let counts = read_count_matrix(
            counts_file.path(),
            &CountsLayout::default(),
            &SampleIdNormalizer::default(),
        )
        .unwrap();

        match align_samples(&counts, &metadata).unwrap_err() {
            DgeError::SampleMismatch { reason } => {
                assert!(reason.contains("B__1"));
                assert!(reason.contains("C__1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_read_expression_matrix_with_blank_rowname_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\ts1\ts2").unwrap();
        writeln!(file, "G1\t1.5\t2.25").unwrap();

        let m = read_expression_matrix(file.path(), "GeneID").unwrap();
        assert_eq!(m.gene_ids(), &["G1".to_string()]);
        assert_eq!(m.data()[[0, 1]], 2.25);
    }

    #[test]
    fn test_read_expression_matrix_with_short_rowname_header() {
        // write.table default: no header cell above the row names
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\"S-1\"\t\"S-2\"").unwrap();
        writeln!(file, "\"G1\"\t1.5\t2.25").unwrap();
        writeln!(file, "\"G2\"\t0\t4").unwrap();

        let m = read_expression_matrix(file.path(), "GeneID").unwrap();
        assert_eq!(m.sample_ids(), &["S-1".to_string(), "S-2".to_string()]);
        assert_eq!(m.gene_ids(), &["G1".to_string(), "G2".to_string()]);
        assert_eq!(m.data()[[1, 1]], 4.0);
    }

    #[test]
    fn test_read_expression_matrix_ragged_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "GeneID\ts1\ts2").unwrap();
        writeln!(file, "G1\t1.0\t2.0").unwrap();
        writeln!(file, "G2\t1.0").unwrap();

        let err = read_expression_matrix(file.path(), "GeneID").unwrap_err();
        assert!(matches!(err, DgeError::InvalidInput { ref reason } if reason.contains("row 2")));
    }
}
