//! Writers for workflow outputs

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::data::{CountMatrix, Table};
use crate::error::Result;

fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    Ok(csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?)
}

/// Write a table as TSV; nulls are written as `NA`
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let mut writer = tsv_writer(path.as_ref())?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write raw counts with the gene id column first
pub fn write_count_matrix<P: AsRef<Path>>(path: P, counts: &CountMatrix, id_column: &str) -> Result<()> {
    let mut writer = tsv_writer(path.as_ref())?;

    let mut header = vec![id_column.to_string()];
    header.extend(counts.sample_ids().iter().cloned());
    writer.write_record(&header)?;

    for (i, gene) in counts.gene_ids().iter().enumerate() {
        let mut record = vec![gene.clone()];
        record.extend(counts.gene_counts(i).iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Serialize rows of a struct as TSV using its field names as header
pub fn write_records<P, T>(path: P, records: &[T]) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let mut writer = tsv_writer(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON
pub fn write_json<P, T>(path: P, value: &T) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
