//! Left join of a gene map onto gene-indexed tables

use crate::data::{Cell, GeneMap, Table};
use crate::error::Result;

use super::canonical::{canonical_column_name, canonicalize_columns, names_equivalent};

/// Suffixes for columns present on both sides of the join
const LEFT_SUFFIX: &str = ".x";
const RIGHT_SUFFIX: &str = ".y";

/// Left-join `gene_map` onto `table` using `id_column` of the table.
///
/// Columns collide when their canonical names are equivalent, so a table
/// that already carries `MGI_Symbol` gets `MGI_Symbol.x` next to the map's
/// `mgi_symbol.y`.
///
/// Every row of `table` appears exactly once and in its original order, with
/// its own cells untouched; gene-map attributes are appended and are `Null`
/// when the gene is not in the map. All output column names are then
/// canonicalized.
///
/// `gene_map` is unique by construction, so the join never duplicates rows.
pub fn annotate(table: &Table, id_column: &str, gene_map: &GeneMap) -> Result<Table> {
    let id_idx = table.require_column(id_column, "results table")?;

    let mut left_columns = table.columns().to_vec();
    let mut right_columns = gene_map.attributes().to_vec();
    for right in right_columns.iter_mut() {
        let right_name = canonical_column_name(right).into_owned();
        if let Some(left) = left_columns
            .iter_mut()
            .find(|l| names_equivalent(&canonical_column_name(l), &right_name))
        {
            left.push_str(LEFT_SUFFIX);
            right.push_str(RIGHT_SUFFIX);
        }
    }

    let mut columns = left_columns;
    columns.extend(right_columns);

    let n_attributes = gene_map.attributes().len();
    let mut n_unmatched = 0usize;
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .map(|row| {
            let mut out = row.clone();
            let matched = row[id_idx]
                .as_text()
                .and_then(|id| gene_map.get(&id).map(|values| values.to_vec()));
            match matched {
                Some(values) => out.extend(values.into_iter().map(Cell::from)),
                None => {
                    n_unmatched += 1;
                    out.extend(std::iter::repeat(Cell::Null).take(n_attributes));
                }
            }
            out
        })
        .collect();

    if n_unmatched > 0 {
        log::warn!(
            "{} of {} genes have no entry in the gene map",
            n_unmatched,
            table.n_rows()
        );
    }

    Table::new(canonicalize_columns(&columns), rows)
}
