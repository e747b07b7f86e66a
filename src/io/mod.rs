//! Input/Output operations

mod csv;
mod results;

pub use self::csv::{
    align_samples, read_count_matrix, read_expression_matrix, read_metadata, read_table, CountsLayout,
};
pub use results::{write_count_matrix, write_json, write_records, write_table};
