//! Data structures for the workflow

mod count_matrix;
mod expression;
mod factor;
mod gene_map;
mod metadata;
mod table;

pub use count_matrix::CountMatrix;
pub use expression::ExpressionMatrix;
pub use factor::ConditionFactor;
pub use gene_map::{DuplicatePolicy, GeneMap};
pub use metadata::{RawMetadata, SampleMetadata};
pub use table::{Cell, Table};
