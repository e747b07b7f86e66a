//! Gene pre-filtering on raw counts

mod counts;

pub use counts::{filter_counts, Comparison, FilterSummary, FilterThresholds};
