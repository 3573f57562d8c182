#![deny(missing_docs)]

//! Posterior post-processing: long-form reshaping, paired condition
//! contrasts, highest-density intervals and direction labels.

/// Replication-id join between condition rows.
pub mod contrast;
/// Highest-density intervals.
pub mod hdi;
/// Wide-to-long reshaping of draw matrices.
pub mod reshape;
/// Interval summaries and direction labels.
pub mod summary;

pub use contrast::{contrast, contrast_values, ContrastSample};
pub use hdi::{hdi, nested_hdi, Interval};
pub use reshape::{condition_grid, reshape, PosteriorRow, PosteriorTable};
pub use summary::{direction_label, summarize, summarize_values, IntervalSummary};
