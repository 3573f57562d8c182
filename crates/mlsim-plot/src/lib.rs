#![deny(missing_docs)]

//! SVG rendering for contrast densities and interval point-ranges.
//!
//! Charts are plain strings so output is byte-for-byte reproducible.

/// Kernel density estimate and the contrast density chart.
pub mod density;
/// Figure sizing, axes, SVG primitives and file output.
pub mod figures;
/// Median and HDI point-range chart.
pub mod pointrange;

pub use density::{bandwidth_nrd0, density_chart, gaussian_kde};
pub use figures::{write_svg, FigureConfig};
pub use pointrange::pointrange_chart;
