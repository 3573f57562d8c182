use mlsim_core::{stats, MlsimError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contrast::{contrast_values, ContrastSample};
use crate::hdi::{nested_hdi, Interval};

/// Location, uncertainty and direction of a contrast distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSummary {
    /// Sample mean.
    pub mean: f64,
    /// Sample median.
    pub median: f64,
    /// 95 % highest-density interval.
    pub hdi95: Interval,
    /// 99 % highest-density interval; always encloses `hdi95`.
    pub hdi99: Interval,
    /// Share of samples strictly above zero.
    pub above_zero: f64,
    /// Share of samples strictly below zero.
    pub below_zero: f64,
    /// Number of samples summarized.
    pub samples: usize,
}

/// Summarizes contrast samples.
pub fn summarize(contrasts: &[ContrastSample]) -> Result<IntervalSummary, MlsimError> {
    summarize_values(&contrast_values(contrasts))
}

/// Summarizes raw values; see [`summarize`].
pub fn summarize_values(values: &[f64]) -> Result<IntervalSummary, MlsimError> {
    let intervals = nested_hdi(values, &[0.95, 0.99])?;
    let (hdi95, hdi99) = (intervals[0], intervals[1]);
    let n = values.len() as f64;
    let above = values.iter().filter(|value| **value > 0.0).count() as f64;
    let below = values.iter().filter(|value| **value < 0.0).count() as f64;
    let sorted = stats::sorted(values);
    let summary = IntervalSummary {
        mean: stats::mean(values),
        median: stats::median_sorted(&sorted),
        hdi95,
        hdi99,
        above_zero: above / n,
        below_zero: below / n,
        samples: values.len(),
    };
    debug!(
        mean = summary.mean,
        lower95 = summary.hdi95.lower,
        upper95 = summary.hdi95.upper,
        "summarized contrast"
    );
    Ok(summary)
}

/// Renders the dominant direction as e.g. `"92%>0"` or `"71%<0"`.
///
/// Above zero wins ties. The percentage is rounded half away from zero.
pub fn direction_label(summary: &IntervalSummary) -> String {
    if summary.above_zero >= summary.below_zero {
        format!("{}%>0", percent(summary.above_zero))
    } else {
        format!("{}%<0", percent(summary.below_zero))
    }
}

fn percent(share: f64) -> i64 {
    (100.0 * share).round() as i64
}
