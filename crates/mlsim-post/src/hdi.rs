use mlsim_core::{stats, ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};

/// Closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Interval {
    /// `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// True when `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// True when `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

/// Highest-density interval holding `mass` of the samples.
///
/// Takes the narrowest window of `ceil(mass * n)` consecutive order
/// statistics; on ties the lowest window wins.
pub fn hdi(samples: &[f64], mass: f64) -> Result<Interval, MlsimError> {
    let mut intervals = nested_hdi(samples, &[mass])?;
    Ok(intervals.remove(0))
}

/// Highest-density intervals for several masses that nest by mass.
///
/// The smallest mass gets the unconstrained narrowest window. Each larger
/// mass then takes the narrowest window that encloses the previous one, so
/// a wider interval always contains every narrower one. Results follow the
/// order of `masses`.
pub fn nested_hdi(samples: &[f64], masses: &[f64]) -> Result<Vec<Interval>, MlsimError> {
    if let Some(mass) = masses.iter().find(|mass| !(**mass > 0.0 && **mass < 1.0)) {
        return Err(MlsimError::Interval(
            ErrorInfo::new("hdi-mass-range", "interval mass must lie strictly between 0 and 1")
                .with_context("mass", mass),
        ));
    }
    if samples.is_empty() {
        return Err(MlsimError::Interval(ErrorInfo::new(
            "hdi-empty",
            "cannot compute an interval from no samples",
        )));
    }
    if let Some(position) = samples.iter().position(|value| !value.is_finite()) {
        return Err(MlsimError::Interval(
            ErrorInfo::new("hdi-non-finite", "samples must be finite")
                .with_context("index", position)
                .with_context("value", samples[position]),
        ));
    }
    let sorted = stats::sorted(samples);
    let n = sorted.len();
    if sorted[0] == sorted[n - 1] {
        return Err(MlsimError::Interval(
            ErrorInfo::new("hdi-zero-variance", "all samples are identical")
                .with_context("value", sorted[0])
                .with_context("samples", n),
        ));
    }

    let mut order: Vec<usize> = (0..masses.len()).collect();
    order.sort_by(|a, b| masses[*a].total_cmp(&masses[*b]));
    let mut intervals = vec![Interval { lower: 0.0, upper: 0.0 }; masses.len()];
    // (first, last) indices of the previous, narrower window.
    let mut inner: Option<(usize, usize)> = None;
    for index in order {
        let window = window_size(masses[index], n);
        // A larger window always fits around the inner one: it is at least
        // as long and both lie inside [0, n).
        let (lo, hi) = match inner {
            Some((first, last)) => ((last + 1).saturating_sub(window), first.min(n - window)),
            None => (0, n - window),
        };
        let start = narrowest_start(&sorted, window, lo, hi);
        inner = Some((start, start + window - 1));
        intervals[index] = Interval {
            lower: sorted[start],
            upper: sorted[start + window - 1],
        };
    }
    Ok(intervals)
}

fn window_size(mass: f64, n: usize) -> usize {
    // The tolerance keeps e.g. 0.95 * 100 from rounding up to 96 points.
    ((mass * n as f64 - 1e-9).ceil() as usize).clamp(1, n)
}

fn narrowest_start(sorted: &[f64], window: usize, lo: usize, hi: usize) -> usize {
    let mut best = lo;
    let mut best_width = f64::INFINITY;
    for start in lo..=hi {
        let width = sorted[start + window - 1] - sorted[start];
        if width < best_width {
            best = start;
            best_width = width;
        }
    }
    best
}
