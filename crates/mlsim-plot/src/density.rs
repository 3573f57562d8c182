use mlsim_core::stats;
use mlsim_post::{contrast_values, ContrastSample, IntervalSummary};

use crate::figures::{
    dashed_line, empty_svg, line, open_svg, point, Axis, FigureConfig, ACCENT, AREA_FILL, MARGIN,
};

/// Silverman's rule of thumb (R's `bw.nrd0`).
///
/// Falls back to the sd, then `|x₀|`, then 1 when the spread estimate is zero.
pub fn bandwidth_nrd0(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let sorted = stats::sorted(values);
    let sd = stats::std_dev(values);
    let iqr = stats::quantile_sorted(&sorted, 0.75) - stats::quantile_sorted(&sorted, 0.25);
    let mut spread = sd.min(iqr / 1.34);
    if spread <= 0.0 {
        spread = sd;
    }
    if spread <= 0.0 {
        spread = values[0].abs();
    }
    if spread <= 0.0 {
        spread = 1.0;
    }
    0.9 * spread * (values.len() as f64).powf(-0.2)
}

/// Gaussian kernel density estimate on an evenly spaced grid.
///
/// The grid extends three bandwidths beyond the sample range. Returns
/// `(x, density)` pairs; empty for fewer than two samples.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Vec<(f64, f64)> {
    let bw = bandwidth_nrd0(values);
    if !bw.is_finite() || bw <= 0.0 || grid_points < 2 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bw;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bw;
    let step = (max - min) / (grid_points - 1) as f64;
    let norm = 1.0 / (values.len() as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());
    (0..grid_points)
        .map(|index| {
            let x = min + step * index as f64;
            let density = values
                .iter()
                .map(|value| {
                    let z = (x - value) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect()
}

fn histogram(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<(f64, f64, f64)> {
    let bins = bins.max(1);
    let span = max - min;
    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        let idx = (((value - min) / span) * bins as f64).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }
    let scale = 1.0 / (values.len() as f64 * width);
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| {
            let left = min + width * idx as f64;
            (left, left + width, count as f64 * scale)
        })
        .collect()
}

/// Density of the contrast with its 95 % HDI and median along the baseline.
pub fn density_chart(
    contrasts: &[ContrastSample],
    summary: &IntervalSummary,
    config: &FigureConfig,
) -> String {
    let values = contrast_values(contrasts);
    let curve = gaussian_kde(&values, config.grid_points);
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return empty_svg(config);
    };
    let x_min = first.0.min(0.0);
    let x_max = last.0.max(0.0);
    let peak = curve.iter().map(|(_, d)| *d).fold(0.0, f64::max);
    let bars = histogram(&values, first.0, last.0, config.bins);
    let top = bars.iter().map(|(_, _, d)| *d).fold(peak, f64::max);
    let (Some(x_axis), Some(y_axis)) = (
        Axis::new(x_min, x_max, config.width),
        Axis::new(0.0, top * 1.05, config.height),
    ) else {
        return empty_svg(config);
    };
    let baseline = y_axis.project_flipped(0.0);

    let mut parts = vec![open_svg(config)];
    for (left, right, density) in &bars {
        let x = x_axis.project(*left);
        let y = y_axis.project_flipped(*density);
        parts.push(format!(
            "<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='#e5e7eb' />",
            x,
            y,
            (x_axis.project(*right) - x).max(0.5),
            baseline - y
        ));
    }

    let mut path = format!("M{:.2},{:.2}", x_axis.project(first.0), baseline);
    for (x, density) in &curve {
        path.push_str(&format!(
            " L{:.2},{:.2}",
            x_axis.project(*x),
            y_axis.project_flipped(*density)
        ));
    }
    path.push_str(&format!(" L{:.2},{:.2} Z", x_axis.project(last.0), baseline));
    parts.push(format!(
        "<path d='{path}' fill='{AREA_FILL}' fill-opacity='0.7' stroke='{ACCENT}' stroke-width='1.5' />"
    ));

    parts.push(dashed_line(x_axis.project(0.0), MARGIN, baseline));
    if x_axis.contains(summary.hdi95.lower) && x_axis.contains(summary.hdi95.upper) {
        parts.push(line(
            x_axis.project(summary.hdi95.lower),
            baseline,
            x_axis.project(summary.hdi95.upper),
            baseline,
            ACCENT,
            4.0,
        ));
    }
    if x_axis.contains(summary.median) {
        parts.push(point(x_axis.project(summary.median), baseline, 4.0));
    }
    parts.push("</svg>".into());
    parts.join("")
}
