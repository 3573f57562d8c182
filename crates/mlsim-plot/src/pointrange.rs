use mlsim_post::{direction_label, IntervalSummary};

use crate::figures::{dashed_line, empty_svg, line, open_svg, point, Axis, FigureConfig, ACCENT, MARGIN};

/// Median with thick 95 % and thin 99 % HDI lines and the direction label.
pub fn pointrange_chart(summary: &IntervalSummary, config: &FigureConfig) -> String {
    let lower = summary.hdi99.lower.min(summary.hdi95.lower).min(0.0);
    let upper = summary.hdi99.upper.max(summary.hdi95.upper).max(0.0);
    let pad = (upper - lower) * 0.05;
    let Some(x_axis) = Axis::new(lower - pad, upper + pad, config.width) else {
        return empty_svg(config);
    };
    if !summary.median.is_finite() || f64::from(config.height) <= 2.0 * MARGIN {
        return empty_svg(config);
    }
    let y = f64::from(config.height) / 2.0;

    let mut parts = vec![open_svg(config)];
    parts.push(dashed_line(x_axis.project(0.0), MARGIN, f64::from(config.height) - MARGIN));
    parts.push(line(
        x_axis.project(summary.hdi99.lower),
        y,
        x_axis.project(summary.hdi99.upper),
        y,
        ACCENT,
        1.5,
    ));
    parts.push(line(
        x_axis.project(summary.hdi95.lower),
        y,
        x_axis.project(summary.hdi95.upper),
        y,
        ACCENT,
        5.0,
    ));
    parts.push(point(x_axis.project(summary.median), y, 5.0));
    parts.push(format!(
        "<text x='{:.2}' y='{:.2}' text-anchor='middle' font-family='sans-serif' font-size='14'>{}</text>",
        x_axis.project(summary.median),
        y - 14.0,
        direction_label(summary)
    ));
    parts.push("</svg>".into());
    parts.join("")
}
