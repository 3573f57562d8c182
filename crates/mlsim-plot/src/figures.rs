use std::fs;
use std::path::Path;

use mlsim_core::{ErrorInfo, MlsimError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Chart dimensions and density resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// SVG width in pixels.
    pub width: u32,
    /// SVG height in pixels.
    pub height: u32,
    /// Points at which the density estimate is evaluated.
    pub grid_points: usize,
    /// Histogram bins drawn behind the density curve.
    pub bins: usize,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 240,
            grid_points: 256,
            bins: 30,
        }
    }
}

pub(crate) const MARGIN: f64 = 24.0;
pub(crate) const AREA_FILL: &str = "#93c5fd";
pub(crate) const ACCENT: &str = "#1d4ed8";
pub(crate) const REFERENCE: &str = "#6b7280";

pub(crate) fn empty_svg(config: &FigureConfig) -> String {
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}'></svg>",
        w = config.width,
        h = config.height
    )
}

pub(crate) fn open_svg(config: &FigureConfig) -> String {
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>",
        w = config.width,
        h = config.height
    )
}

/// Linear map from data coordinates onto `[MARGIN, extent - MARGIN]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Axis {
    min: f64,
    max: f64,
    extent: f64,
}

impl Axis {
    /// `None` when the range is empty or not finite.
    pub fn new(min: f64, max: f64, extent: u32) -> Option<Self> {
        let extent = f64::from(extent);
        if !(min.is_finite() && max.is_finite()) || max <= min || extent <= 2.0 * MARGIN {
            return None;
        }
        Some(Self { min, max, extent })
    }

    pub fn project(&self, value: f64) -> f64 {
        MARGIN + (value - self.min) / (self.max - self.min) * (self.extent - 2.0 * MARGIN)
    }

    /// Projection with the screen direction flipped, for vertical axes.
    pub fn project_flipped(&self, value: f64) -> f64 {
        self.extent - self.project(value)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

pub(crate) fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) -> String {
    format!(
        "<line x1='{x1:.2}' y1='{y1:.2}' x2='{x2:.2}' y2='{y2:.2}' stroke='{stroke}' stroke-width='{width:.1}' />"
    )
}

pub(crate) fn dashed_line(x: f64, y1: f64, y2: f64) -> String {
    format!(
        "<line x1='{x:.2}' y1='{y1:.2}' x2='{x:.2}' y2='{y2:.2}' stroke='{REFERENCE}' stroke-width='1.0' stroke-dasharray='4 3' />"
    )
}

pub(crate) fn point(x: f64, y: f64, radius: f64) -> String {
    format!("<circle cx='{x:.2}' cy='{y:.2}' r='{radius:.1}' fill='{ACCENT}' />")
}

/// Writes an SVG document, creating parent directories.
pub fn write_svg(path: &Path, svg: &str) -> Result<(), MlsimError> {
    let plot_error = |code: &str, err: std::io::Error, at: &Path| {
        MlsimError::Plot(ErrorInfo::new(code, err.to_string()).with_context("path", at.display()))
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| plot_error("plot-mkdir", err, parent))?;
        }
    }
    fs::write(path, svg).map_err(|err| plot_error("plot-write", err, path))?;
    info!(path = %path.display(), bytes = svg.len(), "chart written");
    Ok(())
}
