use std::fs;

use mlsim_plot::{density_chart, pointrange_chart, write_svg, FigureConfig};
use mlsim_post::{summarize, ContrastSample, Interval, IntervalSummary};
use tempfile::tempdir;

fn samples() -> Vec<ContrastSample> {
    (1..=400)
        .map(|replication| ContrastSample {
            replication,
            contrast: 0.6 + ((replication as f64) * 0.731).sin() * 1.3,
        })
        .collect()
}

#[test]
fn density_chart_is_deterministic() {
    let contrasts = samples();
    let summary = summarize(&contrasts).unwrap();
    let config = FigureConfig::default();
    let a = density_chart(&contrasts, &summary, &config);
    let b = density_chart(&contrasts, &summary, &config);
    assert_eq!(a, b);
    assert!(a.starts_with("<svg"));
    assert!(a.ends_with("</svg>"));
    assert!(a.contains("<path d='M"));
    assert!(a.contains("stroke-dasharray"));
    assert!(a.contains("<circle"));
    assert_eq!(a.matches("<rect").count(), config.bins);
}

#[test]
fn pointrange_chart_shows_both_intervals_and_label() {
    let contrasts = samples();
    let summary = summarize(&contrasts).unwrap();
    let svg = pointrange_chart(&summary, &FigureConfig::default());
    assert_eq!(svg.matches("<line").count(), 3);
    assert!(svg.contains("stroke-width='5.0'"));
    assert!(svg.contains("stroke-width='1.5'"));
    assert!(svg.contains(&format!(">{}</text>", mlsim_post::direction_label(&summary))));
}

#[test]
fn degenerate_inputs_render_empty_svg() {
    let config = FigureConfig {
        width: 100,
        height: 60,
        grid_points: 32,
        bins: 4,
    };
    let empty = "<svg xmlns='http://www.w3.org/2000/svg' width='100' height='60'></svg>";
    let point = Interval {
        lower: 0.0,
        upper: 0.0,
    };
    let summary = IntervalSummary {
        mean: 0.0,
        median: 0.0,
        hdi95: point,
        hdi99: point,
        above_zero: 0.0,
        below_zero: 0.0,
        samples: 1,
    };
    let one = [ContrastSample {
        replication: 1,
        contrast: 0.0,
    }];
    assert_eq!(density_chart(&[], &summary, &config), empty);
    assert_eq!(density_chart(&one, &summary, &config), empty);
    assert_eq!(pointrange_chart(&summary, &config), empty);

    let nan = IntervalSummary {
        median: f64::NAN,
        hdi99: Interval {
            lower: -1.0,
            upper: f64::NAN,
        },
        ..summary
    };
    assert_eq!(pointrange_chart(&nan, &config), empty);
}

#[test]
fn svg_is_written_to_nested_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("charts").join("density.svg");
    let contrasts = samples();
    let summary = summarize(&contrasts).unwrap();
    let svg = density_chart(&contrasts, &summary, &FigureConfig::default());
    write_svg(&path, &svg).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), svg);
}
