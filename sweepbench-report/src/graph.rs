//! Graph Output
//!
//! One chart per group: x is the swept parameter, y the measurement on a log
//! scale, one series per function. With ratios enabled each group also gets
//! a chart of `comparison / reference` on a linear scale.
//!
//! Charts are plain data ([`Chart`]); a [`Plotter`] turns them into files.
//! [`SvgPlotter`] writes standalone SVG with no extra dependencies.

use std::path::{Path, PathBuf};

use sweepbench_core::{Strategy, Sweep, SweepError, Unit};

use crate::RenderError;
use crate::format::format_value;
use crate::result_set::ResultSet;

/// Fail unless the sweep has at least two distinct values on its axis.
///
/// Run before any measurement so a bad combination costs nothing.
pub fn check_graph(sweep: &Sweep) -> Result<(), SweepError> {
    let points = sweep.distinct_axis_values().len();
    if points < 2 {
        return Err(SweepError::config(format!(
            "cannot graph the `{}` sweep: it has {} distinct {} value(s), at least 2 are needed",
            sweep.preset,
            points,
            sweep.axis.title()
        )));
    }
    Ok(())
}

/// One line on a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label
    pub name: String,
    /// `(x, y)` points in sweep order
    pub points: Vec<(f64, f64)>,
}

/// Renderer-independent chart description
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// File stem
    pub name: String,
    /// Title drawn above the plot
    pub title: String,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
    /// Unit of y values, `None` for ratios
    pub unit: Option<Unit>,
    /// Logarithmic y axis
    pub log_y: bool,
    /// Lines
    pub series: Vec<Series>,
}

/// A rendered chart ready to be written
#[derive(Debug, Clone)]
pub struct RenderedGraph {
    /// File name including extension
    pub file_name: String,
    /// File contents
    pub content: String,
}

/// Chart backend
pub trait Plotter {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Render one chart
    fn plot(&self, chart: &Chart) -> String;
}

/// Build the measurement and ratio charts for every group.
pub fn build_charts(results: &ResultSet, reference: Option<&str>) -> Vec<Chart> {
    let sweep = results.sweep();
    let axis = sweep.axis;
    let strategy = strategy_of(results);
    let unit = strategy.unit();
    let y_label = match strategy {
        Strategy::Time => format!("time ({})", unit),
        Strategy::Memory => format!("peak memory ({})", unit),
    };

    let mut charts = Vec::new();
    for group in results.groups() {
        let functions = results.functions_in_group(group);
        let series = functions
            .iter()
            .map(|f| Series {
                name: f.implementation.clone(),
                points: results
                    .by_function(&f.id)
                    .into_iter()
                    .filter_map(|record| {
                        let x = results.configuration(record.configuration)?.axis_value(axis)?;
                        Some((x as f64, record.value()?))
                    })
                    .collect(),
            })
            .collect();

        charts.push(Chart {
            name: format!("{}_{}", group, strategy),
            title: format!("{} ({})", group, strategy),
            x_label: axis.title().to_string(),
            y_label: y_label.clone(),
            unit: Some(unit),
            log_y: true,
            series,
        });

        let Some(reference_fn) = reference.and_then(|r| results.reference_in_group(group, r)) else {
            continue;
        };
        let ratio_series: Vec<Series> = functions
            .iter()
            .filter(|f| f.id != reference_fn.id)
            .map(|f| Series {
                name: format!("{}/{}", f.implementation, reference_fn.implementation),
                points: sweep
                    .configurations
                    .iter()
                    .enumerate()
                    .filter_map(|(index, configuration)| {
                        let x = configuration.axis_value(axis)?;
                        let ratio = results.ratio(index, &reference_fn.id, &f.id).value()?;
                        Some((x as f64, ratio))
                    })
                    .collect(),
            })
            .collect();

        if !ratio_series.is_empty() {
            charts.push(Chart {
                name: format!("{}_{}_ratio", group, strategy),
                title: format!("{} ({} ratio vs {})", group, strategy, reference_fn.implementation),
                x_label: axis.title().to_string(),
                y_label: "ratio".to_string(),
                unit: None,
                log_y: false,
                series: ratio_series,
            });
        }
    }
    charts
}

fn strategy_of(results: &ResultSet) -> Strategy {
    results
        .meta
        .as_ref()
        .map(|meta| meta.strategy)
        .or_else(|| results.records().first().map(|r| r.strategy))
        .unwrap_or(Strategy::Time)
}

/// Check the sweep, then render every chart with `plotter`.
pub fn render_graphs(
    results: &ResultSet,
    reference: Option<&str>,
    plotter: &dyn Plotter,
) -> Result<Vec<RenderedGraph>, RenderError> {
    check_graph(results.sweep())?;
    Ok(build_charts(results, reference)
        .iter()
        .map(|chart| RenderedGraph {
            file_name: format!("{}.{}", chart.name, plotter.extension()),
            content: plotter.plot(chart),
        })
        .collect())
}

/// Write rendered graphs into `directory`, creating it if needed.
pub fn write_graphs(
    directory: &Path,
    graphs: &[RenderedGraph],
) -> Result<Vec<PathBuf>, RenderError> {
    std::fs::create_dir_all(directory)?;
    let mut written = Vec::with_capacity(graphs.len());
    for graph in graphs {
        let path = directory.join(&graph.file_name);
        std::fs::write(&path, &graph.content)?;
        written.push(path);
    }
    Ok(written)
}

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

/// Standalone SVG line charts
#[derive(Debug, Clone, Copy)]
pub struct SvgPlotter {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Default for SvgPlotter {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.left + (value - lo) / (hi - lo) * self.width
    }

    fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.top + self.height - (value - lo) / (hi - lo) * self.height
    }
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl SvgPlotter {
    fn y_ticks(chart: &Chart, range: (f64, f64)) -> Vec<(f64, String)> {
        let label = |value: f64| match chart.unit {
            Some(unit) => format_value(value, unit),
            None => format!("{:.2}", value),
        };
        if chart.log_y {
            let (lo, hi) = range;
            (lo.floor() as i32..=hi.ceil() as i32)
                .map(|exp| (exp as f64, label(10f64.powi(exp))))
                .collect()
        } else {
            let (lo, hi) = range;
            (0..=4)
                .map(|i| {
                    let v = lo + (hi - lo) * i as f64 / 4.0;
                    (v, label(v))
                })
                .collect()
        }
    }
}

impl Plotter for SvgPlotter {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn plot(&self, chart: &Chart) -> String {
        let transform = |y: f64| if chart.log_y { y.log10() } else { y };
        // Non-positive values have no place on a log axis
        let visible: Vec<Vec<(f64, f64)>> = chart
            .series
            .iter()
            .map(|s| {
                s.points
                    .iter()
                    .filter(|(_, y)| !chart.log_y || *y > 0.0)
                    .map(|&(x, y)| (x, transform(y)))
                    .collect()
            })
            .collect();

        let x_range = padded_range(visible.iter().flatten().map(|&(x, _)| x));
        let mut y_range = padded_range(visible.iter().flatten().map(|&(_, y)| y));
        if chart.log_y {
            y_range = (y_range.0.floor(), y_range.1.ceil().max(y_range.0.floor() + 1.0));
        } else {
            y_range = (y_range.0.min(0.0), y_range.1 * 1.1);
        }

        let width = self.width as f64;
        let height = self.height as f64;
        let frame = Frame {
            left: 90.0,
            top: 50.0,
            width: width - 90.0 - 170.0,
            height: height - 50.0 - 60.0,
            x_range,
            y_range,
        };

        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
            self.width, self.height, self.width, self.height
        ));
        svg.push_str("  <style>\n");
        svg.push_str("    text { font-family: sans-serif; font-size: 12px; }\n");
        svg.push_str("    .title { font-size: 16px; font-weight: bold; }\n");
        svg.push_str("    .grid { stroke: #ddd; stroke-width: 1; }\n");
        svg.push_str("    .axis { stroke: #333; stroke-width: 1; }\n");
        svg.push_str("  </style>\n");
        svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" class=\"title\">{}</text>\n",
            frame.left + frame.width / 2.0,
            escape(&chart.title)
        ));

        // Grid and y tick labels
        for (value, label) in Self::y_ticks(chart, y_range) {
            let y = frame.y(value);
            svg.push_str(&format!(
                "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" class=\"grid\"/>\n",
                frame.left,
                y,
                frame.left + frame.width,
                y
            ));
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
                frame.left - 6.0,
                y + 4.0,
                escape(&label)
            ));
        }

        // X tick labels at every distinct x
        let mut xs: Vec<f64> = visible.iter().flatten().map(|&(x, _)| x).collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.dedup();
        for x in xs {
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                frame.x(x),
                frame.top + frame.height + 18.0,
                x
            ));
        }

        // Axes
        svg.push_str(&format!(
            "  <line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" class=\"axis\"/>\n",
            l = frame.left,
            r = frame.left + frame.width,
            b = frame.top + frame.height
        ));
        svg.push_str(&format!(
            "  <line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" class=\"axis\"/>\n",
            l = frame.left,
            t = frame.top,
            b = frame.top + frame.height
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            frame.left + frame.width / 2.0,
            height - 15.0,
            escape(&chart.x_label)
        ));
        svg.push_str(&format!(
            "  <text x=\"18\" y=\"{y:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 18 {y:.1})\">{label}</text>\n",
            y = frame.top + frame.height / 2.0,
            label = escape(&chart.y_label)
        ));

        // Series and legend
        for (i, (series, points)) in chart.series.iter().zip(&visible).enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            if points.len() > 1 {
                let path: Vec<String> = points
                    .iter()
                    .map(|&(x, y)| format!("{:.1},{:.1}", frame.x(x), frame.y(y)))
                    .collect();
                svg.push_str(&format!(
                    "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
                    path.join(" "),
                    color
                ));
            }
            for &(x, y) in points {
                svg.push_str(&format!(
                    "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{}\"/>\n",
                    frame.x(x),
                    frame.y(y),
                    color
                ));
            }

            let legend_y = frame.top + 10.0 + i as f64 * 20.0;
            let legend_x = frame.left + frame.width + 20.0;
            svg.push_str(&format!(
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\n",
                legend_x,
                legend_y - 10.0,
                color
            ));
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
                legend_x + 18.0,
                legend_y,
                escape(&series.name)
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_set::fixtures::*;
    use sweepbench_core::{Preset, SweepOptions, generate};

    #[test]
    fn test_check_graph() {
        let typical = generate(Preset::Typical, &SweepOptions::default());
        let err = check_graph(&typical).unwrap_err();
        assert!(matches!(err, SweepError::Configuration(_)));

        let single = generate(
            Preset::Depths,
            &SweepOptions {
                depths: Some(vec![3, 3]),
                ..SweepOptions::default()
            },
        );
        assert!(check_graph(&single).is_err());

        assert!(check_graph(&generate(Preset::Small, &SweepOptions::default())).is_ok());
    }

    #[test]
    fn test_charts_per_group() {
        let mut results = small_pair();
        for configuration in 0..results.sweep().len() {
            results.insert(success(configuration, "a_sum", 1e-3));
            results.insert(success(configuration, "b_sum", 2e-3));
        }

        let charts = build_charts(&results, Some("a"));
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].series.len(), 2);
        assert_eq!(charts[0].series[0].points, vec![(2.0, 1e-3), (3.0, 1e-3), (4.0, 1e-3)]);
        assert_eq!(charts[1].series[0].name, "b/a");
        assert!(charts[1].series[0].points.iter().all(|&(_, r)| (r - 2.0).abs() < 1e-12));

        assert_eq!(build_charts(&results, None).len(), 1);
    }

    #[test]
    fn test_svg_output() {
        let mut results = small_pair();
        results.insert(success(0, "a_sum", 1e-3));
        results.insert(success(1, "a_sum", 4e-3));

        let graphs = render_graphs(&results, Some("a"), &SvgPlotter::default()).unwrap();
        assert_eq!(graphs[0].file_name, "sum_time.svg");
        assert!(graphs[0].content.starts_with("<?xml"));
        assert!(graphs[0].content.contains("<polyline"));
        assert!(graphs[0].content.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_refuses_fixed_sweep() {
        let results =
            crate::ResultSet::new(generate(Preset::Typical, &SweepOptions::default()), vec![]);
        assert!(matches!(
            render_graphs(&results, None, &SvgPlotter::default()),
            Err(RenderError::Configuration(_))
        ));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & c>"), "a&lt;b &amp; c&gt;");
    }
}
