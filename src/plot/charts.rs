//! SVG charts written next to the text report.
//!
//! Each `*_svg` function renders one figure into a `String` using Plotters'
//! SVG backend; `save_svg` writes it into the output directory. Time axes use
//! fractional years (see `decimal_year`).

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::crisis::{CrisisImpact, timeline};
use crate::analysis::insights::InsightReport;
use crate::analysis::seasonal::year_month_grid;
use crate::analysis::stats::{SummaryStats, regional_summary, yearly_averages};
use crate::domain::{CrisisWindows, Series, decimal_year, month_name};
use crate::error::AnalysisError;
use crate::math::{self, Decomposition};

pub const OVERVIEW_FILE: &str = "overview_analysis.svg";
pub const CRISIS_FILE: &str = "covid_impact.svg";
pub const DECOMPOSITION_FILE: &str = "seasonal_decomposition.svg";
pub const HEATMAP_FILE: &str = "seasonal_heatmap.svg";
pub const DASHBOARD_FILE: &str = "policy_insights.svg";

const OVERVIEW_SIZE: (u32, u32) = (1500, 1200);
const CRISIS_SIZE: (u32, u32) = (1500, 600);
const DECOMPOSITION_SIZE: (u32, u32) = (1500, 1200);
const HEATMAP_SIZE: (u32, u32) = (1200, 800);
const DASHBOARD_SIZE: (u32, u32) = (1500, 1200);

const HISTOGRAM_BINS: usize = 30;

const NAVY: RGBColor = RGBColor(0, 0, 128);
const CRIMSON: RGBColor = RGBColor(220, 20, 60);
const DARK_RED: RGBColor = RGBColor(139, 0, 0);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const FOREST_GREEN: RGBColor = RGBColor(34, 139, 34);

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Write an SVG document to `dir/file_name`.
pub fn save_svg(dir: &Path, file_name: &str, svg: &str) -> Result<PathBuf, AnalysisError> {
    let path = dir.join(file_name);
    fs::write(&path, svg).map_err(|e| AnalysisError::io(format!("failed to write chart '{}'", path.display()), e))?;
    Ok(path)
}

/// Trend, distribution, yearly averages and regional averages.
pub fn overview_svg(series: &Series, stats: &SummaryStats) -> Result<String, AnalysisError> {
    render("overview", OVERVIEW_SIZE, |root| draw_overview(root, series, stats))
}

/// Period averages and the shaded crisis timeline.
pub fn crisis_svg(series: &Series, impact: &CrisisImpact, windows: &CrisisWindows) -> Result<String, AnalysisError> {
    render("crisis impact", CRISIS_SIZE, |root| draw_crisis(root, series, impact, windows))
}

/// Observed, trend, seasonal and residual components stacked vertically.
pub fn decomposition_svg(series: &Series, decomposition: &Decomposition) -> Result<String, AnalysisError> {
    render("seasonal decomposition", DECOMPOSITION_SIZE, |root| {
        draw_decomposition(root, series, decomposition)
    })
}

/// Year × month grid on a yellow-to-red scale.
pub fn heatmap_svg(series: &Series) -> Result<String, AnalysisError> {
    render("seasonal heatmap", HEATMAP_SIZE, |root| draw_heatmap(root, series))
}

/// Four-panel policy dashboard.
pub fn dashboard_svg(report: &InsightReport) -> Result<String, AnalysisError> {
    render("policy dashboard", DASHBOARD_SIZE, |root| draw_dashboard(root, report))
}

fn render(
    chart: &'static str,
    size: (u32, u32),
    draw: impl FnOnce(&Area<'_>) -> DrawResult<()>,
) -> Result<String, AnalysisError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        paint(&root, draw).map_err(|e| AnalysisError::Render {
            chart,
            message: e.to_string(),
        })?;
    }
    Ok(svg)
}

fn paint(root: &Area<'_>, draw: impl FnOnce(&Area<'_>) -> DrawResult<()>) -> DrawResult<()> {
    root.fill(&WHITE)?;
    draw(root)?;
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

fn draw_overview(root: &Area<'_>, series: &Series, stats: &SummaryStats) -> DrawResult<()> {
    let root = root.titled("Unemployment Rate Analysis - Overview", ("sans-serif", 30))?;
    let panels = root.split_evenly((2, 2));

    let points: Vec<(f64, f64)> = series
        .observations()
        .iter()
        .map(|o| (decimal_year(o.date), o.rate))
        .collect();
    let caption = format!(
        "Overall Trend ({}-{})",
        stats.start.format("%Y"),
        stats.end.format("%Y")
    );
    draw_time_series(&panels[0], &caption, "Unemployment Rate (%)", &points, NAVY)?;

    draw_histogram(&panels[1], &series.rates(), stats.mean)?;

    let yearly: Vec<(f64, f64)> = yearly_averages(series)
        .into_iter()
        .map(|(year, avg)| (year as f64, avg))
        .collect();
    draw_markers_line(
        &panels[2],
        "Yearly Average Unemployment Rate",
        "Average Unemployment Rate (%)",
        &yearly,
        STEEL_BLUE,
        |v| format!("{v:.0}"),
    )?;

    let mut regions = regional_summary(series);
    if regions.is_empty() {
        draw_message(&panels[3], "Average Unemployment Rate by Region", "Regional data\nnot available")?;
    } else {
        regions.sort_by(|a, b| a.mean.total_cmp(&b.mean));
        let bars: Vec<Bar> = regions
            .iter()
            .map(|r| Bar::new(r.region.display_name(), Some(r.mean), STEEL_BLUE))
            .collect();
        draw_bars(
            &panels[3],
            "Average Unemployment Rate by Region",
            "Average Unemployment Rate (%)",
            &bars,
            |v| format!("{v:.2}%"),
        )?;
    }

    Ok(())
}

fn draw_crisis(root: &Area<'_>, series: &Series, impact: &CrisisImpact, windows: &CrisisWindows) -> DrawResult<()> {
    let root = root.titled("COVID-19 Impact on Unemployment", ("sans-serif", 30))?;
    let panels = root.split_evenly((1, 2));

    let bars = [
        Bar::new("Pre-COVID", Some(impact.pre_period_avg), STEEL_BLUE),
        Bar::new("COVID Period", Some(impact.covid_period_avg), CRIMSON),
        Bar::new("Post-COVID", impact.post_covid_avg, FOREST_GREEN),
    ];
    draw_bars(
        &panels[0],
        "Average Unemployment Rate by Period",
        "Unemployment Rate (%)",
        &bars,
        |v| format!("{v:.2}%"),
    )?;

    let caption = format!(
        "COVID-19 Impact Timeline ({}-{})",
        windows.timeline_start.format("%Y"),
        windows.timeline_end.format("%Y")
    );
    let points: Vec<(f64, f64)> = timeline(series, windows)
        .iter()
        .map(|o| (decimal_year(o.date), o.rate))
        .collect();
    if points.is_empty() {
        return draw_message(&panels[1], &caption, "No observations in window");
    }

    let x_range = x_extent(&points);
    let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let mut chart = ChartBuilder::on(&panels[1])
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0.0..(y_max * 1.1).max(1.0))?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Unemployment Rate (%)")
        .x_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    let (c0, c1) = (decimal_year(windows.crisis_start), decimal_year(windows.crisis_end));
    chart.draw_series(std::iter::once(Rectangle::new(
        [(c0, 0.0), (c1, (y_max * 1.1).max(1.0))],
        RED.mix(0.08).filled(),
    )))?;
    chart.draw_series(
        AreaSeries::new(points.iter().copied(), 0.0, RED.mix(0.3)).border_style(CRIMSON.stroke_width(2)),
    )?;

    Ok(())
}

fn draw_decomposition(root: &Area<'_>, series: &Series, d: &Decomposition) -> DrawResult<()> {
    let root = root.titled("Time Series Decomposition - Unemployment Rate", ("sans-serif", 30))?;
    let panels = root.split_evenly((4, 1));

    let xs: Vec<f64> = series.observations().iter().map(|o| decimal_year(o.date)).collect();
    let defined = |values: &[Option<f64>]| -> Vec<(f64, f64)> {
        xs.iter()
            .zip(values)
            .filter_map(|(&x, v)| v.map(|v| (x, v)))
            .collect()
    };
    let dense = |values: &[f64]| -> Vec<(f64, f64)> { xs.iter().copied().zip(values.iter().copied()).collect() };

    let components = [
        ("Original Series", dense(&d.observed)),
        ("Trend Component", defined(&d.trend)),
        ("Seasonal Component", dense(&d.seasonal)),
        ("Residual Component", defined(&d.resid)),
    ];
    for (panel, (title, points)) in panels.iter().zip(components.iter()) {
        draw_time_series(panel, title, "Unemployment Rate (%)", points, STEEL_BLUE)?;
    }

    Ok(())
}

fn draw_heatmap(root: &Area<'_>, series: &Series) -> DrawResult<()> {
    let title = "Unemployment Rate Heatmap by Year and Month";
    let grid = year_month_grid(series);
    let values: Vec<f64> = grid.values().flat_map(|row| row.iter().flatten().copied()).collect();
    let (Some(lo), Some(hi)) = (math::min(&values), math::max(&values)) else {
        return draw_message(root, title, "No observations");
    };
    let hi = if hi > lo { hi } else { lo + 1.0 };

    let years: Vec<i32> = grid.keys().copied().collect();
    let n_years = years.len() as u32;
    let (left, right) = root.split_horizontally(1040);

    let mut chart = ChartBuilder::on(&left)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..12).into_segmented(), (0u32..n_years).into_segmented())?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Month")
        .y_desc("Year")
        .x_labels(12)
        .y_labels(years.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(m) => month_name(m + 1).chars().take(3).collect(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(row) => row_year(&years, *row).map(|y| y.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    // First year on the top row.
    chart.draw_series(grid.values().enumerate().flat_map(|(idx, row)| {
        let r = n_years - 1 - idx as u32;
        row.iter().enumerate().filter_map(move |(m, cell)| {
            let v = (*cell)?;
            let m = m as u32;
            Some(Rectangle::new(
                [(SegmentValue::Exact(m), SegmentValue::Exact(r)), (SegmentValue::Exact(m + 1), SegmentValue::Exact(r + 1))],
                heat_color((v - lo) / (hi - lo)).filled(),
            ))
        })
    }))?;

    // Colour bar.
    let mut bar = ChartBuilder::on(&right)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("Unemployment Rate (%)")
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;
    const STEPS: usize = 64;
    let step = (hi - lo) / STEPS as f64;
    bar.draw_series((0..STEPS).map(|i| {
        let y0 = lo + i as f64 * step;
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], heat_color(i as f64 / (STEPS - 1) as f64).filled())
    }))?;

    Ok(())
}

fn draw_dashboard(root: &Area<'_>, report: &InsightReport) -> DrawResult<()> {
    let root = root.titled("Policy-Ready Insights Dashboard", ("sans-serif", 30))?;
    let panels = root.split_evenly((2, 2));

    let comparison = &report.crisis_comparison;
    draw_bars(
        &panels[0],
        "Crisis Impact Comparison",
        "Unemployment Rate (%)",
        &[
            Bar::new("COVID-19 Peak", comparison.covid_peak, RED),
            Bar::new("Historical Max", Some(comparison.historical_max), DARK_RED),
            Bar::new("95th Percentile", Some(comparison.p95), ORANGE),
        ],
        |v| format!("{v:.1}%"),
    )?;

    let crisis = report.crisis.as_ref();
    draw_bars(
        &panels[1],
        "Recovery Metrics",
        "",
        &[
            Bar::new("Recovery Months", report.recovery_months.map(|m| m as f64), FOREST_GREEN),
            Bar::new("Peak Increase %", crisis.map(|c| c.covid_increase_pct), RED),
            Bar::new("Net Change", report.net_change(), BLUE),
        ],
        |v| format!("{v:.1}"),
    )?;

    let monthly: Vec<(f64, f64)> = report
        .seasonal
        .monthly_means
        .iter()
        .map(|&(m, mean)| (m as f64, mean))
        .collect();
    if monthly.is_empty() {
        draw_message(&panels[2], "Seasonal Vulnerability Pattern", "Seasonal data\nnot available")?;
    } else {
        draw_markers_line(
            &panels[2],
            "Seasonal Vulnerability Pattern",
            "Unemployment Rate (%)",
            &monthly,
            PURPLE,
            |v| format!("{v:.0}"),
        )?;
    }

    if report.regional_volatility.is_empty() {
        draw_message(&panels[3], "Regional Volatility", "Regional data\nnot available")?;
    } else {
        let bars: Vec<Bar> = report
            .regional_volatility
            .iter()
            .map(|r| Bar::new(r.region.display_name(), Some(r.std), STEEL_BLUE))
            .collect();
        draw_bars(
            &panels[3],
            "Regional Volatility (Standard Deviation)",
            "Standard Deviation",
            &bars,
            |v| format!("{v:.2}"),
        )?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

struct Bar {
    label: String,
    /// `None` draws no bar and an "n/a" label.
    value: Option<f64>,
    color: RGBColor,
}

impl Bar {
    fn new(label: &str, value: Option<f64>, color: RGBColor) -> Self {
        Self {
            label: label.to_string(),
            value: value.filter(|v| v.is_finite()),
            color,
        }
    }
}

fn draw_bars(area: &Area<'_>, caption: &str, y_desc: &str, bars: &[Bar], fmt_value: fn(f64) -> String) -> DrawResult<()> {
    let lo = bars.iter().filter_map(|b| b.value).fold(0.0, f64::min);
    let hi = bars.iter().filter_map(|b| b.value).fold(0.0, f64::max);
    let span = (hi - lo).max(1.0);
    let y_min = if lo < 0.0 { lo - span * 0.1 } else { 0.0 };
    let y_range = y_min..hi + span * 0.15;
    let n = bars.len() as u32;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d((0u32..n).into_segmented(), y_range)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(y_desc)
        .x_labels(bars.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => bars.get(*i as usize).map(|b| b.label.clone()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().filter_map(|(i, b)| {
        let v = b.value?;
        let i = i as u32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
            b.color.mix(0.75).filled(),
        );
        rect.set_margin(0, 0, 15, 15);
        Some(rect)
    }))?;

    let label_style = TextStyle::from(("sans-serif", 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().enumerate().map(|(i, b)| {
        let (text, y) = match b.value {
            Some(v) => (fmt_value(v), v.max(0.0)),
            None => ("n/a".to_string(), 0.0),
        };
        Text::new(text, (SegmentValue::CenterOf(i as u32), y + span * 0.02), label_style.clone())
    }))?;

    Ok(())
}

fn draw_time_series(area: &Area<'_>, caption: &str, y_desc: &str, points: &[(f64, f64)], color: RGBColor) -> DrawResult<()> {
    if points.is_empty() {
        return draw_message(area, caption, "No data");
    }
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(x_extent(points), y_extent(points))?;
    chart
        .configure_mesh()
        .y_desc(y_desc)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    Ok(())
}

fn draw_markers_line(
    area: &Area<'_>,
    caption: &str,
    y_desc: &str,
    points: &[(f64, f64)],
    color: RGBColor,
    fmt_x: fn(f64) -> String,
) -> DrawResult<()> {
    if points.is_empty() {
        return draw_message(area, caption, "No data");
    }
    let (x0, x1) = (points[0].0 - 0.5, points[points.len() - 1].0 + 0.5);
    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x0..x1, y_extent(points))?;
    chart
        .configure_mesh()
        .y_desc(y_desc)
        .x_labels(points.len().min(15))
        .x_label_formatter(&|v| fmt_x(*v))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
    Ok(())
}

fn draw_histogram(area: &Area<'_>, values: &[f64], mean: f64) -> DrawResult<()> {
    let caption = "Distribution of Unemployment Rates";
    let Some(hist) = histogram(values, HISTOGRAM_BINS) else {
        return draw_message(area, caption, "No data");
    };
    let top = hist.counts.iter().copied().max().unwrap_or(0) as f64 * 1.1 + 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(hist.lo..hist.lo + hist.width * hist.counts.len() as f64, 0.0..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Unemployment Rate (%)")
        .y_desc("Frequency")
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.lo + i as f64 * hist.width;
        Rectangle::new([(x0, 0.0), (x0 + hist.width, count as f64)], SKY_BLUE.filled())
    }))?;
    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.lo + i as f64 * hist.width;
        Rectangle::new([(x0, 0.0), (x0 + hist.width, count as f64)], BLACK.stroke_width(1))
    }))?;

    chart
        .draw_series(LineSeries::new([(mean, 0.0), (mean, top)], RED.stroke_width(2)))?
        .label(format!("Mean: {mean:.2}%"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn draw_message(area: &Area<'_>, caption: &str, message: &str) -> DrawResult<()> {
    let area = area.titled(caption, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    let style = TextStyle::from(("sans-serif", 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    // The SVG backend does not wrap, so each line is placed on its own.
    let lines: Vec<&str> = message.lines().collect();
    let line_height = 24;
    let top = h as i32 / 2 - (lines.len() as i32 - 1) * line_height / 2;
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(*line, (w as i32 / 2, top + i as i32 * line_height), style.clone()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Equal-width bins over `[min, max]`; the maximum lands in the last bin.
#[derive(Debug, Clone, PartialEq)]
struct Histogram {
    lo: f64,
    width: f64,
    counts: Vec<usize>,
}

fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let lo = math::min(values)?;
    let hi = math::max(values)?;
    let bins = bins.max(1);
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { lo, width, counts })
}

fn x_extent(points: &[(f64, f64)]) -> Range<f64> {
    let lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if hi > lo { lo..hi } else { lo - 0.5..lo + 0.5 }
}

fn y_extent(points: &[(f64, f64)]) -> Range<f64> {
    let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.05 } else { 0.5 };
    lo - pad..hi + pad
}

fn row_year(years: &[i32], row: u32) -> Option<i32> {
    let idx = years.len().checked_sub(1 + row as usize)?;
    years.get(idx).copied()
}

/// Yellow → orange → red, `t` clamped to `[0, 1]`.
fn heat_color(t: f64) -> RGBColor {
    const STOPS: [(f64, f64, f64); 3] = [(255.0, 255.0, 178.0), (253.0, 141.0, 60.0), (189.0, 0.0, 38.0)];
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let (a, b, u) = if t <= 0.5 {
        (STOPS[0], STOPS[1], t * 2.0)
    } else {
        (STOPS[1], STOPS[2], (t - 0.5) * 2.0)
    };
    let lerp = |x: f64, y: f64| (x + (y - x) * u).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clean::clean;
    use crate::analysis::crisis::analyze_crisis;
    use crate::analysis::insights::build_insights;
    use crate::analysis::stats::summarize;
    use crate::data::generate_sample_series;
    use crate::domain::SampleConfig;
    use crate::math::{DecompositionModel, decompose};

    fn sample() -> Series {
        clean(&generate_sample_series(&SampleConfig::default()).unwrap()).series
    }

    #[test]
    fn histogram_bins_cover_range() {
        let h = histogram(&[1.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(h.counts, vec![1, 1, 2]);
        assert_eq!(h.counts.iter().sum::<usize>(), 4);
        assert!((h.width - 1.0).abs() < 1e-12);

        let flat = histogram(&[5.0, 5.0], 30).unwrap();
        assert_eq!(flat.counts[0], 2);
        assert!(histogram(&[], 30).is_none());
    }

    #[test]
    fn heat_scale_endpoints() {
        assert_eq!(heat_color(0.0), RGBColor(255, 255, 178));
        assert_eq!(heat_color(1.0), RGBColor(189, 0, 38));
        assert_eq!(heat_color(f64::NAN), RGBColor(255, 255, 178));
    }

    #[test]
    fn heatmap_rows_put_first_year_on_top() {
        let years = [2010, 2011, 2012];
        assert_eq!(row_year(&years, 2), Some(2010));
        assert_eq!(row_year(&years, 0), Some(2012));
        assert_eq!(row_year(&years, 3), None);
    }

    #[test]
    fn renders_every_figure_for_sample_series() {
        let series = sample();
        let stats = summarize(&series).unwrap();
        let windows = CrisisWindows::default();
        let impact = analyze_crisis(&series, &windows).unwrap();
        let d = decompose(&series.rates(), 12, DecompositionModel::Additive).unwrap();
        let report = build_insights(&series, &stats, Some(&impact), None, &windows);

        let overview = overview_svg(&series, &stats).unwrap();
        assert!(overview.contains("<svg"));
        assert!(overview.contains("Unemployment Rate Analysis - Overview"));

        assert!(crisis_svg(&series, &impact, &windows).unwrap().contains("COVID-19 Impact Timeline"));
        assert!(decomposition_svg(&series, &d).unwrap().contains("Residual Component"));
        assert!(heatmap_svg(&series).unwrap().contains("Heatmap by Year and Month"));
        assert!(dashboard_svg(&report).unwrap().contains("Policy-Ready Insights Dashboard"));
    }

    #[test]
    fn dashboard_without_regions_says_so() {
        let series = sample();
        let stats = summarize(&series).unwrap();
        let mut report = build_insights(&series, &stats, None, None, &CrisisWindows::default());
        report.regional_volatility.clear();
        let svg = dashboard_svg(&report).unwrap();
        assert!(svg.contains("not available"));
        assert!(svg.contains("n/a"));
    }

    #[test]
    fn save_svg_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_svg(dir.path(), HEATMAP_FILE, "<svg/>").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<svg/>");
    }
}
