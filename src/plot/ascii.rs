//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - monthly observations: `o`
//! - 12-month rolling mean: `-` line
//! - highest observation: `P`

use crate::domain::{Series, decimal_year};
use crate::math::rolling_mean;

/// Render the rate over time as a `width` x `height` character grid.
pub fn render_ascii_plot(series: &Series, width: usize, height: usize) -> String {
    let obs = series.observations();
    let (Some(first), Some(last)) = (obs.first(), obs.last()) else {
        return "Plot: (empty series)\n".to_string();
    };

    let points: Vec<(f64, f64)> = obs.iter().map(|o| (decimal_year(o.date), o.rate)).collect();
    let trend: Vec<(f64, f64)> = rolling_mean(&series.rates(), 12)
        .into_iter()
        .zip(&points)
        .filter_map(|(m, &(x, _))| m.map(|m| (x, m)))
        .collect();
    // First maximum wins, matching the crisis peak convention.
    let peak = points
        .iter()
        .copied()
        .reduce(|best, p| if p.1 > best.1 { p } else { best });

    let label = format!("{}..{}", first.date.format("%Y-%m"), last.date.format("%Y-%m"));
    render_plot(&points, &trend, peak, &label, width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    trend: &[(f64, f64)],
    peak: Option<(f64, f64)>,
    label: &str,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(points, trend).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Trend first so observations overlay it.
    draw_curve(&mut grid, trend, x_min, x_max, y_min, y_max);

    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }
    if let Some((x, y)) = peak {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'P';
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: {label} | rate=[{y_min:.2}, {y_max:.2}]%\n"));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(points: &[(f64, f64)], trend: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().chain(trend) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: centre it in a 1pp window.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clean::clean;
    use crate::domain::{RawSeries, Record};
    use chrono::NaiveDate;

    fn series(rates: &[f64]) -> Series {
        let records = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| Record {
                date: NaiveDate::from_ymd_opt(2020, i as u32 + 1, 1),
                rate: Some(r),
                region: None,
            })
            .collect();
        clean(&RawSeries {
            records,
            has_region: false,
        })
        .series
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_plot(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 13, 5);
        let expected = concat!(
            "Plot: 2020-01..2020-05 | rate=[0.80, 5.20]%\n",
            "            P\n",
            "         o   \n",
            "      o      \n",
            "   o         \n",
            "o            \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_has_placeholder() {
        assert_eq!(render_ascii_plot(&Series::default(), 40, 10), "Plot: (empty series)\n");
    }

    #[test]
    fn zigzag_keeps_grid_shape() {
        let rates: Vec<f64> = (0..12).map(|i| if i % 2 == 0 { 2.0 } else { 6.0 }).collect();
        let txt = render_ascii_plot(&series(&rates), 24, 9);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.chars().count() == 24));
        // Peak is the first 6.0 (February), on the top row.
        assert_eq!(rows[0].find('P'), Some(2));
    }
}
