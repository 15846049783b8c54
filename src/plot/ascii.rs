//! ASCII/Unicode plotting for terminal output.
//!
//! Fixed-size character grid, used by `dash render`. Output is deterministic.
//!
//! Plot elements:
//! - line series: one marker per series (`o`, `x`, `+`, `*`, `@`) joined by `.`
//! - bars: `#` from the zero baseline to the value
//! - trendline: `~`

use crate::domain::{ChartKind, ChartSpec};

const SERIES_MARKERS: [char; 5] = ['o', 'x', '+', '*', '@'];

/// Render `chart` into a `width` x `height` character grid plus header lines.
pub fn render_ascii_chart(chart: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    let (Some((first, last)), Some((y_min, y_max))) = (category_span(chart), chart.value_range()) else {
        out.push_str("(no data)\n");
        return out;
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    out.push_str(&format!("{}=[{first} .. {last}] | y=[{y_min:.2}, {y_max:.2}]\n", chart.x_label));
    if let Some(legend) = legend(chart) {
        out.push_str(&legend);
        out.push('\n');
    }

    let mut grid = vec![vec![' '; width]; height];
    let n = chart.categories.len();

    match chart.kind {
        ChartKind::Bar => draw_bars(&mut grid, chart, n, y_min, y_max),
        ChartKind::Line => {
            // Trend first so series markers overlay it.
            if let Some(trend) = &chart.trend {
                let pts: Vec<(usize, f64)> = trend.values.iter().copied().enumerate().collect();
                draw_polyline(&mut grid, &pts, n, y_min, y_max, '~', '~');
            }
            for (idx, series) in chart.series.iter().enumerate() {
                let marker = SERIES_MARKERS[idx % SERIES_MARKERS.len()];
                // A missing category breaks the line.
                for run in series.runs() {
                    draw_polyline(&mut grid, &run, n, y_min, y_max, '.', marker);
                }
            }
        }
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn category_span(chart: &ChartSpec) -> Option<(&str, &str)> {
    let first = chart.categories.first()?;
    let last = chart.categories.last()?;
    Some((first.as_str(), last.as_str()))
}

fn legend(chart: &ChartSpec) -> Option<String> {
    if chart.kind == ChartKind::Bar || (chart.series.len() < 2 && chart.trend.is_none()) {
        return None;
    }
    let mut parts: Vec<String> = chart
        .series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{}={}", SERIES_MARKERS[idx % SERIES_MARKERS.len()], s.name))
        .collect();
    if chart.trend.is_some() {
        parts.push("~=Trendline".to_string());
    }
    Some(format!("legend: {}", parts.join(" ")))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 {
        span * frac
    } else {
        (min.abs() * frac).max(1.0)
    };
    (min - pad, max + pad)
}

fn map_x(idx: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = idx as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_bars(grid: &mut [Vec<char>], chart: &ChartSpec, n: usize, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();
    let base = map_y(0.0, y_min, y_max, height);

    for series in &chart.series {
        for (i, v) in series.values.iter().enumerate() {
            let Some(v) = v else { continue };
            let x = map_x(i, n, width);
            let top = map_y(*v, y_min, y_max, height);
            let (lo, hi) = if top <= base { (top, base) } else { (base, top) };
            for row in grid.iter_mut().take(hi + 1).skip(lo) {
                row[x] = '#';
            }
        }
    }
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    pts: &[(usize, f64)],
    n: usize,
    y_min: f64,
    y_max: f64,
    stroke: char,
    marker: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let cells: Vec<(usize, usize)> = pts
        .iter()
        .map(|&(i, y)| (map_x(i, n, width), map_y(y, y_min, y_max, height)))
        .collect();

    for pair in cells.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(grid, x0, y0, x1, y1, stroke);
    }
    for &(x, y) in &cells {
        grid[y][x] = marker;
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
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
