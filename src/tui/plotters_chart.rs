//! Plotters-powered chart widget for Ratatui.
//!
//! Bar and line charts share one drawing path. Plotters output lands in the
//! Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use plotters::style::Color as _;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{ChartKind, ChartSpec};

/// Series colors, in series order. Kept high-contrast for terminals.
pub const PALETTE: [RGBColor; 5] = [
    RGBColor(0, 255, 255),   // cyan
    RGBColor(255, 255, 0),   // yellow
    RGBColor(0, 255, 0),     // green
    RGBColor(255, 0, 255),   // magenta
    RGBColor(255, 255, 255), // white
];

pub const TREND_COLOR: RGBColor = RGBColor(255, 0, 0);

/// Ratatui color matching `PALETTE[idx]`, for legends drawn outside Plotters.
pub fn series_color(idx: usize) -> Color {
    let RGBColor(r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

/// Render-only wrapper around a `ChartSpec`.
pub struct DashChart<'a> {
    pub chart: &'a ChartSpec,
}

impl<'a> Widget for DashChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let chart = self.chart;
        let Some((x_bounds, y_bounds)) = chart_bounds(chart) else {
            buf.set_string(
                area.x,
                area.y,
                "No data for this selection.",
                Style::default().fg(Color::Yellow),
            );
            return;
        };
        let [x0, x1] = x_bounds;
        let [y0, y1] = y_bounds;

        let widget = widget_fn(move |root| {
            let mut ctx = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 10)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            ctx.configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(chart.categories.len().min(6))
                .y_labels(5)
                .x_label_formatter(&|v| category_label(&chart.categories, *v))
                .y_label_formatter(&|v| fmt_axis_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            match chart.kind {
                ChartKind::Bar => {
                    for (s_idx, series) in chart.series.iter().enumerate() {
                        let color = PALETTE[s_idx % PALETTE.len()];
                        ctx.draw_series(series.values.iter().enumerate().filter_map(|(i, v)| {
                            let v = (*v)?;
                            let x = i as f64;
                            Some(Rectangle::new([(x - 0.35, 0.0), (x + 0.35, v)], color.filled()))
                        }))?;
                    }
                }
                ChartKind::Line => {
                    if let Some(trend) = &chart.trend {
                        ctx.draw_series(LineSeries::new(
                            trend.values.iter().enumerate().map(|(i, &y)| (i as f64, y)),
                            &TREND_COLOR,
                        ))?;
                    }
                    for (s_idx, series) in chart.series.iter().enumerate() {
                        let color = PALETTE[s_idx % PALETTE.len()];
                        // One line per run of present values, so gaps stay visible.
                        for run in series.runs() {
                            ctx.draw_series(LineSeries::new(
                                run.into_iter().map(|(i, y)| (i as f64, y)),
                                &color,
                            ))?;
                        }
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// X bounds are category indices; bars get half a slot of padding each side.
fn chart_bounds(chart: &ChartSpec) -> Option<([f64; 2], [f64; 2])> {
    let n = chart.categories.len();
    if n == 0 {
        return None;
    }
    let (y_min, y_max) = chart.value_range()?;

    let x_pad = if chart.kind == ChartKind::Bar || n == 1 { 0.5 } else { 0.0 };
    let x_bounds = [-x_pad, (n - 1) as f64 + x_pad];

    let span = y_max - y_min;
    let pad = if span > 0.0 { span * 0.05 } else { (y_min.abs() * 0.05).max(1.0) };
    let y_lo = if chart.kind == ChartKind::Bar && y_min >= 0.0 { 0.0 } else { y_min - pad };
    let y_bounds = [y_lo, y_max + pad];

    if !(y_bounds[0].is_finite() && y_bounds[1].is_finite()) || y_bounds[1] <= y_bounds[0] {
        return None;
    }
    Some((x_bounds, y_bounds))
}

/// Label for an x tick: the nearest category, blank between categories.
fn category_label(categories: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.25 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Compact y labels: sales totals run into the millions.
fn fmt_axis_value(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.1}")
    }
}
