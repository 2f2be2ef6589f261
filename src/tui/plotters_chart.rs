//! Plotters-powered time-series chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only line chart for one column of a filtered view.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct SeriesChart<'a> {
    /// `(day number, value)` points, ascending by day.
    pub points: &'a [(f64, f64)],
    /// X bounds (days from CE).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Line colour for this column.
    pub color: (u8, u8, u8),
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 4 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Horizontal grid lines only; vertical ones clutter low-res terminals.
            chart
                .configure_mesh()
                .x_labels(4)
                .y_labels(3)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&RGBColor(80, 80, 80))
                .disable_x_mesh()
                .draw()?;

            let (r, g, b) = self.color;
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &RGBColor(r, g, b)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
