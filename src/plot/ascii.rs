//! ASCII line charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! One chart per active column, stacked top to bottom, all sharing the
//! view's date range on the x-axis.

use chrono::NaiveDate;

use crate::domain::{FilteredView, SeriesColumn};
use crate::report::fmt_count;

/// Render every series of `view` as its own chart, in view order.
pub fn render_view_plot(view: &FilteredView, width: usize, height: usize) -> String {
    let Some((d_min, d_max)) = date_range(&view.dates) else {
        return String::new();
    };

    let mut out = String::new();
    for series in &view.series {
        out.push_str(&render_series(&view.dates, series, d_min, d_max, width, height));
        out.push('\n');
    }
    out
}

fn render_series(
    dates: &[NaiveDate],
    series: &SeriesColumn,
    d_min: NaiveDate,
    d_max: NaiveDate,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(2);
    let height = height.max(2);
    let span = (d_max - d_min).num_days().max(1) as f64;

    let (y_min, y_max) = y_range(&series.values).unwrap_or((0.0, 1.0));

    let mut grid = vec![vec![' '; width]; height];
    let mut prev = None;
    for (date, &y) in dates.iter().zip(&series.values) {
        let x = map_x((*date - d_min).num_days() as f64 / span, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, x, yy, '*');
        } else {
            grid[yy][x] = '*';
        }
        prev = Some((x, yy));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}: {} .. {} | [{}, {}]\n",
        series.column.display_name(),
        d_min,
        d_max,
        fmt_count(y_min),
        fmt_count(y_max),
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn date_range(dates: &[NaiveDate]) -> Option<(NaiveDate, NaiveDate)> {
    let min = *dates.iter().min()?;
    let max = *dates.iter().max()?;
    Some((min, max))
}

fn y_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in values {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: give it a unit band so it sits on the bottom row.
        Some((min_y, min_y + 1.0))
    }
}

fn map_x(u: f64, width: usize) -> usize {
    (u.clamp(0.0, 1.0) * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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
    use crate::domain::Column;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let view = FilteredView {
            country: "Peru".to_string(),
            start_date: d(2021, 1, 1),
            end_date: d(2021, 1, 5),
            dates: vec![d(2021, 1, 1), d(2021, 1, 5)],
            series: vec![SeriesColumn {
                column: Column::TotalCases,
                values: vec![0.0, 4000.0],
                observed: vec![true, true],
            }],
        };

        let txt = render_view_plot(&view, 5, 3);
        let expected = concat!(
            "Total Cases: 2021-01-01 .. 2021-01-05 | [0, 4,000]\n",
            "   **\n",
            " **\n",
            "*\n",
            "\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn one_chart_per_series() {
        let view = FilteredView {
            country: "Peru".to_string(),
            start_date: d(2021, 1, 1),
            end_date: d(2021, 1, 1),
            dates: vec![d(2021, 1, 1)],
            series: vec![
                SeriesColumn {
                    column: Column::TotalCases,
                    values: vec![3.0],
                    observed: vec![true],
                },
                SeriesColumn {
                    column: Column::TotalDeaths,
                    values: vec![0.0],
                    observed: vec![false],
                },
            ],
        };
        let txt = render_view_plot(&view, 10, 4);
        assert!(txt.contains("Total Cases:"));
        assert!(txt.contains("Total Deaths:"));
        assert_eq!(txt.lines().count(), 2 * (1 + 4 + 1));
    }

    #[test]
    fn empty_view_renders_nothing() {
        let view = FilteredView {
            country: "Peru".to_string(),
            start_date: d(2021, 1, 1),
            end_date: d(2021, 1, 1),
            dates: vec![],
            series: vec![],
        };
        assert!(render_view_plot(&view, 10, 4).is_empty());
    }
}
