//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a country, a date range and
//! the hospital toggle, then renders metric tiles and one stacked line chart per
//! active column. Every settings change triggers one full recomputation.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{DashboardRun, run_dashboard, title};
use crate::data::DatasetSource;
use crate::domain::{DashConfig, FilterCriteria, RawDataset, SeriesColumn};
use crate::error::AppError;
use crate::report::{Tile, metric_tiles};

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Settings rows, top to bottom.
const FIELD_COUNTRY: usize = 0;
const FIELD_START: usize = 1;
const FIELD_END: usize = 2;
const FIELD_HOSPITAL: usize = 3;

/// PgUp/PgDn step for date fields.
const PAGE_DAYS: i64 = 30;

/// Start the TUI.
pub fn run(config: DashConfig) -> Result<(), AppError> {
    // Load before touching the terminal so fetch errors print normally.
    let source = DatasetSource::new(config.source.clone());
    let dataset = source.get_or_load()?;
    let mut app = App::new(dataset, &config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which settings value is being typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Editing {
    Country,
    Start,
    End,
}

struct App {
    dataset: Arc<RawDataset>,
    span: (NaiveDate, NaiveDate),
    country_idx: usize,
    start: NaiveDate,
    end: NaiveDate,
    include_hospital: bool,
    selected_field: usize,
    editing: Option<Editing>,
    input: String,
    status: String,
    run: Option<DashboardRun>,
    /// Set instead of `run` when the selection has no rows.
    warning: Option<String>,
}

impl App {
    fn new(dataset: Arc<RawDataset>, config: &DashConfig) -> Result<Self, AppError> {
        let criteria = config.criteria(&dataset)?;
        let span = dataset
            .date_span()
            .ok_or_else(|| AppError::new(4, "Dataset has no dates."))?;
        let country_idx = dataset
            .locations()
            .iter()
            .position(|l| l == criteria.country())
            .unwrap_or(0);

        let mut app = Self {
            span,
            country_idx,
            start: criteria.start_date(),
            end: criteria.end_date(),
            include_hospital: criteria.include_hospital(),
            selected_field: FIELD_COUNTRY,
            editing: None,
            input: String::new(),
            status: format!("Loaded {} rows.", dataset.len()),
            run: None,
            warning: None,
            dataset,
        };
        app.recompute();
        info!("Dashboard ready for {}", app.country());
        Ok(app)
    }

    fn country(&self) -> &str {
        self.dataset
            .locations()
            .get(self.country_idx)
            .map(String::as_str)
            .unwrap_or("-")
    }

    /// One full pass: criteria -> filter -> metrics.
    fn recompute(&mut self) {
        let criteria = match FilterCriteria::new(
            &self.dataset,
            self.country(),
            self.start,
            self.end,
            self.include_hospital,
        ) {
            Ok(c) => c,
            Err(e) => {
                // Keep the previous render; the status line explains why.
                self.status = e.to_string();
                return;
            }
        };
        debug!("criteria: {criteria:?}");

        match run_dashboard(&self.dataset, &criteria) {
            Ok(run) => {
                self.run = Some(run);
                self.warning = None;
            }
            Err(empty) => {
                self.run = None;
                self.warning = Some(empty.to_string());
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(editing) = self.editing {
            self.handle_edit(editing, code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_HOSPITAL {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::PageUp => self.adjust_field(PAGE_DAYS),
            KeyCode::PageDown => self.adjust_field(-PAGE_DAYS),
            KeyCode::Char(' ') | KeyCode::Char('h') => {
                self.include_hospital = !self.include_hospital;
                self.recompute();
            }
            KeyCode::Enter => {
                let editing = match self.selected_field {
                    FIELD_COUNTRY => Some(Editing::Country),
                    FIELD_START => Some(Editing::Start),
                    FIELD_END => Some(Editing::End),
                    _ => None,
                };
                if let Some(editing) = editing {
                    self.editing = Some(editing);
                    self.input.clear();
                    self.status = match editing {
                        Editing::Country => "Type a country name. Enter to apply, Esc to cancel.".to_string(),
                        _ => "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string(),
                    };
                }
            }
            _ => {}
        }

        false
    }

    fn handle_edit(&mut self, editing: Editing, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                match editing {
                    Editing::Country => self.apply_country_input(),
                    Editing::Start | Editing::End => self.apply_date_input(editing),
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                let accepted = match editing {
                    Editing::Country => !c.is_control(),
                    Editing::Start | Editing::End => c.is_ascii_digit() || c == '-',
                };
                if accepted {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            FIELD_COUNTRY => {
                let n = self.dataset.locations().len();
                if n == 0 {
                    return;
                }
                self.country_idx = if delta >= 0 {
                    (self.country_idx + 1) % n
                } else {
                    (self.country_idx + n - 1) % n
                };
                self.status = format!("country: {}", self.country());
            }
            FIELD_START => {
                self.start = shift_date(self.start, delta, self.span);
                self.status = format!("start: {}", self.start);
            }
            FIELD_END => {
                self.end = shift_date(self.end, delta, self.span);
                self.status = format!("end: {}", self.end);
            }
            FIELD_HOSPITAL => {
                self.include_hospital = !self.include_hospital;
                self.status = format!("hospital data: {}", on_off(self.include_hospital));
            }
            _ => return,
        }
        self.recompute();
    }

    fn apply_country_input(&mut self) {
        let query = self.input.trim().to_lowercase();
        if query.is_empty() {
            self.status = "Country unchanged.".to_string();
            return;
        }
        match find_location(self.dataset.locations(), &query) {
            Some(idx) => {
                self.country_idx = idx;
                self.status = format!("country: {}", self.country());
                self.recompute();
            }
            None => {
                self.status = format!("No country matches '{}'.", self.input.trim());
            }
        }
    }

    fn apply_date_input(&mut self, editing: Editing) {
        let trimmed = self.input.trim();
        let date = match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(d) => clamp_date(d, self.span),
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };
        match editing {
            Editing::Start => self.start = date,
            Editing::End => self.end = date,
            Editing::Country => return,
        }
        self.status = format!("range: {} .. {}", self.start, self.end);
        self.recompute();
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            title(self.country()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));

        let detail = match &self.run {
            Some(run) => format!(
                "range: {} .. {} | rows: {} | latest: {}",
                run.criteria.start_date(),
                run.criteria.end_date(),
                run.view.len(),
                run.metrics.as_of,
            ),
            None => format!("range: {} .. {} | rows: 0", self.start, self.end),
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);

        let Some(run) = &self.run else {
            let msg = self
                .warning
                .clone()
                .unwrap_or_else(|| "Waiting for data...".to_string());
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .block(Block::default().title("Warning").borders(Borders::ALL));
            frame.render_widget(p, chunks[1]);
            return;
        };

        let tiles = metric_tiles(&run.metrics);
        let tile_rows = tiles.len().div_ceil(4) as u16;
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3 * tile_rows), Constraint::Min(0)])
            .split(chunks[1]);

        draw_tiles(frame, right[0], &tiles);
        self.draw_charts(frame, right[1], run);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &DashboardRun) {
        let block = Block::default().title("Trend Analysis").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let n = run.view.series.len().max(1) as u32;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
            .split(inner);

        let x_bounds = x_bounds(&run.view.dates);
        for (series, rect) in run.view.series.iter().zip(rows.iter()) {
            let (r, g, b) = series.column.rgb();
            let chart_block = Block::default().title(Span::styled(
                series.column.display_name(),
                Style::default().fg(Color::Rgb(r, g, b)).add_modifier(Modifier::BOLD),
            ));
            let chart_area = chart_block.inner(*rect);
            frame.render_widget(chart_block, *rect);

            let points = chart_points(&run.view.dates, series);
            let widget = SeriesChart {
                points: &points,
                x_bounds,
                y_bounds: y_bounds(&series.values),
                color: series.column.rgb(),
                fmt_x: fmt_axis_date,
                fmt_y: fmt_axis_count,
            };
            frame.render_widget(widget, chart_area);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Country: {}", self.country())),
            ListItem::new(format!("Start: {}", self.start)),
            ListItem::new(format!("End: {}", self.end)),
            ListItem::new(format!("Hospital data: {}", on_off(self.include_hospital))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Dashboard Controls").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new(format!("> {}_", self.input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  PgUp/PgDn ±30d  Enter edit  h hospital  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Tiles in rows of four.
fn draw_tiles(frame: &mut ratatui::Frame<'_>, area: Rect, tiles: &[Tile]) {
    let rows = tiles.len().div_ceil(4).max(1);
    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..rows).map(|_| Constraint::Length(3)).collect::<Vec<_>>())
        .split(area);

    for (chunk, row_rect) in tiles.chunks(4).zip(row_rects.iter()) {
        let n = chunk.len() as u32;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
            .split(*row_rect);

        for (tile, rect) in chunk.iter().zip(cols.iter()) {
            let label_style = match tile.column {
                Some(column) => {
                    let (r, g, b) = column.rgb();
                    Style::default().fg(Color::Rgb(r, g, b))
                }
                None => Style::default().fg(Color::Gray),
            };
            let p = Paragraph::new(Span::styled(
                tile.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(Span::styled(tile.label, label_style))
                    .borders(Borders::ALL),
            );
            frame.render_widget(p, *rect);
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// First location containing `query` (lowercase), preferring prefix matches.
fn find_location(locations: &[String], query: &str) -> Option<usize> {
    locations
        .iter()
        .position(|l| l.to_lowercase().starts_with(query))
        .or_else(|| locations.iter().position(|l| l.to_lowercase().contains(query)))
}

fn clamp_date(date: NaiveDate, span: (NaiveDate, NaiveDate)) -> NaiveDate {
    date.clamp(span.0, span.1)
}

fn shift_date(date: NaiveDate, days: i64, span: (NaiveDate, NaiveDate)) -> NaiveDate {
    let shifted = date
        .checked_add_signed(chrono::Duration::days(days))
        .unwrap_or(date);
    clamp_date(shifted, span)
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn chart_points(dates: &[NaiveDate], series: &SeriesColumn) -> Vec<(f64, f64)> {
    dates
        .iter()
        .zip(&series.values)
        .map(|(d, v)| (day_number(*d), *v))
        .collect()
}

/// Shared x-axis across all stacked charts; a single day gets one day of padding each side.
fn x_bounds(dates: &[NaiveDate]) -> [f64; 2] {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) if last > first => [day_number(*first), day_number(*last)],
        (Some(first), _) => [day_number(*first) - 1.0, day_number(*first) + 1.0],
        _ => [0.0, 1.0],
    }
}

fn y_bounds(values: &[f64]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &y in values {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }
    if y_max <= y_min {
        return [y_min - 1.0, y_max + 1.0];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Compact count for axis ticks (`1.2M`, `35k`).
fn fmt_axis_count(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
