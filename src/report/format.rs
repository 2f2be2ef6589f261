//! Number formatting, metric tiles, and plain-text summaries.
//!
//! We keep formatting code in one place so:
//! - the filter/metric code stays clean and testable
//! - the TUI and the `summary` command show identical numbers

use crate::app::pipeline::{DashboardRun, title};
use crate::domain::Column;
use crate::metrics::Metrics;

/// Marker for a value the data never reported.
pub const NOT_AVAILABLE: &str = "N/A";

/// One labeled metric tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub label: &'static str,
    pub value: String,
    /// Series the tile summarizes, if any (used for colouring).
    pub column: Option<Column>,
}

/// Tiles in display order: cases, deaths, rate, vaccinations, then hospital tiles when present.
pub fn metric_tiles(metrics: &Metrics) -> Vec<Tile> {
    let mut tiles = vec![
        Tile {
            label: Column::TotalCases.display_name(),
            value: fmt_count(metrics.total_cases),
            column: Some(Column::TotalCases),
        },
        Tile {
            label: Column::TotalDeaths.display_name(),
            value: fmt_count(metrics.total_deaths),
            column: Some(Column::TotalDeaths),
        },
        Tile {
            label: "Death Rate",
            value: fmt_percent(metrics.death_rate),
            column: None,
        },
        Tile {
            label: Column::TotalVaccinations.display_name(),
            value: metrics
                .total_vaccinations
                .map(fmt_count)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            column: Some(Column::TotalVaccinations),
        },
    ];

    for (column, value) in [
        (Column::HospPatients, metrics.hosp_patients),
        (Column::IcuPatients, metrics.icu_patients),
    ] {
        if let Some(v) = value {
            tiles.push(Tile {
                label: column.display_name(),
                value: fmt_count(v),
                column: Some(column),
            });
        }
    }

    tiles
}

/// Whole-number count with thousands separators (`1234567.4` -> `1,234,567`).
pub fn fmt_count(v: f64) -> String {
    if !v.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Ratio as a percentage with two decimals (`0.01234` -> `1.23%`).
pub fn fmt_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Format the summary block printed by `covid-dash summary`.
pub fn format_summary(run: &DashboardRun) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", title(run.criteria.country())));
    out.push_str(&format!(
        "Range: {} .. {} | rows={} | latest={}\n",
        run.criteria.start_date(),
        run.criteria.end_date(),
        run.view.len(),
        run.metrics.as_of,
    ));
    out.push('\n');

    let tiles = metric_tiles(&run.metrics);
    let width = tiles.iter().map(|t| t.label.len()).max().unwrap_or(0);
    for tile in &tiles {
        out.push_str(&format!("{:<width$}  {:>16}\n", tile.label, tile.value));
    }

    out
}

/// One location per line.
pub fn format_locations(locations: &[String]) -> String {
    let mut out = String::new();
    for loc in locations {
        out.push_str(loc);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn metrics() -> Metrics {
        Metrics {
            as_of: NaiveDate::from_ymd_opt(2021, 1, 3).unwrap(),
            total_cases: 1_234_567.0,
            total_deaths: 12_345.6,
            death_rate: 0.0123456,
            total_vaccinations: None,
            hosp_patients: None,
            icu_patients: None,
        }
    }

    #[test]
    fn counts_use_thousands_separators() {
        assert_eq!(fmt_count(0.0), "0");
        assert_eq!(fmt_count(999.0), "999");
        assert_eq!(fmt_count(1000.0), "1,000");
        assert_eq!(fmt_count(1_234_567.4), "1,234,567");
        assert_eq!(fmt_count(999_999.6), "1,000,000");
        assert_eq!(fmt_count(-12_345.0), "-12,345");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(fmt_percent(0.0), "0.00%");
        assert_eq!(fmt_percent(0.0123456), "1.23%");
        assert_eq!(fmt_percent(1.0), "100.00%");
    }

    #[test]
    fn four_tiles_without_hospital_data() {
        let tiles = metric_tiles(&metrics());
        let labels: Vec<&str> = tiles.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            vec!["Total Cases", "Total Deaths", "Death Rate", "Total Vaccinations"]
        );
        assert_eq!(tiles[0].value, "1,234,567");
        assert_eq!(tiles[1].value, "12,346");
        assert_eq!(tiles[2].value, "1.23%");
        assert_eq!(tiles[3].value, NOT_AVAILABLE);
    }

    #[test]
    fn hospital_tiles_appended_when_present() {
        let mut m = metrics();
        m.total_vaccinations = Some(0.0);
        m.hosp_patients = Some(1500.0);
        m.icu_patients = Some(0.0);
        let tiles = metric_tiles(&m);
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[3].value, "0");
        assert_eq!(tiles[4].label, "Hospital Patients");
        assert_eq!(tiles[4].value, "1,500");
        assert_eq!(tiles[5].label, "ICU Patients");
    }
}
