//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! criteria -> filter + fill -> latest-row metrics
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::warn;

use crate::domain::{FilterCriteria, FilteredView, RawDataset};
use crate::error::EmptyViewError;
use crate::metrics::Metrics;

/// All computed outputs of a single render pass.
#[derive(Debug, Clone)]
pub struct DashboardRun {
    pub criteria: FilterCriteria,
    pub view: FilteredView,
    pub metrics: Metrics,
}

/// Execute one full recomputation for `criteria`.
///
/// An empty selection is reported as [`EmptyViewError`] so callers render a
/// warning instead of tiles and charts.
pub fn run_dashboard(dataset: &RawDataset, criteria: &FilterCriteria) -> Result<DashboardRun, EmptyViewError> {
    let view = crate::filter::filter(dataset, criteria);

    let metrics = crate::metrics::derive(&view).inspect_err(|e| warn!("{e}"))?;

    Ok(DashboardRun {
        criteria: criteria.clone(),
        view,
        metrics,
    })
}

/// Page title shown above the tiles.
pub fn title(country: &str) -> String {
    format!("COVID-19 Dashboard: {country}")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::parse_dataset;
    use crate::domain::Column;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dataset() -> RawDataset {
        let csv = "\
location,date,total_cases,total_deaths,total_vaccinations
United States,2021-01-01,100,10,
United States,2021-01-03,150,,
Peru,2021-01-02,7,1,3
";
        parse_dataset(csv.as_bytes()).unwrap()
    }

    #[test]
    fn end_to_end_us_scenario() {
        let ds = dataset();
        let criteria = FilterCriteria::new(&ds, "United States", d(2021, 1, 1), d(2021, 1, 3), false).unwrap();
        let run = run_dashboard(&ds, &criteria).unwrap();

        assert_eq!(run.view.dates, vec![d(2021, 1, 1), d(2021, 1, 3)]);
        assert_eq!(run.view.series(Column::TotalDeaths).unwrap().values, vec![10.0, 10.0]);
        assert_eq!(run.metrics.total_cases, 150.0);
        assert_eq!(run.metrics.total_deaths, 10.0);
        assert_eq!(run.metrics.total_vaccinations, None);
        assert!((run.metrics.death_rate - 10.0 / 150.0).abs() < 1e-12);
    }

    #[test]
    fn vaccinations_tile_matches_filled_chart() {
        let csv = "\
location,date,total_cases,total_deaths,total_vaccinations
United States,2021-01-01,100,10,5000
United States,2021-01-03,150,12,
Peru,2021-01-02,7,1,
Peru,2021-01-04,9,1,
";
        let ds = parse_dataset(csv.as_bytes()).unwrap();

        let us = FilterCriteria::new(&ds, "United States", d(2021, 1, 1), d(2021, 1, 3), false).unwrap();
        let run = run_dashboard(&ds, &us).unwrap();
        assert_eq!(
            run.view.series(Column::TotalVaccinations).unwrap().values,
            vec![5000.0, 5000.0]
        );
        assert_eq!(run.metrics.total_vaccinations, Some(5000.0));

        let peru = FilterCriteria::new(&ds, "Peru", d(2021, 1, 1), d(2021, 1, 4), false).unwrap();
        let run = run_dashboard(&ds, &peru).unwrap();
        assert_eq!(run.metrics.total_vaccinations, None);
    }

    #[test]
    fn empty_selection_reports_empty_view() {
        let ds = dataset();
        let criteria = FilterCriteria::new(&ds, "Peru", d(2021, 1, 3), d(2021, 1, 9), false).unwrap();
        let err = run_dashboard(&ds, &criteria).unwrap_err();
        assert_eq!(err.country, "Peru");
    }

    #[test]
    fn title_names_country() {
        assert_eq!(title("Peru"), "COVID-19 Dashboard: Peru");
    }
}
