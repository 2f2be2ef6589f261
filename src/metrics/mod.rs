//! Scalar summaries derived from the latest row of a filtered view.

use chrono::NaiveDate;

use crate::domain::{Column, FilteredView};
use crate::error::EmptyViewError;

/// Headline numbers for the dashboard tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub as_of: NaiveDate,
    pub total_cases: f64,
    pub total_deaths: f64,
    /// Deaths per case in `[0, 1]`; `0` when there are no cases.
    pub death_rate: f64,
    /// `None` when no row up to the latest one reported vaccinations (shown as "N/A").
    pub total_vaccinations: Option<f64>,
    /// `None` when the column is not part of the view (tile omitted).
    pub hosp_patients: Option<f64>,
    pub icu_patients: Option<f64>,
}

/// Derive metrics from the last row of `view`.
pub fn derive(view: &FilteredView) -> Result<Metrics, EmptyViewError> {
    let latest = view.latest().ok_or_else(|| EmptyViewError {
        country: view.country.clone(),
        start: view.start_date,
        end: view.end_date,
    })?;

    let value = |column: Column| latest.cell(column).map(|c| c.value);

    let total_cases = value(Column::TotalCases).unwrap_or(0.0);
    let total_deaths = value(Column::TotalDeaths).unwrap_or(0.0);

    // Carried-forward values count as known; only a column never reported
    // up to the latest row is unknown.
    let total_vaccinations = view
        .series(Column::TotalVaccinations)
        .filter(|s| s.observed.iter().any(|o| *o))
        .and_then(|_| value(Column::TotalVaccinations));

    Ok(Metrics {
        as_of: latest.date,
        total_cases,
        total_deaths,
        death_rate: death_rate(total_deaths, total_cases),
        total_vaccinations,
        hosp_patients: value(Column::HospPatients),
        icu_patients: value(Column::IcuPatients),
    })
}

/// `deaths / cases`, or `0` without cases.
pub fn death_rate(deaths: f64, cases: f64) -> f64 {
    if cases > 0.0 {
        (deaths / cases).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesColumn;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(column: Column, values: &[f64], observed: &[bool]) -> SeriesColumn {
        SeriesColumn {
            column,
            values: values.to_vec(),
            observed: observed.to_vec(),
        }
    }

    fn view(series: Vec<SeriesColumn>, dates: Vec<NaiveDate>) -> FilteredView {
        FilteredView {
            country: "United States".to_string(),
            start_date: d(2021, 1, 1),
            end_date: d(2021, 1, 3),
            dates,
            series,
        }
    }

    #[test]
    fn uses_latest_row() {
        let v = view(
            vec![
                series(Column::TotalCases, &[100.0, 200.0], &[true, true]),
                series(Column::TotalDeaths, &[1.0, 4.0], &[true, true]),
                series(Column::TotalVaccinations, &[0.0, 50.0], &[false, true]),
            ],
            vec![d(2021, 1, 1), d(2021, 1, 3)],
        );
        let m = derive(&v).unwrap();
        assert_eq!(m.as_of, d(2021, 1, 3));
        assert_eq!(m.total_cases, 200.0);
        assert_eq!(m.total_deaths, 4.0);
        assert!((m.death_rate - 0.02).abs() < 1e-12);
        assert_eq!(m.total_vaccinations, Some(50.0));
        assert_eq!(m.hosp_patients, None);
        assert_eq!(m.icu_patients, None);
    }

    #[test]
    fn vaccinations_carried_forward_are_known() {
        let v = view(
            vec![
                series(Column::TotalCases, &[100.0, 150.0], &[true, true]),
                series(Column::TotalDeaths, &[2.0, 2.0], &[true, false]),
                series(Column::TotalVaccinations, &[10.0, 10.0], &[true, false]),
            ],
            vec![d(2021, 1, 1), d(2021, 1, 3)],
        );
        let m = derive(&v).unwrap();
        assert_eq!(m.total_vaccinations, Some(10.0));
        assert_eq!(m.total_deaths, 2.0);
    }

    #[test]
    fn vaccinations_never_reported_are_not_available() {
        let v = view(
            vec![
                series(Column::TotalCases, &[100.0, 150.0], &[true, true]),
                series(Column::TotalDeaths, &[2.0, 2.0], &[true, true]),
                series(Column::TotalVaccinations, &[0.0, 0.0], &[false, false]),
            ],
            vec![d(2021, 1, 1), d(2021, 1, 3)],
        );
        assert_eq!(derive(&v).unwrap().total_vaccinations, None);
    }

    #[test]
    fn empty_view_is_an_error() {
        let v = view(
            vec![
                series(Column::TotalCases, &[], &[]),
                series(Column::TotalDeaths, &[], &[]),
                series(Column::TotalVaccinations, &[], &[]),
            ],
            vec![],
        );
        let err = derive(&v).unwrap_err();
        assert_eq!(err.country, "United States");
        assert_eq!(err.start, d(2021, 1, 1));
    }

    #[test]
    fn hospital_metrics_when_columns_active() {
        let v = view(
            vec![
                series(Column::TotalCases, &[10.0], &[true]),
                series(Column::TotalDeaths, &[0.0], &[true]),
                series(Column::TotalVaccinations, &[0.0], &[false]),
                series(Column::HospPatients, &[7.0], &[true]),
                series(Column::IcuPatients, &[0.0], &[false]),
            ],
            vec![d(2021, 1, 1)],
        );
        let m = derive(&v).unwrap();
        assert_eq!(m.hosp_patients, Some(7.0));
        assert_eq!(m.icu_patients, Some(0.0));
    }

    #[test]
    fn death_rate_bounds() {
        assert_eq!(death_rate(0.0, 0.0), 0.0);
        assert_eq!(death_rate(5.0, 0.0), 0.0);
        for (deaths, cases) in [(0.0, 1.0), (1.0, 3.0), (3.0, 3.0), (10.0, 3.0)] {
            let r = death_rate(deaths, cases);
            assert!((0.0..=1.0).contains(&r), "{deaths}/{cases} -> {r}");
        }
    }
}
