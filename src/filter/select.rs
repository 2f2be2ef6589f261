//! Country/date selection producing a [`FilteredView`].

use log::debug;

use crate::domain::{Column, ColumnSpec, CovidRow, FilterCriteria, FilteredView, RawDataset, SeriesColumn};
use crate::filter::fill::fill_series;

/// Column plan for a request: cumulative columns always, hospital columns on request.
///
/// A hospital column is active only if it was requested and the dataset has it.
pub fn column_specs(dataset: &RawDataset, include_hospital: bool) -> Vec<ColumnSpec> {
    Column::ALL
        .iter()
        .map(|&column| ColumnSpec {
            column,
            requested: !column.is_hospital() || include_hospital,
            available: dataset.has_column(column),
        })
        .collect()
}

/// Select rows for `criteria` and fill gaps in every active column.
///
/// The result is sorted by date (stable for duplicate dates). No rows matching
/// yields an empty view rather than an error.
pub fn filter(dataset: &RawDataset, criteria: &FilterCriteria) -> FilteredView {
    let mut rows: Vec<&CovidRow> = dataset.rows().iter().filter(|r| criteria.contains(r)).collect();
    rows.sort_by_key(|r| r.date);

    let series = column_specs(dataset, criteria.include_hospital())
        .into_iter()
        .filter(ColumnSpec::is_active)
        .map(|spec| {
            let raw: Vec<Option<f64>> = rows.iter().map(|r| r.value(spec.column)).collect();
            SeriesColumn {
                column: spec.column,
                values: fill_series(&raw),
                observed: raw.iter().map(Option::is_some).collect(),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "Filtered {} -> {} rows for {} [{}, {}], {} columns",
        dataset.len(),
        rows.len(),
        criteria.country(),
        criteria.start_date(),
        criteria.end_date(),
        series.len()
    );

    FilteredView {
        country: criteria.country().to_string(),
        start_date: criteria.start_date(),
        end_date: criteria.end_date(),
        dates: rows.iter().map(|r| r.date).collect(),
        series,
    }
}
