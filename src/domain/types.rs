//! Shared domain types.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::CriteriaError;

/// Location selected when the user does not pick one.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Public OWID COVID-19 dataset.
pub const DEFAULT_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Semantic numeric columns the dashboard knows about.
///
/// Order matters: it is the tile order and the top-to-bottom chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TotalCases,
    TotalDeaths,
    TotalVaccinations,
    HospPatients,
    IcuPatients,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::TotalCases,
        Column::TotalDeaths,
        Column::TotalVaccinations,
        Column::HospPatients,
        Column::IcuPatients,
    ];

    /// Index into per-row value arrays.
    pub fn index(self) -> usize {
        match self {
            Column::TotalCases => 0,
            Column::TotalDeaths => 1,
            Column::TotalVaccinations => 2,
            Column::HospPatients => 3,
            Column::IcuPatients => 4,
        }
    }

    /// CSV header name.
    pub fn header(self) -> &'static str {
        match self {
            Column::TotalCases => "total_cases",
            Column::TotalDeaths => "total_deaths",
            Column::TotalVaccinations => "total_vaccinations",
            Column::HospPatients => "hosp_patients",
            Column::IcuPatients => "icu_patients",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Column::TotalCases => "Total Cases",
            Column::TotalDeaths => "Total Deaths",
            Column::TotalVaccinations => "Total Vaccinations",
            Column::HospPatients => "Hospital Patients",
            Column::IcuPatients => "ICU Patients",
        }
    }

    /// Hospital columns are opt-in and not guaranteed to exist in a dataset.
    pub fn is_hospital(self) -> bool {
        matches!(self, Column::HospPatients | Column::IcuPatients)
    }

    /// Fixed chart colour (RGB).
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Column::TotalCases => (31, 119, 180),
            Column::TotalDeaths => (214, 39, 40),
            Column::TotalVaccinations => (44, 160, 44),
            Column::HospPatients => (148, 103, 189),
            Column::IcuPatients => (255, 127, 14),
        }
    }
}

/// One row of the raw dataset. Numeric cells are `None` when the CSV field is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CovidRow {
    pub location: String,
    pub date: NaiveDate,
    pub values: [Option<f64>; 5],
}

impl CovidRow {
    pub fn value(&self, column: Column) -> Option<f64> {
        self.values[column.index()]
    }
}

/// The full table, loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct RawDataset {
    rows: Vec<CovidRow>,
    present: [bool; 5],
    locations: Vec<String>,
    span: Option<(NaiveDate, NaiveDate)>,
}

impl RawDataset {
    /// `present[c.index()]` records whether column `c` was in the CSV header.
    pub fn new(rows: Vec<CovidRow>, present: [bool; 5]) -> Self {
        let mut locations: Vec<String> = rows.iter().map(|r| r.location.clone()).collect();
        locations.sort();
        locations.dedup();

        let span = rows.iter().fold(None, |acc: Option<(NaiveDate, NaiveDate)>, r| {
            Some(match acc {
                None => (r.date, r.date),
                Some((lo, hi)) => (lo.min(r.date), hi.max(r.date)),
            })
        });

        Self {
            rows,
            present,
            locations,
            span,
        }
    }

    pub fn rows(&self) -> &[CovidRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.present[column.index()]
    }

    /// Distinct locations, sorted.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn contains_location(&self, location: &str) -> bool {
        self.locations
            .binary_search_by(|l| l.as_str().cmp(location))
            .is_ok()
    }

    /// Earliest and latest date across all rows.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.span
    }

    /// Default location: `United States` when present, else the first in sorted order.
    pub fn default_location(&self) -> Option<&str> {
        if self.contains_location(DEFAULT_COUNTRY) {
            Some(DEFAULT_COUNTRY)
        } else {
            self.locations.first().map(String::as_str)
        }
    }
}

/// Which semantic column is requested for a view and whether its source exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: Column,
    pub requested: bool,
    pub available: bool,
}

impl ColumnSpec {
    pub fn is_active(&self) -> bool {
        self.requested && self.available
    }
}

/// Validated filter inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    country: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    include_hospital: bool,
}

impl FilterCriteria {
    /// Build criteria that are guaranteed to satisfy `start <= end` and name a known location.
    pub fn new(
        dataset: &RawDataset,
        country: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        include_hospital: bool,
    ) -> Result<Self, CriteriaError> {
        let country = country.into();
        if start_date > end_date {
            return Err(CriteriaError::InvertedRange {
                start: start_date,
                end: end_date,
            });
        }
        if !dataset.contains_location(&country) {
            return Err(CriteriaError::UnknownCountry(country));
        }
        Ok(Self {
            country,
            start_date,
            end_date,
            include_hospital,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn include_hospital(&self) -> bool {
        self.include_hospital
    }

    pub fn contains(&self, row: &CovidRow) -> bool {
        row.location == self.country && row.date >= self.start_date && row.date <= self.end_date
    }
}

/// One filled numeric series of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub column: Column,
    /// Gap-free values, aligned with `FilteredView::dates`.
    pub values: Vec<f64>,
    /// Whether the raw row carried a value (as opposed to a filled one).
    pub observed: Vec<bool>,
}

/// Rows for one country and date interval, ascending by date, gaps filled.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<SeriesColumn>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.series.iter().map(|s| s.column)
    }

    pub fn series(&self, column: Column) -> Option<&SeriesColumn> {
        self.series.iter().find(|s| s.column == column)
    }

    /// The row with the maximum date, if any.
    pub fn latest(&self) -> Option<LatestSnapshot> {
        let last = self.dates.len().checked_sub(1)?;
        Some(LatestSnapshot {
            date: self.dates[last],
            cells: self
                .series
                .iter()
                .map(|s| LatestCell {
                    column: s.column,
                    value: s.values[last],
                    observed: s.observed[last],
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestCell {
    pub column: Column,
    pub value: f64,
    pub observed: bool,
}

/// Last row of a non-empty view.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub cells: Vec<LatestCell>,
}

impl LatestSnapshot {
    pub fn cell(&self, column: Column) -> Option<LatestCell> {
        self.cells.iter().copied().find(|c| c.column == column)
    }
}

/// Where the raw CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(String),
    File(PathBuf),
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Remote(url) => write!(f, "{url}"),
            SourceLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Run configuration resolved from CLI arguments and the environment.
///
/// Unset fields fall back to dataset-dependent defaults once the table is loaded.
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub source: SourceLocation,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_hospital: bool,
}

impl DashConfig {
    /// Resolve against a loaded dataset: default country and full date span.
    pub fn criteria(&self, dataset: &RawDataset) -> Result<FilterCriteria, CriteriaError> {
        let country = match &self.country {
            Some(c) => c.clone(),
            None => dataset
                .default_location()
                .map(str::to_string)
                .ok_or(CriteriaError::EmptyDataset)?,
        };
        let (lo, hi) = dataset.date_span().ok_or(CriteriaError::EmptyDataset)?;

        FilterCriteria::new(
            dataset,
            country,
            self.start_date.unwrap_or(lo),
            self.end_date.unwrap_or(hi),
            self.include_hospital,
        )
    }
}
