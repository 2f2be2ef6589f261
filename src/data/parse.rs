//! CSV decoding for the OWID COVID-19 table.
//!
//! The whole input is decoded up front. Any bad row fails the load; a
//! partially-decoded dataset is never returned.

use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{Column, CovidRow, RawDataset};
use crate::error::DataError;

const REQUIRED: [&str; 5] = [
    "location",
    "date",
    "total_cases",
    "total_deaths",
    "total_vaccinations",
];

/// Subset of the OWID schema we care about. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct OwidRecord {
    location: String,
    date: NaiveDate,
    #[serde(default)]
    total_cases: Option<f64>,
    #[serde(default)]
    total_deaths: Option<f64>,
    #[serde(default)]
    total_vaccinations: Option<f64>,
    #[serde(default)]
    hosp_patients: Option<f64>,
    #[serde(default)]
    icu_patients: Option<f64>,
}

impl OwidRecord {
    fn into_row(self) -> CovidRow {
        let clean = |v: Option<f64>| v.filter(|x| x.is_finite());
        CovidRow {
            location: self.location,
            date: self.date,
            values: [
                clean(self.total_cases),
                clean(self.total_deaths),
                clean(self.total_vaccinations),
                clean(self.hosp_patients),
                clean(self.icu_patients),
            ],
        }
    }
}

/// Decode a CSV stream into a [`RawDataset`].
pub fn parse_dataset<R: Read>(input: R) -> Result<RawDataset, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| DataError::DataFormat(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let names: HashSet<String> = headers.iter().map(normalize_header_name).collect();

    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|c| !names.contains(*c))
        .collect();
    if !missing.is_empty() {
        return Err(DataError::DataFormat(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut present = [false; 5];
    for column in Column::ALL {
        present[column.index()] = names.contains(column.header());
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<OwidRecord>() {
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "?".to_string());
            DataError::DataFormat(format!("Invalid row at line {line}: {e}"))
        })?;
        rows.push(record.into_row());
    }

    if rows.is_empty() {
        return Err(DataError::DataFormat("Dataset contains no rows.".to_string()));
    }

    Ok(RawDataset::new(rows, present))
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_string()
}
