//! Error types.
//!
//! Library code returns the typed errors below. The binary funnels everything
//! into [`AppError`], which carries the process exit code.

use chrono::NaiveDate;

/// Failures while obtaining the raw dataset. Both are fatal for the session.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Failed to fetch dataset from {location}: {message}")]
    Fetch { location: String, message: String },
    #[error("Malformed dataset: {0}")]
    DataFormat(String),
}

/// Filter criteria that cannot be applied to the loaded dataset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("Start date {start} is after end date {end}.")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("Unknown country '{0}'. Run `covid-dash countries` to list valid names.")]
    UnknownCountry(String),
    #[error("Dataset has no rows to select from.")]
    EmptyDataset,
}

/// The filtered view has no rows, so there is no latest snapshot to summarize.
///
/// This is the expected, recoverable condition: front-ends show a warning.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("No data for {country} between {start} and {end}: select a valid date range / country combination.")]
pub struct EmptyViewError {
    pub country: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<CriteriaError> for AppError {
    fn from(err: CriteriaError) -> Self {
        AppError::new(2, err.to_string())
    }
}
