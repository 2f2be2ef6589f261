//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw dataset loaded once per process (`RawDataset`, `CovidRow`)
//! - the semantic numeric columns and their per-dataset availability (`Column`, `ColumnSpec`)
//! - filter inputs and outputs (`FilterCriteria`, `FilteredView`, `LatestSnapshot`)
//! - run configuration resolved from CLI/env (`DashConfig`)

pub mod types;

pub use types::*;
