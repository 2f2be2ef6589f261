//! `covid-dash` library crate.
//!
//! The binary (`covid-dash`) is a thin wrapper around this library so that:
//!
//! - the filter/metric pipeline is testable without spawning processes
//! - the TUI and the plain-text `summary` command share one code path

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod tui;
