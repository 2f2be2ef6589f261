//! Output helpers.
//!
//! - filtered-view CSV export (`export`)

pub mod export;

pub use export::*;
