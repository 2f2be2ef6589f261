//! Dataset acquisition: remote/local CSV fetch, decoding, and memoization.

pub mod parse;
pub mod source;

pub use parse::parse_dataset;
pub use source::DatasetSource;
