//! Row selection and gap filling.
//!
//! Responsibilities:
//!
//! - decide which numeric columns are active for a request (`column_specs`)
//! - select one country over an inclusive date interval
//! - forward-fill each active column, then zero any leading gap (`fill_series`)

pub mod fill;
pub mod select;

pub use fill::*;
pub use select::*;
