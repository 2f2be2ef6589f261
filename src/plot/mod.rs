//! Plain-text plotting for non-interactive output.

pub mod ascii;

pub use ascii::render_view_plot;
