//! Forward-fill for cumulative series.

/// Fill gaps in a date-ordered series.
///
/// Each missing value takes the most recent preceding value; values before the
/// first observation become `0.0`. Applying it to its own output is a no-op.
pub fn fill_series(raw: &[Option<f64>]) -> Vec<f64> {
    let mut last: Option<f64> = None;
    raw.iter()
        .map(|v| {
            if let Some(x) = v {
                last = Some(*x);
            }
            last.unwrap_or(0.0)
        })
        .collect()
}
