//! Export a filtered view to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per date, one column per active series, values already gap-filled.

use std::fs::File;
use std::path::Path;

use crate::domain::FilteredView;
use crate::error::AppError;

/// Write `view` to a CSV file at `path`.
pub fn write_view_csv(path: &Path, view: &FilteredView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_view(file, view)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV '{}': {e}", path.display())))
}

fn write_view<W: std::io::Write>(out: W, view: &FilteredView) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["location", "date"];
    header.extend(view.series.iter().map(|s| s.column.header()));
    writer.write_record(&header)?;

    for (i, date) in view.dates.iter().enumerate() {
        let mut record = vec![view.country.clone(), date.to_string()];
        record.extend(view.series.iter().map(|s| s.values[i].to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
