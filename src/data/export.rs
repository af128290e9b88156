use std::io::Write;
use std::path::Path;

use super::model::ReflectanceRow;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the reflectance table as a one-row CSV: a header of wavelength
/// labels and one record of values. Missing readings are empty cells.
pub fn write_csv<W: Write>(reflectance: &ReflectanceRow, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(reflectance.row.labels())?;
    csv.write_record(
        reflectance
            .row
            .channels()
            .iter()
            .map(|c| c.value.map(|v| v.to_string()).unwrap_or_default()),
    )?;
    csv.flush()?;
    Ok(())
}

/// Write the reflectance CSV to `path`, replacing any existing file.
pub fn export_csv(reflectance: &ReflectanceRow, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(reflectance, file)?;
    log::info!("Exported {} reflectance values to {}", reflectance.len(), path.display());
    Ok(())
}
