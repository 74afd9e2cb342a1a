//! CSV export of finalised strings.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::wiring::PvString;

/// Column header for the string table.
const HEADER: &str = "string_id,inverter_id,mppt_id,roof_plane_id,panel_count,\
                      operating_voltage_v,max_voltage_v,operating_current_a,power_w,panel_ids";

/// Exports strings to a CSV file at the given path.
///
/// One row per string in string order; panel ids are joined with `;`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_strings_csv(strings: &[PvString], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_strings_csv(strings, io::BufWriter::new(file))
}

/// Writes strings as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_strings_csv(strings: &[PvString], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for s in strings {
        let p = &s.properties;
        wtr.write_record(&[
            s.id.clone(),
            s.inverter_id.clone().unwrap_or_default(),
            s.mppt_id.clone().unwrap_or_default(),
            s.roof_plane_id.clone(),
            s.len().to_string(),
            format!("{:.2}", p.operating_voltage),
            format!("{:.2}", p.max_voltage),
            format!("{:.2}", p.operating_current),
            format!("{:.1}", p.power_w),
            s.panel_ids.join(";"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
