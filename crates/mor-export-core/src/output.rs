use std::path::Path;

use chrono::NaiveDateTime;
use csv::{Terminator, WriterBuilder};

use crate::error::Result;

pub const FIELD_DELIMITER: u8 = b';';

/// `YYYY_MM_DD_HH_MM_SS_export.csv` for the given wall-clock time.
pub fn output_file_name(at: NaiveDateTime) -> String {
    at.format("%Y_%m_%d_%H_%M_%S_export.csv").to_string()
}

/// Writes a semicolon-separated file: header first, one line per record.
pub fn write_csv(path: &Path, header: &[&str], lines: &[Vec<String>]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(header)?;
    for line in lines {
        writer.write_record(line)?;
    }
    writer.flush()?;
    Ok(())
}
