use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{ExportError, Result};

/// Accepted layout for `--dateStart` / `--dateEnd`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exclusive time window a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(ExportError::Validation(format!(
                "dateStart ({}) must not be after dateEnd ({})",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds from user input.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_bound(start, "dateStart")?;
        let end = parse_bound(end, "dateEnd")?;
        Self::new(start, end)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dateStart: {} and dateEnd: {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_bound(value: &str, flag: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ExportError::Validation(format!(
            "Invalid {flag} format. Please use 'YYYY-MM-DD HH:mm:SS'"
        ))
    })
}
