use mor_export_geo::{classify_number, normalize_number};
use sqlx::FromRow;

use super::{window_params, Report};
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::QuerySpec;
use crate::format::seconds_to_hours;

const SQL: &str = r#"
    SELECT
        c.dst AS destination,
        CAST(c.billsec AS SIGNED) AS duration
    FROM mor.calls c
    WHERE c.calldate > ?
        AND c.calldate < ?
        AND c.dst_device_id = 0
        AND c.disposition = 'ANSWERED'
"#;

const HEADER: &[&str] = &["Country", "Destination", "Duration", "Duration (hours)"];

/// Answered outgoing calls, tagged with the destination's region and line type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationByLineType;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LineDurationRow {
    pub destination: String,
    pub duration: i64,
}

impl Report for DurationByLineType {
    type Row = LineDurationRow;

    fn name(&self) -> &'static str {
        "morCallsDurationPerMobileOrLandlinePhones"
    }

    fn header(&self) -> &'static [&'static str] {
        HEADER
    }

    fn query(&self, window: &DateWindow) -> QuerySpec {
        window_params(QuerySpec::new(SQL), window)
    }

    fn render(&self, rows: Vec<Self::Row>) -> Result<Vec<Vec<String>>> {
        Ok(rows
            .into_iter()
            .map(|row| {
                let classification = classify_number(&row.destination);
                vec![
                    classification.line_label(),
                    normalize_number(&row.destination),
                    row.duration.to_string(),
                    seconds_to_hours(row.duration),
                ]
            })
            .collect())
    }
}
