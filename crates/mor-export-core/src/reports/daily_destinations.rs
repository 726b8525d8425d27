use mor_export_geo::classify_prefix;
use sqlx::FromRow;

use super::{window_params, Report};
use crate::accumulate::{DayKey, Tally};
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::QuerySpec;

const SQL: &str = r#"
    SELECT
        CAST(DATE(c.calldate) AS CHAR) AS day,
        dst.name AS destination,
        c.prefix AS prefix,
        COUNT(*) AS calls
    FROM mor.calls c
    INNER JOIN mor.destinations dst ON c.prefix = dst.prefix
    WHERE c.calldate > ?
        AND c.calldate < ?
        AND c.dst_device_id = 0
    GROUP BY destination, day
    ORDER BY destination, day
"#;

const HEADER: &[&str] = &["Day", "Country", "Calls"];

/// Calls per day and country, folded from per-destination counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCallsPerDayByDestination;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyDestinationRow {
    pub day: String,
    pub destination: String,
    pub prefix: String,
    pub calls: i64,
}

impl Report for MaxCallsPerDayByDestination {
    type Row = DailyDestinationRow;

    fn name(&self) -> &'static str {
        "morMaxCallsNumberPerDaysByDestinations"
    }

    fn header(&self) -> &'static [&'static str] {
        HEADER
    }

    fn query(&self, window: &DateWindow) -> QuerySpec {
        window_params(QuerySpec::new(SQL), window)
    }

    fn render(&self, rows: Vec<Self::Row>) -> Result<Vec<Vec<String>>> {
        let tally: Tally<DayKey> = rows
            .into_iter()
            .map(|row| {
                let country = classify_prefix(&row.prefix, &row.destination);
                (DayKey::new(row.day, country.display_name()), row.calls)
            })
            .collect();

        Ok(tally
            .into_entries()
            .into_iter()
            .map(|(key, calls)| vec![key.day, key.group, calls.to_string()])
            .collect())
    }
}
