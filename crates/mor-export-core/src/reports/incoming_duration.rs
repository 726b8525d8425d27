use sqlx::FromRow;

use super::{window_params, Report};
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::QuerySpec;
use crate::format::{optional, seconds_to_hours};

const SQL: &str = r#"
    SELECT
        d.did AS did,
        CAST(COALESCE(SUM(c.duration), 0) AS SIGNED) AS seconds,
        p.name AS provider,
        u.username AS username,
        dv.extension AS extension,
        dv.description AS description,
        d.status AS status,
        CAST(d.closed_till AS CHAR) AS update_date
    FROM mor.dids d
    LEFT JOIN (
        SELECT sc.dst, sc.duration
        FROM mor.calls sc
        WHERE sc.calldate > ? AND sc.calldate < ?
    ) c ON c.dst = d.did
    LEFT JOIN mor.providers p ON d.provider_id = p.id
    LEFT JOIN mor.users u ON d.user_id = u.id
    LEFT JOIN mor.devices dv ON d.device_id = dv.id
    GROUP BY d.did
    ORDER BY seconds DESC, description
"#;

const HEADER: &[&str] = &[
    "Did",
    "Seconds",
    "Provider",
    "Username",
    "Extension",
    "Description",
    "Status",
    "UpdateDate",
    "Duration (hours)",
];

/// Total incoming seconds per provisioned DID.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncomingCallsDuration;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IncomingDurationRow {
    pub did: String,
    pub seconds: i64,
    pub provider: Option<String>,
    pub username: Option<String>,
    pub extension: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub update_date: Option<String>,
}

impl Report for IncomingCallsDuration {
    type Row = IncomingDurationRow;

    fn name(&self) -> &'static str {
        "morIncomingCallsDuration"
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
                vec![
                    row.did,
                    row.seconds.to_string(),
                    optional(&row.provider).to_string(),
                    optional(&row.username).to_string(),
                    optional(&row.extension).to_string(),
                    optional(&row.description).to_string(),
                    row.status,
                    optional(&row.update_date).to_string(),
                    seconds_to_hours(row.seconds),
                ]
            })
            .collect())
    }
}
