use sqlx::FromRow;

use super::{window_params, Report};
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::QuerySpec;
use crate::format::optional;

// Incoming calls are the ones with provider_id = 0.
const SQL: &str = r#"
    SELECT
        d.did AS did,
        COUNT(DISTINCT CASE WHEN c.provider_id = 0 THEN c.id END) AS incoming_calls,
        CAST(COALESCE(SUM(CASE WHEN c.provider_id = 0 THEN c.billsec ELSE 0 END), 0) AS SIGNED) AS incoming_duration,
        CAST(MAX(CASE WHEN c.provider_id = 0 THEN c.calldate END) AS CHAR) AS last_incoming,
        COUNT(DISTINCT CASE WHEN c.provider_id != 0 THEN c.id END) AS outgoing_calls,
        CAST(COALESCE(SUM(CASE WHEN c.provider_id != 0 THEN c.billsec ELSE 0 END), 0) AS SIGNED) AS outgoing_duration,
        CAST(MAX(CASE WHEN c.provider_id != 0 THEN c.calldate END) AS CHAR) AS last_outgoing,
        p.name AS provider
    FROM dids d
    LEFT JOIN calls c
        ON (c.dst = d.did OR c.src = d.did)
        AND c.calldate > ?
        AND c.calldate < ?
    LEFT JOIN providers p ON d.provider_id = p.id
    WHERE d.status = 'active'
        AND LOWER(p.name) LIKE CONCAT('%', LOWER(?), '%') ESCAPE '!'
    GROUP BY d.did, d.provider_id
    ORDER BY d.did
"#;

const HEADER: &[&str] = &[
    "DID",
    "Incoming Calls",
    "Incoming Duration (seconds)",
    "Last Incoming",
    "Outgoing Calls",
    "Outgoing Duration (seconds)",
    "Last Outgoing",
    "Provider",
];

/// Incoming/outgoing activity of active DIDs whose provider name contains a substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderActivity {
    provider: String,
}

impl ProviderActivity {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProviderActivityRow {
    pub did: String,
    pub incoming_calls: i64,
    pub incoming_duration: i64,
    pub last_incoming: Option<String>,
    pub outgoing_calls: i64,
    pub outgoing_duration: i64,
    pub last_outgoing: Option<String>,
    pub provider: String,
}

impl Report for ProviderActivity {
    type Row = ProviderActivityRow;

    fn name(&self) -> &'static str {
        "morCallsIncomingOutgoingNumbersDurationLastByProvider"
    }

    fn header(&self) -> &'static [&'static str] {
        HEADER
    }

    fn query(&self, window: &DateWindow) -> QuerySpec {
        window_params(QuerySpec::new(SQL), window).bind(escape_like(&self.provider))
    }

    fn render(&self, rows: Vec<Self::Row>) -> Result<Vec<Vec<String>>> {
        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    row.did,
                    row.incoming_calls.to_string(),
                    row.incoming_duration.to_string(),
                    optional(&row.last_incoming).to_string(),
                    row.outgoing_calls.to_string(),
                    row.outgoing_duration.to_string(),
                    optional(&row.last_outgoing).to_string(),
                    row.provider,
                ]
            })
            .collect())
    }
}

/// Escapes LIKE wildcards so the filter matches the text literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(ch);
    }
    escaped
}
