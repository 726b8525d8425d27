use mor_export_geo::classify_prefix;
use sqlx::FromRow;

use super::{window_params, Report};
use crate::dates::DateWindow;
use crate::error::Result;
use crate::executor::QuerySpec;
use crate::format::{average_price_cell, minutes_to_hours};

const HEADER: &[&str] = &[
    "Device group",
    "Country",
    "Destination",
    "Prefix",
    "Price",
    "Duration",
    "Duration (hours)",
    "Average (Price/Min)",
];

/// Originating devices reported together under one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceGroup {
    pub name: &'static str,
    pub devices: &'static [u32],
}

pub const DEVICE_GROUPS: &[DeviceGroup] = &[
    DeviceGroup {
        name: "EN",
        devices: &[181, 1081],
    },
    DeviceGroup {
        name: "FR",
        devices: &[671, 1072],
    },
];

pub const PROVIDERS: &[u32] = &[561, 721, 21, 31, 101, 111, 441, 711, 781, 801];

/// Call cost and minutes per destination, split by device group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricesByDestination {
    groups: Vec<DeviceGroup>,
    providers: Vec<u32>,
}

impl Default for PricesByDestination {
    fn default() -> Self {
        Self::new(DEVICE_GROUPS.to_vec(), PROVIDERS.to_vec())
    }
}

/// `price` keeps the database's comma decimal separator; `duration` is in minutes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DestinationPriceRow {
    pub device_group: String,
    pub destination: String,
    pub prefix: String,
    pub price: String,
    pub duration: i64,
}

impl PricesByDestination {
    pub fn new(groups: Vec<DeviceGroup>, providers: Vec<u32>) -> Self {
        Self { groups, providers }
    }

    // Group names and ids are compiled in, so they are rendered into the SQL text.
    fn sql(&self) -> String {
        let cases: String = self
            .groups
            .iter()
            .map(|group| {
                format!(
                    "WHEN c.src_device_id IN ({}) THEN '{}' ",
                    join_ids(group.devices),
                    group.name
                )
            })
            .collect();
        let devices: Vec<u32> = self
            .groups
            .iter()
            .flat_map(|group| group.devices.iter().copied())
            .collect();

        format!(
            r#"
    SELECT
        CASE {cases}END AS device_group,
        dst.name AS destination,
        c.prefix AS prefix,
        REPLACE(CAST(ROUND(SUM(c.provider_price), 2) AS CHAR), '.', ',') AS price,
        CAST(ROUND(SUM(c.duration) / 60) AS SIGNED) AS duration
    FROM mor.calls c
    INNER JOIN mor.destinations dst ON c.prefix = dst.prefix
    WHERE c.calldate > ?
        AND c.calldate < ?
        AND c.src_device_id IN ({devices})
        AND c.provider_id IN ({providers})
    GROUP BY device_group, destination
    ORDER BY device_group, destination
"#,
            devices = join_ids(&devices),
            providers = join_ids(&self.providers),
        )
    }
}

impl Report for PricesByDestination {
    type Row = DestinationPriceRow;

    fn name(&self) -> &'static str {
        "morCallsPricesByDestinationsByDeviceGroupsByProviders"
    }

    fn header(&self) -> &'static [&'static str] {
        HEADER
    }

    fn query(&self, window: &DateWindow) -> QuerySpec {
        window_params(QuerySpec::new(self.sql()), window)
    }

    fn render(&self, rows: Vec<Self::Row>) -> Result<Vec<Vec<String>>> {
        rows.into_iter()
            .map(|row| {
                let average = average_price_cell(&row.price, row.duration)?;
                let classification = classify_prefix(&row.prefix, &row.destination);
                Ok(vec![
                    row.device_group,
                    classification.display_name().to_string(),
                    row.destination,
                    classification.international().to_string(),
                    row.price,
                    row.duration.to_string(),
                    minutes_to_hours(row.duration),
                    average,
                ])
            })
            .collect()
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
