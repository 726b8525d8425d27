use crate::error::{ExportError, Result};

const AVERAGE_WIDTH: usize = 4;

/// Renders a duration in seconds as `"H h M m"`.
pub fn seconds_to_hours(seconds: i64) -> String {
    format!("{} h {} m", seconds / 3600, seconds % 3600 / 60)
}

/// Renders a duration in minutes as `"H h M m"`.
pub fn minutes_to_hours(minutes: i64) -> String {
    format!("{} h {} m", minutes / 60, minutes % 60)
}

/// Parses a price that may use a comma as decimal separator.
pub fn parse_price(raw: &str) -> Result<f64> {
    let normalized = raw.trim().replacen(',', ".", 1);
    normalized
        .parse()
        .map_err(|source| ExportError::InvalidPrice {
            value: raw.to_string(),
            source,
        })
}

/// Price per minute, or zero unless both price and duration are positive.
pub fn average_price_per_minute(price: f64, minutes: i64) -> f32 {
    if price > 0.0 && minutes > 0 {
        (price / minutes as f64) as f32
    } else {
        0.0
    }
}

/// Shortest decimal rendering of `average`, cut to its first four characters.
///
/// The cut counts characters, not decimals: `1234.5` becomes `1234`.
pub fn render_average(average: f32) -> String {
    average.to_string().chars().take(AVERAGE_WIDTH).collect()
}

/// The `Average (Price/Min)` cell for a raw price string and a duration in minutes.
pub fn average_price_cell(raw_price: &str, minutes: i64) -> Result<String> {
    let price = parse_price(raw_price)?;
    Ok(render_average(average_price_per_minute(price, minutes)))
}

/// Empty string for a missing value.
pub fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
