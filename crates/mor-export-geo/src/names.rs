use isocountry::CountryCode;

// ISO 3166 full names that differ from the name used in reports. Kept in
// step with the fallback table so both lookups agree on one spelling.
const COMMON_NAMES: &[(&str, &str)] = &[
    ("BO", "Bolivia"),
    ("BN", "Brunei"),
    ("CD", "DR Congo"),
    ("CI", "Ivory Coast"),
    ("CV", "Cape Verde"),
    ("FK", "Falkland Islands"),
    ("FM", "Micronesia"),
    ("GB", "United Kingdom"),
    ("IR", "Iran"),
    ("KP", "North Korea"),
    ("KR", "South Korea"),
    ("LA", "Laos"),
    ("MD", "Moldova"),
    ("MF", "Saint Martin"),
    ("MK", "North Macedonia"),
    ("PS", "Palestine"),
    ("RU", "Russia"),
    ("SX", "Sint Maarten"),
    ("SY", "Syria"),
    ("TW", "Taiwan"),
    ("TZ", "Tanzania"),
    ("US", "United States"),
    ("VA", "Vatican City"),
    ("VE", "Venezuela"),
    ("VG", "British Virgin Islands"),
    ("VI", "United States Virgin Islands"),
    ("VN", "Vietnam"),
];

/// Common country name for a two-letter region code, e.g. `RU` -> `Russia`.
pub fn country_name(region_code: &str) -> Option<&'static str> {
    let country = CountryCode::for_alpha2(region_code).ok()?;
    let common = COMMON_NAMES
        .iter()
        .find(|(code, _)| *code == region_code)
        .map(|(_, name)| *name);
    Some(common.unwrap_or_else(|| country.name()))
}
