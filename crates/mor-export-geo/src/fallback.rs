// Destination labels come from the rate tables and are free text ("Reunion Mobile",
// "UK - London", ...). Entries are checked in order; the first hit wins.
const FALLBACK_COUNTRIES: &[(&[&str], &str)] = &[
    (&["australia", "australie"], "Australia"),
    (&["canada"], "Canada"),
    (&["italy"], "Italy"),
    (&["russia"], "Russia"),
    (&["united states", "unites states"], "United States"),
    (&["guadeloupe"], "France"),
    (&["morocco"], "Morocco"),
    (&["reunion", "réunion", "r?union", "france"], "France"),
    (&["uk", "united kingdom"], "United Kingdom"),
];

/// Recovers a country name from a destination label when metadata lookup failed.
pub fn fallback_country(label: &str) -> Option<&'static str> {
    let label = label.to_lowercase();
    FALLBACK_COUNTRIES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| label.contains(needle)))
        .map(|(_, country)| *country)
}
