/// Calling code substituted for a single national trunk `0`.
pub const DEFAULT_CALLING_CODE: &str = "33";

/// Width, `+` included, that a billing prefix is padded and cut to before parsing.
pub const PREFIX_WIDTH: usize = 6;

/// Rewrites a national or international-access number into a bare international one.
///
/// A leading `000` or `00` access code is dropped; a single trunk `0` becomes
/// [`DEFAULT_CALLING_CODE`]. Anything else is returned untouched.
pub fn remove_zero(number: &str) -> String {
    if let Some(rest) = number.strip_prefix("000") {
        rest.to_string()
    } else if let Some(rest) = number.strip_prefix("00") {
        rest.to_string()
    } else if let Some(rest) = number.strip_prefix('0') {
        format!("{DEFAULT_CALLING_CODE}{rest}")
    } else {
        number.to_string()
    }
}

/// Normalizes a dialled destination into `+<digits>` form.
pub fn normalize_number(raw: &str) -> String {
    let digits = raw.trim().trim_start_matches('+');
    format!("+{}", remove_zero(digits))
}

/// Normalizes a rate prefix: pads it with zeros and cuts it to [`PREFIX_WIDTH`].
///
/// Prefixes are not complete numbers, so the padding only exists to give the
/// parser something long enough to resolve a calling code from.
pub fn normalize_prefix(raw: &str) -> String {
    let digits = raw.trim().trim_start_matches('+');
    format!("+{digits}000000")
        .chars()
        .take(PREFIX_WIDTH)
        .collect()
}

/// True when `number` is a `+` followed by ASCII digits only.
pub fn is_dialable(number: &str) -> bool {
    match number.strip_prefix('+') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
