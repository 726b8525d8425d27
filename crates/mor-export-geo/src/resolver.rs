use phonenumber::metadata::DATABASE;
use phonenumber::{Mode, Type};

use crate::fallback::fallback_country;
use crate::model::{Classification, Geography, UNKNOWN};
use crate::names::country_name;
use crate::normalize::{is_dialable, normalize_number, normalize_prefix};

/// Calling codes are at most three digits long.
const MAX_CALLING_CODE_LEN: usize = 3;

/// Classifies a dialled destination number as stored in the call records.
pub fn classify_number(raw: &str) -> Classification {
    classify(&normalize_number(raw), raw)
}

/// Classifies a billing prefix; `label` is the destination name attached to it.
///
/// A prefix that is only a calling code (`33`, `44`, `7`) pads to something
/// the parser rejects as too short. Those are resolved from the calling code
/// alone.
pub fn classify_prefix(prefix: &str, label: &str) -> Classification {
    let number = normalize_prefix(prefix);
    match classify(&number, label) {
        Classification::Unknown => match number.strip_prefix('+') {
            Some(digits) if is_dialable(&number) => classify_calling_code(digits, label),
            _ => Classification::Unknown,
        },
        resolved => resolved,
    }
}

/// Resolves an already-normalized `+<digits>` string.
///
/// A parse failure yields [`Classification::Unknown`]. When the region has no
/// country name, `label` is matched against the fallback table before the
/// name degrades to `UNKNOWN`.
pub fn classify(number: &str, label: &str) -> Classification {
    if !is_dialable(number) {
        return Classification::Unknown;
    }
    let parsed = match phonenumber::parse(None, number) {
        Ok(parsed) => parsed,
        Err(_) => return Classification::Unknown,
    };

    let region_code = parsed.country().id().map(|id| format!("{id:?}"));
    let is_mobile = matches!(parsed.number_type(&DATABASE), Type::Mobile);
    let display_name = display_name(region_code.as_deref(), label);
    let international = parsed.format().mode(Mode::International).to_string();

    Classification::Resolved(Geography {
        region_code,
        display_name,
        is_mobile,
        international,
    })
}

// Longest known calling code wins. A code shared by several regions
// (`+7`, `+44`, `+1`) has no region and relies on the label.
fn classify_calling_code(digits: &str, label: &str) -> Classification {
    let longest = digits.len().min(MAX_CALLING_CODE_LEN);
    let found = (1..=longest).rev().find_map(|len| {
        let code: u16 = digits[..len].parse().ok()?;
        DATABASE.region(&code).map(|regions| {
            let region = match regions.as_slice() {
                [single] => Some(single.to_string()),
                _ => None,
            };
            (code, region)
        })
    });

    match found {
        Some((code, region_code)) => Classification::Resolved(Geography {
            display_name: display_name(region_code.as_deref(), label),
            region_code,
            is_mobile: false,
            international: format!("+{code}"),
        }),
        None => Classification::Unknown,
    }
}

fn display_name(region_code: Option<&str>, label: &str) -> String {
    region_code
        .and_then(country_name)
        .or_else(|| fallback_country(label))
        .unwrap_or(UNKNOWN)
        .to_string()
}
