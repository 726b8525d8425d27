use std::fmt;

/// Placeholder written wherever a number or region could not be resolved.
pub const UNKNOWN: &str = "UNKNOWN";

const MOBILE_SUFFIX: &str = "_MOBILE";

/// Geography recovered from a successfully parsed number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geography {
    /// Two-letter region, absent when the calling code is shared and the
    /// number does not pin down a single region.
    pub region_code: Option<String>,
    pub display_name: String,
    pub is_mobile: bool,
    /// The number rendered in international format, e.g. `+33 6 12 34 56 78`.
    pub international: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Resolved(Geography),
    Unknown,
}

impl Classification {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Classification::Unknown)
    }

    pub fn geography(&self) -> Option<&Geography> {
        match self {
            Classification::Resolved(geo) => Some(geo),
            Classification::Unknown => None,
        }
    }

    pub fn region_code(&self) -> Option<&str> {
        self.geography()
            .and_then(|geo| geo.region_code.as_deref())
    }

    pub fn display_name(&self) -> &str {
        self.geography()
            .map(|geo| geo.display_name.as_str())
            .unwrap_or(UNKNOWN)
    }

    pub fn is_mobile(&self) -> bool {
        self.geography().is_some_and(|geo| geo.is_mobile)
    }

    pub fn international(&self) -> &str {
        self.geography()
            .map(|geo| geo.international.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Region code tagged with `_MOBILE` for mobile lines, e.g. `FR_MOBILE`.
    ///
    /// A number on a calling code shared by several regions parses without a
    /// region and is labelled like a parse failure (`UNKNOWN`, `UNKNOWN_MOBILE`).
    /// [`Classification::is_unknown`] tells the two apart.
    pub fn line_label(&self) -> String {
        let region = self.region_code().unwrap_or(UNKNOWN);
        if self.is_mobile() {
            format!("{region}{MOBILE_SUFFIX}")
        } else {
            region.to_string()
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
