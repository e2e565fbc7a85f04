//! Location selection.
//!
//! The trends endpoint is keyed by a woeid ("where on earth" identifier).
//! Users may pass either the woeid itself or a two-letter country code from
//! [`KNOWN_COUNTRY_CODES`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Worldwide.
pub const DEFAULT_WOEID: u32 = 1;

/// Two-letter country codes and the woeid they resolve to.
pub const KNOWN_COUNTRY_CODES: &[(&str, u32)] = &[
    ("AR", 23424747),
    ("AU", 23424748),
    ("BR", 23424768),
    ("CA", 23424775),
    ("DE", 23424829),
    ("ES", 23424950),
    ("FR", 23424819),
    ("GB", 23424975),
    ("IE", 23424803),
    ("IN", 23424848),
    ("JP", 23424856),
    ("MX", 23424900),
    ("US", 23424977),
];

/// Woeids with a known display name.
pub const KNOWN_WOEIDS: &[(u32, &str)] = &[
    (1, "Worldwide"),
    (23424747, "Argentina"),
    (23424748, "Australia"),
    (23424768, "Brazil"),
    (23424775, "Canada"),
    (23424829, "Germany"),
    (23424950, "Spain"),
    (23424819, "France"),
    (23424975, "United Kingdom"),
    (23424803, "Ireland"),
    (23424848, "India"),
    (23424856, "Japan"),
    (23424900, "Mexico"),
    (23424977, "United States"),
    (455827, "São Paulo"),
    (455825, "Rio de Janeiro"),
    (2459115, "New York"),
    (2442047, "Los Angeles"),
    (44418, "London"),
];

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]{2}|[0-9]+)$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("expected a two letter country code or a woeid, got {0:?}")]
    Invalid(String),
    #[error("unknown country code: {0}")]
    UnknownCountryCode(String),
    #[error("woeid out of range: {0}")]
    WoeidOutOfRange(String),
}

/// A resolved location, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub woeid: u32,
}

impl Location {
    pub fn new(woeid: u32) -> Self {
        Self { woeid }
    }

    /// Known display name, if this woeid is in [`KNOWN_WOEIDS`].
    pub fn known_name(&self) -> Option<&'static str> {
        KNOWN_WOEIDS
            .iter()
            .find(|(woeid, _)| *woeid == self.woeid)
            .map(|(_, name)| *name)
    }

    pub fn display_name(&self) -> String {
        self.known_name()
            .map(String::from)
            .unwrap_or_else(|| format!("woeid {}", self.woeid))
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_WOEID)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.woeid)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !LOCATION_RE.is_match(s) {
            return Err(LocationError::Invalid(s.to_string()));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse()
                .map(Self::new)
                .map_err(|_| LocationError::WoeidOutOfRange(s.to_string()));
        }

        let code = s.to_ascii_uppercase();
        KNOWN_COUNTRY_CODES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, woeid)| Self::new(*woeid))
            .ok_or(LocationError::UnknownCountryCode(code))
    }
}

/// Text listing every known country code and woeid.
pub fn known_locations() -> String {
    let mut out = String::from("Country codes:\n");
    for (code, woeid) in KNOWN_COUNTRY_CODES {
        out.push_str(&format!("\t{code} - {}\n", Location::new(*woeid).display_name()));
    }
    out.push_str("\nKnown woeids:\n");
    for (woeid, name) in KNOWN_WOEIDS {
        out.push_str(&format!("\t{woeid} - {name}\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
