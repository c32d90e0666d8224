//! API version strings
//!
//! Selling Partner API versions come in two shapes: `v<N>` (`v0`, `v1`) and
//! release dates (`2020-12-01`). [`VersionKey`] parses both and orders them
//! so that every dated version is newer than every numbered one.

use chrono::NaiveDate;

/// Parsed, ordered form of a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionKey {
    /// `v<N>`, compared numerically
    Numbered(u32),
    /// `YYYY-MM-DD`, compared chronologically
    Dated(NaiveDate),
}

impl VersionKey {
    /// Parse a version string, `None` if it is neither `v<N>` nor a date
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        if let Some(number) = version.strip_prefix('v') {
            if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            return number.parse().ok().map(Self::Numbered);
        }

        let well_shaped = version.len() == 10
            && version.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_shaped {
            return None;
        }
        NaiveDate::parse_from_str(version, "%Y-%m-%d").ok().map(Self::Dated)
    }

    /// Whether `version` is a recognized version format
    #[must_use]
    pub fn is_well_formed(version: &str) -> bool {
        Self::parse(version).is_some()
    }
}
