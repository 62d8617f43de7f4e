//! Month-of-year value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A month of the year, 1 (January) through 12 (December).
///
/// Used to filter competitions by the month of their deadline. Parses both
/// `"7"` and `"07"`; [`Month::as_two_digits`] yields the zero-padded form
/// that SQLite's `strftime('%m', ...)` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

impl Month {
    /// Try to create a month, returning None if outside 1-12
    pub fn try_new(value: u8) -> Option<Self> {
        (1..=12).contains(&value).then_some(Self(value))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn as_two_digits(self) -> String {
        format!("{:02}", self.0)
    }
}

impl TryFrom<u8> for Month {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value).ok_or_else(|| DomainError::InvalidMonth(value.to_string()))
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> Self {
        month.0
    }
}

impl std::str::FromStr for Month {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Self::try_new)
            .ok_or_else(|| DomainError::InvalidMonth(trimmed.to_string()))
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_padded_and_unpadded() {
        assert_eq!("07".parse::<Month>().unwrap().number(), 7);
        assert_eq!("7".parse::<Month>().unwrap().number(), 7);
        assert_eq!("12".parse::<Month>().unwrap().as_two_digits(), "12");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!("0".parse::<Month>().is_err());
        assert!("13".parse::<Month>().is_err());
        assert!("July".parse::<Month>().is_err());
    }

    #[test]
    fn test_two_digits() {
        assert_eq!(Month::try_new(3).unwrap().as_two_digits(), "03");
    }
}
