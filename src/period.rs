use std::str::FromStr;

use parse_display::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Year and month identifying one reporting window.
///
/// Every live `Period` is valid: construction, parsing and
/// deserialization all reject out-of-range parts. Values are compared by
/// content and order chronologically.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{year:04}-{month:02}")]
pub struct Period {
    year: u16,
    month: u8,
}

impl Period {
    /// Creates a period, rejecting months outside `1..=12` and years
    /// outside `0..=9999`.
    pub fn new(year: u16, month: u8) -> Result<Self, InvalidPeriod> {
        if !(1..=12).contains(&month) {
            return Err(InvalidPeriod::MonthOutOfRange(month));
        }
        if year > 9999 {
            return Err(InvalidPeriod::YearOutOfRange(year));
        }
        Ok(Period { year, month })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// The following month, saturating at `9999-12`.
    pub fn next(self) -> Period {
        match (self.year, self.month) {
            (9999, 12) => self,
            (year, 12) => Period { year: year + 1, month: 1 },
            (year, month) => Period { year, month: month + 1 },
        }
    }

    /// The preceding month, saturating at `0000-01`.
    pub fn prev(self) -> Period {
        match (self.year, self.month) {
            (0, 1) => self,
            (year, 1) => Period { year: year - 1, month: 12 },
            (year, month) => Period { year, month: month - 1 },
        }
    }
}

impl std::fmt::Debug for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidPeriod::Malformed(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        let year: u16 = year.parse().map_err(|_| malformed())?;
        let month: u8 = month.parse().map_err(|_| malformed())?;
        Period::new(year, month)
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Period, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A selector value that fails basic validation; rejected without
/// mutating anything.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidPeriod {
    #[error("month {0} is out of range 1..=12")]
    MonthOutOfRange(u8),
    #[error("year {0} is out of range 0..=9999")]
    YearOutOfRange(u16),
    #[error("malformed period {0:?}, expected \"YYYY-MM\"")]
    Malformed(String),
}
