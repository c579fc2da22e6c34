use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A calendar month, the granularity of archive records.
///
/// Its label is `"<month> <year>"` without zero padding, e.g. `"3 2025"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, StorageError> {
        if !(1..=12).contains(&month) {
            return Err(StorageError::ConstraintViolation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Period of a moment as seen from the institution's local offset
    pub fn of_instant(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::of_date(local_date(now, offset))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Calendar day of `now` in the given offset
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

impl FromStr for Period {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StorageError::Corrupt(format!("invalid period label '{}'", s));

        let mut parts = s.split_whitespace();
        let month = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_label_has_no_padding() {
        let period = Period::new(2025, 3).unwrap();
        assert_eq!(period.label(), "3 2025");
        assert_eq!("3 2025".parse::<Period>().unwrap(), period);
    }

    #[test]
    fn test_rejects_invalid_month() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
        assert!("13 2025".parse::<Period>().is_err());
        assert!("march 2025".parse::<Period>().is_err());
    }

    #[test]
    fn test_instant_uses_local_offset() {
        // 31 Jan 20:00 UTC is already 1 Feb in UTC+05:30
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 20, 0, 0).unwrap();
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(Period::of_instant(now, ist), Period::new(2025, 2).unwrap());
        assert_eq!(Period::of_instant(now, utc), Period::new(2025, 1).unwrap());
        assert_eq!(
            local_date(now, ist),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
    }
}
