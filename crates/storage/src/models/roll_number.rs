use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A validated student roll number.
///
/// Roll numbers are entered by hand or by a barcode scanner, so the raw input is
/// trimmed and must consist of ASCII digits only. Leading zeros carry no meaning:
/// `"00123"` and `"123"` name the same student. Zero is rejected.
///
/// # Examples
///
/// ```
/// use storage::models::RollNumber;
///
/// let roll: RollNumber = " 00123 ".parse().unwrap();
/// assert_eq!(roll.value(), 123);
/// assert_eq!(roll.to_string(), "123");
///
/// assert!("0".parse::<RollNumber>().is_err());
/// assert!("12a".parse::<RollNumber>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollNumber(u64);

impl RollNumber {
    pub fn parse(input: &str) -> Result<Self, StorageError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(StorageError::InvalidRollNumber(
                "roll number is empty".to_string(),
            ));
        }

        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StorageError::InvalidRollNumber(format!(
                "'{}' is not numeric",
                trimmed
            )));
        }

        // stored as a signed 64-bit column
        let value: u64 = trimmed
            .parse()
            .ok()
            .filter(|value| *value <= i64::MAX as u64)
            .ok_or_else(|| {
                StorageError::InvalidRollNumber(format!("'{}' is out of range", trimmed))
            })?;

        if value == 0 {
            return Err(StorageError::InvalidRollNumber(
                "roll number must be positive".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Key used for storage and for matching against roster rows
    pub fn as_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RollNumber {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RollNumber {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RollNumber> for String {
    fn from(roll: RollNumber) -> Self {
        roll.to_string()
    }
}
