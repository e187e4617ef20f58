use crate::types::errors::MonetaryError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DECIMAL_PLACES: usize = 2;
const SCALE: i64 = 10i64.pow(DECIMAL_PLACES as u32);

/// Fixed-point monetary value stored as signed currency minor units.
///
/// Balances and amounts are never represented as binary floating point;
/// every arithmetic path goes through the checked operations so rounding
/// drift and silent wrap-around are impossible.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Monetary(i64);

impl Monetary {
    pub const ZERO: Monetary = Monetary(0);

    pub fn from_minor_units(units: i64) -> Self {
        Monetary(units)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Monetary {
        Monetary(self.0.saturating_abs())
    }

    pub fn checked_add(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_add(rhs.0).map(Monetary)
    }

    pub fn checked_sub(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_sub(rhs.0).map(Monetary)
    }

    pub fn checked_neg(self) -> Option<Monetary> {
        self.0.checked_neg().map(Monetary)
    }
}

impl Display for Monetary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.saturating_abs();
        let integer = abs / SCALE;
        let fraction = abs % SCALE;
        write!(formatter, "{}{}.{:0width$}", sign, integer, fraction, width = DECIMAL_PLACES)
    }
}

impl FromStr for Monetary {
    type Err = MonetaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(MonetaryError::InvalidFormat("Value is an empty string".to_string()));
        }

        let parts: Vec<&str> = value.split('.').collect();

        if parts.len() > 2 {
            return Err(MonetaryError::InvalidFormat("Value has more than one decimal point".to_string()));
        }

        let integer: i64 = parts[0].parse().map_err(|error| {
            MonetaryError::InvalidFormat(format!("Value has an invalid integer part: {:?}", error))
        })?;

        let fraction: i64 = if parts.len() == 2 {
            if parts[1].len() > DECIMAL_PLACES {
                return Err(MonetaryError::InvalidFormat("Value has too many decimal places".to_string()));
            }

            // i64::from_str would accept a sign here, letting "1.-5" slip
            // through as 0.95; the fraction must be bare digits.
            if !parts[1].chars().all(|c| c.is_ascii_digit()) {
                return Err(MonetaryError::InvalidFormat("Value has a non-numeric fraction part".to_string()));
            }

            let padded = format!("{:0<width$}", parts[1], width = DECIMAL_PLACES);

            padded.parse().map_err(|error| {
                MonetaryError::InvalidFormat(format!("Value has an invalid fraction part: {:?}", error))
            })?
        } else {
            0
        };

        // The integer part alone cannot carry the sign of "-0.50", so it is
        // derived from the raw string instead.
        let is_negative = value.starts_with('-');
        let sign = if is_negative { -1 } else { 1 };
        let result = integer.checked_mul(SCALE)
            .and_then(|v| v.checked_add(sign * fraction))
            .ok_or(MonetaryError::Overflow)?;

        Ok(Monetary(result))
    }
}

impl Serialize for Monetary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Monetary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Monetary::from_str(&value).map_err(de::Error::custom)
    }
}
