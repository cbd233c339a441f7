use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("empty time string")]
    Empty,

    #[error("malformed time {0:?}, expected HH:MM or HH:MM:SS")]
    Format(String),

    #[error("time {0:?} out of range")]
    OutOfRange(String),
}

/// Time of day at minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ClockError> {
        if hour > 23 || minute > 59 {
            return Err(ClockError::OutOfRange(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self(hour as u16 * 60 + minute as u16))
    }

    pub fn from_minutes(minutes: u16) -> Result<Self, ClockError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ClockError::OutOfRange(format!("{} minutes", minutes)));
        }
        Ok(Self(minutes))
    }

    /// Parses `H:MM`, `HH:MM` or `HH:MM:SS`. Seconds are checked, then dropped.
    pub fn parse(raw: &str) -> Result<Self, ClockError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(ClockError::Empty);
        }

        let parts: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(ClockError::Format(raw.to_string()));
        }

        let hour = parse_field(parts[0], 1..=2, raw)?;
        let minute = parse_field(parts[1], 2..=2, raw)?;
        let second = match parts.get(2) {
            Some(p) => parse_field(p, 2..=2, raw)?,
            None => 0,
        };

        if hour > 23 || minute > 59 || second > 59 {
            return Err(ClockError::OutOfRange(raw.to_string()));
        }

        Ok(Self(hour as u16 * 60 + minute as u16))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }
}

fn parse_field(
    field: &str,
    width: std::ops::RangeInclusive<usize>,
    raw: &str,
) -> Result<u8, ClockError> {
    if !width.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClockError::Format(raw.to_string()));
    }
    field
        .parse::<u8>()
        .map_err(|_| ClockError::Format(raw.to_string()))
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:00", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
