use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /api/optimize`. Field names and order are the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub area: String,
    pub budget: u64,
    pub days: u32,
    #[serde(rename = "startDate")]
    pub start_date: StartTime,
    pub people: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub departure: String,
}

/// Start of the first day as an HHMM integer, e.g. `930` for 09:30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StartTime(u16);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartTimeError {
    #[error("start time is empty")]
    Empty,
    #[error("start time `{0}` is neither HH:MM nor HHMM")]
    Malformed(String),
    #[error("start time {0} is not a valid clock time")]
    OutOfRange(u32),
}

impl StartTime {
    pub fn from_hhmm(value: u32) -> Result<Self, StartTimeError> {
        if value > 2359 || value % 100 >= 60 {
            return Err(StartTimeError::OutOfRange(value));
        }
        Ok(Self(value as u16))
    }

    pub fn from_clock(hour: u32, minute: u32) -> Result<Self, StartTimeError> {
        if hour > 23 || minute > 59 {
            return Err(StartTimeError::OutOfRange(hour * 100 + minute));
        }
        Ok(Self((hour * 100 + minute) as u16))
    }

    pub fn hhmm(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 100
    }

    pub fn minute(self) -> u16 {
        self.0 % 100
    }
}

impl FromStr for StartTime {
    type Err = StartTimeError;

    /// Accepts `HH:MM` (as produced by `<input type="time">`) or a raw HHMM integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(StartTimeError::Empty);
        }
        let malformed = || StartTimeError::Malformed(raw.to_string());

        if let Some((hour, minute)) = raw.split_once(':') {
            if !is_digits(hour) || !is_digits(minute) || minute.len() != 2 {
                return Err(malformed());
            }
            let hour: u32 = hour.parse().map_err(|_| malformed())?;
            let minute: u32 = minute.parse().map_err(|_| malformed())?;
            return Self::from_clock(hour, minute);
        }

        if !is_digits(raw) {
            return Err(malformed());
        }
        let value: u32 = raw.parse().map_err(|_| malformed())?;
        Self::from_hhmm(value)
    }
}

impl TryFrom<u16> for StartTime {
    type Error = StartTimeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_hhmm(value.into())
    }
}

impl From<StartTime> for u16 {
    fn from(value: StartTime) -> Self {
        value.0
    }
}

impl fmt::Display for StartTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
