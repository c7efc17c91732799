use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minutes in a full day, used for break-window wrapping.
const DAY_MINUTES: u32 = 24 * 60;

/// Error for a time string that does not match `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: expected HH:MM")]
pub struct TimeFormatError {
    pub input: String,
}

/// A 24-hour wall-clock time ("HH:MM").
///
/// Duration math uses only the hour component; minutes are carried for break
/// display. Serializes as the original string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(ClockTime { hour, minute })
        } else {
            None
        }
    }

    /// Construct from an hour on the hour.
    pub fn on_the_hour(hour: u8) -> Option<Self> {
        Self::new(hour, 0)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    pub fn total_minutes(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// The clock time `minutes` after this one, wrapping past midnight.
    pub fn add_minutes(&self, minutes: u32) -> ClockTime {
        let total = (self.total_minutes() + minutes) % DAY_MINUTES;
        ClockTime {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl FromStr for ClockTime {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TimeFormatError {
            input: s.to_string(),
        };

        let (h, m) = s.split_once(':').ok_or_else(err)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(err());
        }
        let hour: u8 = h.parse().map_err(|_| err())?;
        let minute: u8 = m.parse().map_err(|_| err())?;
        ClockTime::new(hour, minute).ok_or_else(err)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Parse the hour component of an `HH:MM` string.
pub fn parse_hour(time: &str) -> Result<u8, TimeFormatError> {
    time.parse::<ClockTime>().map(|t| t.hour())
}

/// Shift length in whole hours, hour-granular and overnight-aware.
///
/// `end <= start` wraps to the next day, so the result is always in [1, 24].
/// Equal start and end mean a full 24h wrap; callers that consider that
/// invalid must reject it before calling (the coordinator does).
pub fn duration_hours(start: ClockTime, end: ClockTime) -> u32 {
    let mut hours = end.hour() as i32 - start.hour() as i32;
    if end.hour() <= start.hour() {
        hours += 24;
    }
    hours as u32
}

/// Shift length in seconds, matching the persisted `Shift::duration` field.
pub fn duration_seconds(start: ClockTime, end: ClockTime) -> u32 {
    duration_hours(start, end) * 3600
}

/// Center a break of `break_minutes` inside the shift span.
///
/// The break starts `floor((total - break) / 2)` minutes after the shift
/// start; both endpoints wrap past midnight.
pub fn break_window(start: ClockTime, end: ClockTime, break_minutes: u32) -> (ClockTime, ClockTime) {
    let total_minutes = duration_hours(start, end) * 60;
    let half = total_minutes.saturating_sub(break_minutes) / 2;
    let break_start = start.add_minutes(half);
    let break_end = break_start.add_minutes(break_minutes);
    (break_start, break_end)
}

/// UI default-filler for regular employees: four hours after `start`.
///
/// This is not consulted when validating or creating shifts; duration always
/// derives from the explicit start/end pair.
pub fn default_regular_end(start: ClockTime) -> ClockTime {
    start.add_minutes(4 * 60)
}
