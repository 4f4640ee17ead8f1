use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use std::fmt;

/// Meetings always last this long
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Format accepted by the interactive prompt
pub const PROMPT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Naive ISO-8601 layouts, seconds and fractions optional
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset-qualified ISO-8601 layouts
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// A resolved meeting time.
///
/// Floating times carry no offset; the event's time zone tag decides what
/// wall clock they refer to. Offset times are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Floating(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl EventTime {
    /// Add a number of minutes, keeping the representation
    pub fn plus_minutes(self, minutes: i64) -> Self {
        let delta = Duration::minutes(minutes);
        match self {
            EventTime::Floating(dt) => EventTime::Floating(dt + delta),
            EventTime::Offset(dt) => EventTime::Offset(dt + delta),
        }
    }

    /// End time of a meeting starting at this time
    pub fn meeting_end(self) -> Self {
        self.plus_minutes(DEFAULT_DURATION_MINUTES)
    }

    /// ISO-8601 text with seconds, and fractions only when present
    pub fn to_iso_string(&self) -> String {
        match self {
            EventTime::Floating(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            EventTime::Offset(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

/// Strictly parse an ISO-8601 date-time.
///
/// Date and time are separated by `T` or a single space. A trailing `Z` or
/// `±HH:MM` makes the result offset-qualified.
pub fn parse_iso_datetime(input: &str) -> Option<EventTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let zulu = input
        .strip_suffix('Z')
        .or_else(|| input.strip_suffix('z'))
        .map(|rest| format!("{}+00:00", rest));
    let candidate = zulu.as_deref().unwrap_or(input);

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(candidate, format) {
            return Some(EventTime::Offset(dt));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(EventTime::Floating(dt));
        }
    }

    None
}

/// Parse the prompt's `YYYY-MM-DD HH:MM` format
pub fn parse_prompt_datetime(input: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), PROMPT_FORMAT).ok()
}
