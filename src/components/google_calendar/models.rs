use super::time::EventTime;
use serde::{Deserialize, Serialize};

/// Start time of a meeting request as it arrives from the caller
#[derive(Debug, Clone, PartialEq)]
pub enum StartTime {
    /// Nothing was supplied
    Missing,
    /// Free-form text that still has to be parsed
    Text(String),
    /// Already resolved, e.g. from the interactive prompt
    At(EventTime),
}

impl From<Option<String>> for StartTime {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => StartTime::Text(text),
            None => StartTime::Missing,
        }
    }
}

impl std::fmt::Display for StartTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartTime::Missing => write!(f, "<none>"),
            StartTime::Text(text) => write!(f, "{}", text),
            StartTime::At(time) => write!(f, "{}", time),
        }
    }
}

/// Parameters for a single meeting
#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub summary: String,
    pub description: String,
    pub start_time: StartTime,
    pub time_zone: String,
}

/// Date-time with its time zone tag, as the Calendar API expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
}

/// Event payload submitted to the events.insert endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
}

/// The part of the created event we care about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    #[serde(default)]
    pub id: String,
    pub html_link: String,
    pub status: Option<String>,
}
