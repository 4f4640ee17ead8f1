use super::client::CalendarApi;
use super::models::{EventDateTime, EventRecord, MeetingRequest, Reminders, StartTime};
use super::time::{parse_iso_datetime, EventTime};
use crate::components::link_store::{record_link, LinkStore};
use crate::error::BotResult;
use std::fmt;
use tracing::{error, info, warn};

/// Why no event was created
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingStartTime,
    InvalidStartTime(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingStartTime => {
                write!(f, "No valid start_time provided. Skipping meeting creation.")
            }
            SkipReason::InvalidStartTime(input) => {
                write!(f, "Invalid start_time format '{}'. Unable to parse.", input)
            }
        }
    }
}

/// Result of one create-meeting attempt
#[derive(Debug)]
pub enum MeetingOutcome {
    /// The event exists. Recording its link may still have failed.
    Scheduled {
        link: String,
        link_recorded: BotResult<()>,
    },
    /// Nothing was sent anywhere
    Skipped(SkipReason),
    /// The provider refused or could not be reached
    Failed(String),
}

impl MeetingOutcome {
    pub fn link(&self) -> Option<&str> {
        match self {
            MeetingOutcome::Scheduled { link, .. } => Some(link),
            _ => None,
        }
    }
}

/// Resolve the request into an event payload
pub fn build_event(request: &MeetingRequest) -> Result<EventRecord, SkipReason> {
    let start = match &request.start_time {
        StartTime::Missing => return Err(SkipReason::MissingStartTime),
        StartTime::Text(text) if text.trim().is_empty() => {
            return Err(SkipReason::MissingStartTime)
        }
        StartTime::Text(text) => parse_iso_datetime(text)
            .ok_or_else(|| SkipReason::InvalidStartTime(text.clone()))?,
        StartTime::At(time) => *time,
    };
    let end = start.meeting_end();
    info!("End Time Calculated: {}", end);

    Ok(EventRecord {
        summary: request.summary.clone(),
        description: request.description.clone(),
        start: tagged(start, &request.time_zone),
        end: tagged(end, &request.time_zone),
        reminders: Reminders { use_default: true },
    })
}

fn tagged(time: EventTime, time_zone: &str) -> EventDateTime {
    EventDateTime {
        date_time: time.to_iso_string(),
        time_zone: time_zone.to_string(),
    }
}

/// Create one calendar event and record its link.
///
/// Never fails outright: bad input and provider errors come back as
/// `Skipped` or `Failed`, and a store failure rides along in `Scheduled`.
pub async fn create_meeting(
    api: &dyn CalendarApi,
    store: &dyn LinkStore,
    request: &MeetingRequest,
) -> MeetingOutcome {
    info!("Start Time Received: {}", request.start_time);

    let event = match build_event(request) {
        Ok(event) => event,
        Err(reason) => {
            warn!("{}", reason);
            return MeetingOutcome::Skipped(reason);
        }
    };

    let result = match api.insert_event(&event).await {
        Ok(result) => result,
        Err(e) => {
            error!("Error creating event: {}", e);
            return MeetingOutcome::Failed(e.to_string());
        }
    };
    info!("Created event {} ({})", result.id, result.html_link);

    let link_recorded = record_link(store, &result.html_link).await;
    if let Err(e) = &link_recorded {
        error!("Error recording meeting link: {}", e);
    }

    MeetingOutcome::Scheduled {
        link: result.html_link,
        link_recorded,
    }
}
