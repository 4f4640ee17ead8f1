mod auth;
mod client;
pub mod credentials;
mod meeting;
pub mod models;
pub mod oauth;
pub mod time;
pub mod token;

pub use auth::{Authenticator, CalendarSession};
pub use client::{CalendarApi, GoogleCalendarClient};
pub use meeting::{build_event, create_meeting, MeetingOutcome, SkipReason};
pub use models::{EventRecord, EventResult, MeetingRequest, StartTime};
pub use oauth::{AuthorizationFlow, InstalledAppFlow};
pub use token::{FileTokenStore, MemoryTokenStore, Token, TokenStore};
