use super::models::{EventRecord, EventResult};
use crate::error::{google_calendar_error, BotResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// The single Calendar API call the scheduler makes
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn insert_event(&self, event: &EventRecord) -> BotResult<EventResult>;
}

/// Calendar API client bound to one access token and calendar
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    calendar_id: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, access_token: String, calendar_id: String) -> Self {
        Self {
            client,
            access_token,
            calendar_id,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at another API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self) -> BotResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn insert_event(&self, event: &EventRecord) -> BotResult<EventResult> {
        let url = self.events_url()?;
        debug!("Inserting event into {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))
    }
}
