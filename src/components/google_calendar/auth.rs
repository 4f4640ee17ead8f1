use super::client::GoogleCalendarClient;
use super::credentials::{ensure_descriptor, ClientSecret};
use super::oauth::AuthorizationFlow;
use super::token::{inspect, refresh_token, Token, TokenState, TokenStore, SCOPES};
use crate::error::BotResult;
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};

/// An authorized session against the Calendar API
#[derive(Debug, Clone)]
pub struct CalendarSession {
    token: Token,
    client: Client,
}

impl CalendarSession {
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Calendar API client for one calendar
    pub fn calendar(&self, calendar_id: &str) -> GoogleCalendarClient {
        GoogleCalendarClient::new(
            self.client.clone(),
            self.token.access_token.clone(),
            calendar_id.to_string(),
        )
    }
}

/// Owns the token cache and decides when the user has to log in
pub struct Authenticator {
    store: Box<dyn TokenStore>,
    flow: Box<dyn AuthorizationFlow>,
    client: Client,
    credentials_path: PathBuf,
    credentials_json: Option<String>,
    scopes: Vec<String>,
}

impl Authenticator {
    pub fn new(
        store: Box<dyn TokenStore>,
        flow: Box<dyn AuthorizationFlow>,
        client: Client,
        credentials_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            flow,
            client,
            credentials_path: credentials_path.into(),
            credentials_json: None,
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Client descriptor to write when the credentials file is absent
    pub fn with_credentials_json(mut self, json: impl Into<String>) -> Self {
        self.credentials_json = Some(json.into());
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Return a usable session, logging in interactively if needed.
    ///
    /// The interactive flow runs at most once per call; its token replaces
    /// whatever was cached.
    pub async fn authenticate(&self) -> BotResult<CalendarSession> {
        let state = inspect(self.store.as_ref(), &self.scopes, Utc::now())?;

        let token = match state {
            TokenState::Valid(token) => {
                info!("Using cached Google token");
                token
            }
            TokenState::PresentInvalid(Some(token)) if self.can_refresh(&token) => {
                match self.refresh(&token).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!("Token refresh failed, falling back to login: {}", e);
                        self.login().await?
                    }
                }
            }
            TokenState::PresentInvalid(_) => {
                info!("Cached Google token is invalid");
                self.login().await?
            }
            TokenState::NoToken => {
                info!("No cached Google token");
                self.login().await?
            }
        };

        Ok(CalendarSession {
            token,
            client: self.client.clone(),
        })
    }

    fn can_refresh(&self, token: &Token) -> bool {
        token.refresh_token.is_some() && token.covers(&self.scopes)
    }

    async fn refresh(&self, token: &Token) -> BotResult<Token> {
        let secret = self.client_secret()?;
        let token = refresh_token(&self.client, &secret, token).await?;
        self.store.save(&token.to_bytes()?)?;
        info!("Refreshed Google token");
        Ok(token)
    }

    async fn login(&self) -> BotResult<Token> {
        let secret = self.client_secret()?;
        let token = self.flow.authorize(&secret, &self.scopes).await?;
        self.store.save(&token.to_bytes()?)?;
        info!("Saved new Google token");
        Ok(token)
    }

    fn client_secret(&self) -> BotResult<ClientSecret> {
        if let Some(json) = &self.credentials_json {
            ensure_descriptor(&self.credentials_path, json)?;
        }
        ClientSecret::read(&self.credentials_path)
    }
}
