use super::credentials::ClientSecret;
use crate::error::{authorization_error, BotResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Scopes requested from Google
pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Cached OAuth credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Body returned by the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

impl Token {
    /// Build a token from an endpoint response.
    ///
    /// Google omits the refresh token and sometimes the scope on refresh, so
    /// the previous values fill the gaps.
    pub fn from_response(
        response: TokenResponse,
        previous_refresh: Option<String>,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let expires_in = response.expires_in.unwrap_or(3600);
        let scopes = match response.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => requested_scopes.to_vec(),
        };

        Token {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Some(now + Duration::seconds(expires_in)),
            scopes,
            token_type: response.token_type.unwrap_or_else(default_token_type),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECONDS),
            None => false,
        }
    }

    /// Whether every requested scope was granted
    pub fn covers(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s))
    }

    pub fn is_valid(&self, scopes: &[String], now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.covers(scopes) && !self.is_expired(now)
    }

    pub fn to_bytes(&self) -> BotResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Persistence for the opaque token bytes
pub trait TokenStore: Send + Sync {
    fn load(&self) -> BotResult<Option<Vec<u8>>>;
    fn save(&self, bytes: &[u8]) -> BotResult<()>;
}

/// Token cache on local disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> BotResult<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&self.path)?))
    }

    fn save(&self, bytes: &[u8]) -> BotResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }
}

/// In-memory token cache, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    data: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::new(Mutex::new(Some(bytes.into()))),
        }
    }

    pub fn with_token(token: &Token) -> BotResult<Self> {
        Ok(Self::with_bytes(token.to_bytes()?))
    }

    /// Decode whatever is currently stored
    pub fn token(&self) -> Option<Token> {
        let data = self.data.lock().ok()?;
        data.as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> BotResult<Option<Vec<u8>>> {
        let data = self
            .data
            .lock()
            .map_err(|_| authorization_error("Token store lock poisoned"))?;
        Ok(data.clone())
    }

    fn save(&self, bytes: &[u8]) -> BotResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| authorization_error("Token store lock poisoned"))?;
        *data = Some(bytes.to_vec());
        Ok(())
    }
}

/// What the token cache holds at startup
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    NoToken,
    /// Unreadable, expired or under-scoped. The token is kept when it parsed.
    PresentInvalid(Option<Token>),
    Valid(Token),
}

/// Classify the cached token
pub fn inspect(
    store: &dyn TokenStore,
    scopes: &[String],
    now: DateTime<Utc>,
) -> BotResult<TokenState> {
    let Some(bytes) = store.load()? else {
        return Ok(TokenState::NoToken);
    };

    let token: Token = match serde_json::from_slice(&bytes) {
        Ok(token) => token,
        Err(e) => {
            info!("Cached token could not be parsed: {}", e);
            return Ok(TokenState::PresentInvalid(None));
        }
    };

    if token.is_valid(scopes, now) {
        Ok(TokenState::Valid(token))
    } else {
        Ok(TokenState::PresentInvalid(Some(token)))
    }
}

/// Exchange an authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    secret: &ClientSecret,
    code: &str,
    redirect_uri: &str,
    scopes: &[String],
) -> BotResult<Token> {
    let params = [
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];

    let response = request_token(client, &secret.token_uri, &params).await?;
    Ok(Token::from_response(response, None, scopes, Utc::now()))
}

/// Refresh an expired token
pub async fn refresh_token(
    client: &Client,
    secret: &ClientSecret,
    token: &Token,
) -> BotResult<Token> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or_else(|| authorization_error("No refresh token in token data"))?;

    let params = [
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = request_token(client, &secret.token_uri, &params).await?;
    Ok(Token::from_response(
        response,
        Some(refresh_token.to_string()),
        &token.scopes,
        Utc::now(),
    ))
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> BotResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| authorization_error(&format!("Failed to reach token endpoint: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(authorization_error(&format!(
            "Failed to get token: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| authorization_error(&format!("Failed to parse token response: {}", e)))
}
