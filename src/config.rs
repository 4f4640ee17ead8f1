use crate::error::{config_error, credentials_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default Upstash REST endpoint used when UPSTASH_REDIS_REST_URL is unset
pub const DEFAULT_REDIS_URL: &str = "https://fine-swift-52766.upstash.io";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_TOKEN_PATH: &str = "token.json";
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Main configuration structure for the scheduler
#[derive(Debug, Clone)]
pub struct Config {
    /// Key-value store endpoint (Upstash REST or redis:// URL)
    pub redis_url: String,
    /// Key-value store access token
    pub redis_token: String,
    /// API subscription key, validated but not used by the flow
    pub subscription_key: String,
    /// Generative AI key, validated but not used by the flow
    pub openai_api_key: String,
    /// OAuth client descriptor as raw JSON or a path to it
    pub gcp_credentials_json: String,
    /// Where the client descriptor is written and read
    pub credentials_path: PathBuf,
    /// Token cache location
    pub token_path: PathBuf,
    /// Calendar that receives new events
    pub calendar_id: String,
    /// Default time zone for new events
    pub timezone: String,
    /// Upper bound on the OAuth callback wait, unbounded when None
    pub auth_timeout: Option<Duration>,
    /// Upper bound on each outbound HTTP call, unbounded when None
    pub http_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the process environment and an optional .env file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as missing
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| env_error(key));

        // Required environment variables
        let redis_token = required("UPSTASH_REDIS_REST_TOKEN")?;
        let subscription_key = required("SUBSCRIPTION_KEY")?;
        let openai_api_key = required("OPENAI_API_KEY")?;
        let gcp_credentials_json = required("GCP_CREDENTIALS_JSON")?;

        let redis_url =
            optional("UPSTASH_REDIS_REST_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        let timezone = optional("TIMEZONE").unwrap_or_else(|| String::from("UTC"));
        if timezone.parse::<Tz>().is_err() {
            return Err(config_error(&format!("Unknown TIMEZONE: {}", timezone)));
        }

        let credentials_path = optional("GOOGLE_CREDENTIALS_PATH")
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string())
            .into();
        let token_path = optional("GOOGLE_TOKEN_PATH")
            .unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string())
            .into();
        let calendar_id =
            optional("GOOGLE_CALENDAR_ID").unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        let auth_timeout = parse_seconds(
            "OAUTH_CALLBACK_TIMEOUT_SECS",
            optional("OAUTH_CALLBACK_TIMEOUT_SECS"),
        )?;
        let http_timeout = parse_seconds("HTTP_TIMEOUT_SECS", optional("HTTP_TIMEOUT_SECS"))?;

        Ok(Config {
            redis_url,
            redis_token,
            subscription_key,
            openai_api_key,
            gcp_credentials_json,
            credentials_path,
            token_path,
            calendar_id,
            timezone,
            auth_timeout,
            http_timeout,
        })
    }

    /// Resolve the client descriptor document.
    ///
    /// GCP_CREDENTIALS_JSON may hold the JSON itself or name a file that
    /// contains it. Anything that does not start with `{` is treated as a path.
    pub fn resolve_credentials_json(&self) -> BotResult<String> {
        let value = self.gcp_credentials_json.trim();
        if value.starts_with('{') {
            return Ok(value.to_string());
        }

        fs::read_to_string(value).map_err(|e| {
            credentials_error(&format!(
                "GCP_CREDENTIALS_JSON names '{}' but it could not be read: {}",
                value, e
            ))
        })
    }

    /// Build a reqwest client honouring the configured timeout
    pub fn http_client(&self) -> BotResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

fn parse_seconds(key: &str, value: Option<String>) -> BotResult<Option<Duration>> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| config_error(&format!("Invalid {} format", key)))
        })
        .transpose()
}
