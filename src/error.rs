use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(
        code(meetsched::environment),
        help("set the variable in the environment or in a .env file")
    )]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(meetsched::config))]
    Config(String),

    #[error("Credentials error: {0}")]
    #[diagnostic(
        code(meetsched::credentials),
        help("provide OAuth client credentials through GCP_CREDENTIALS_JSON")
    )]
    Credentials(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(meetsched::authorization))]
    Authorization(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(meetsched::google_calendar))]
    GoogleCalendar(String),

    #[error("Link store error: {0}")]
    #[diagnostic(code(meetsched::link_store))]
    LinkStore(String),

    #[error("Input error: {0}")]
    #[diagnostic(code(meetsched::input))]
    Input(String),

    #[error(transparent)]
    #[diagnostic(code(meetsched::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(meetsched::serialization))]
    Serialization(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(meetsched::http))]
    Http(#[from] reqwest::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(meetsched::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::LinkStore(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

pub fn credentials_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

pub fn authorization_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

pub fn link_store_error(message: &str) -> Error {
    Error::LinkStore(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_error_names_the_variable() {
        let err = env_error("UPSTASH_REDIS_REST_TOKEN");
        assert_eq!(
            err.to_string(),
            "Environment error: Missing environment variable: UPSTASH_REDIS_REST_TOKEN"
        );
    }

    #[test]
    fn redis_errors_map_to_link_store() {
        let err: Error = redis::RedisError::from((redis::ErrorKind::IoError, "refused")).into();
        assert!(matches!(err, Error::LinkStore(_)));
    }
}
