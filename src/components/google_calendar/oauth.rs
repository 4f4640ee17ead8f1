//! Interactive authorization-code flow for installed applications.
//!
//! A one-shot HTTP listener on an ephemeral loopback port receives Google's
//! redirect. The listener is blocking, so it runs on tokio's blocking pool
//! while the caller awaits it.

use super::credentials::ClientSecret;
use super::token::{exchange_code, Token};
use crate::error::{authorization_error, BotResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use tracing::{debug, info, warn};
use url::Url;

/// Obtains a fresh token through user consent
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn authorize(&self, secret: &ClientSecret, scopes: &[String]) -> BotResult<Token>;
}

/// Browser-based flow with a local redirect listener
pub struct InstalledAppFlow {
    client: Client,
    timeout: Option<Duration>,
    open_browser: bool,
}

impl InstalledAppFlow {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
            open_browser: true,
        }
    }

    /// Give up waiting for the redirect after this long
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only print the URL instead of launching a browser
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }
}

#[async_trait]
impl AuthorizationFlow for InstalledAppFlow {
    async fn authorize(&self, secret: &ClientSecret, scopes: &[String]) -> BotResult<Token> {
        let server = Server::http("127.0.0.1:0").map_err(|e| {
            authorization_error(&format!("Failed to start callback listener: {}", e))
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| authorization_error("Callback listener has no TCP address"))?;

        let redirect_uri = format!("http://localhost:{}/", port);
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = authorization_url(secret, &redirect_uri, scopes, &state)?;

        println!(
            "Please visit this URL to authorize this application: {}",
            auth_url
        );
        if self.open_browser {
            if let Err(e) = webbrowser::open(auth_url.as_str()) {
                warn!("Could not open a browser: {}", e);
            }
        }

        info!("Waiting for authorization callback on port {}", port);
        let timeout = self.timeout;
        let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state, timeout))
            .await
            .map_err(|e| authorization_error(&format!("Callback listener failed: {}", e)))??;

        exchange_code(&self.client, secret, &code, &redirect_uri, scopes).await
    }
}

/// Build the consent URL
pub fn authorization_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> BotResult<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| authorization_error(&format!("Invalid auth_uri '{}': {}", secret.auth_uri, e)))
}

/// Serve callback requests until one carries a code or an error
fn wait_for_code(server: &Server, state: &str, timeout: Option<Duration>) -> BotResult<String> {
    let deadline = timeout.map(|t| Instant::now() + t);

    loop {
        let request = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                server
                    .recv_timeout(remaining)?
                    .ok_or_else(|| authorization_error("Timed out waiting for authorization"))?
            }
            None => server.recv()?,
        };

        match parse_callback(request.url(), state) {
            Ok(Some(code)) => {
                let _ = request.respond(Response::from_string(
                    "The authentication flow has completed. You may close this window.",
                ));
                return Ok(code);
            }
            Ok(None) => {
                debug!("Ignoring request to {}", request.url());
                let _ = request.respond(Response::from_string("Not found").with_status_code(404));
            }
            Err(e) => {
                let _ = request.respond(
                    Response::from_string(format!("Authorization failed: {}", e))
                        .with_status_code(400),
                );
                return Err(e);
            }
        }
    }
}

/// Read the redirect's query string.
///
/// `Ok(None)` means the request is unrelated (a favicon fetch, say).
pub fn parse_callback(request_url: &str, expected_state: &str) -> BotResult<Option<String>> {
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(request_url))
        .map_err(|e| authorization_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(authorization_error(&format!(
            "Authorization was rejected: {}",
            error
        )));
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(authorization_error("State mismatch in authorization callback"));
    }

    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> ClientSecret {
        ClientSecret {
            client_id: "client-id".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            redirect_uris: Vec::new(),
        }
    }

    #[test]
    fn consent_url_carries_parameters() {
        let scopes = vec!["https://www.googleapis.com/auth/calendar".to_string()];
        let url = authorization_url(&secret(), "http://localhost:5555/", &scopes, "xyz").unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs["client_id"], "client-id");
        assert_eq!(pairs["redirect_uri"], "http://localhost:5555/");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], scopes[0]);
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["access_type"], "offline");
    }

    #[test]
    fn callback_with_code_and_state() {
        let code = parse_callback("/?state=abc&code=4%2F0Ab&scope=x", "abc").unwrap();
        assert_eq!(code.as_deref(), Some("4/0Ab"));
    }

    #[test]
    fn callback_state_mismatch_is_rejected() {
        assert!(parse_callback("/?state=evil&code=123", "abc").is_err());
        assert!(parse_callback("/?code=123", "abc").is_err());
    }

    #[test]
    fn denied_consent_is_rejected() {
        let err = parse_callback("/?error=access_denied&state=abc", "abc").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn unrelated_requests_are_ignored() {
        assert_eq!(parse_callback("/favicon.ico", "abc").unwrap(), None);
    }

    #[tokio::test]
    async fn listener_times_out() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let result = tokio::task::spawn_blocking(move || {
            wait_for_code(&server, "abc", Some(Duration::from_millis(50)))
        })
        .await
        .unwrap();
        assert!(result.unwrap_err().to_string().contains("Timed out"));
    }
}
