use crate::error::{credentials_error, BotResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client credentials as issued by the Google Cloud console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// The downloaded file wraps the credentials in an "installed" or "web" object
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    /// Parse a client descriptor document
    pub fn from_json(json: &str) -> BotResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| credentials_error(&format!("Invalid client credentials JSON: {}", e)))?;

        file.installed.or(file.web).ok_or_else(|| {
            credentials_error("Client credentials must contain an 'installed' or 'web' section")
        })
    }

    /// Read the client descriptor from disk
    pub fn read(path: &Path) -> BotResult<Self> {
        if !path.exists() {
            return Err(credentials_error(&format!(
                "'{}' file not found. Please provide OAuth credentials.",
                path.display()
            )));
        }

        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Write the client descriptor from configuration unless one is already on disk.
///
/// Returns true when the file was written.
pub fn ensure_descriptor(path: &Path, json: &str) -> BotResult<bool> {
    if path.exists() {
        return Ok(false);
    }

    // Refuse to write something we could not read back
    ClientSecret::from_json(json)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    info!("Wrote client credentials to {}", path.display());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALLED: &str = r#"{
        "installed": {
            "client_id": "abc.apps.googleusercontent.com",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    #[test]
    fn parses_installed_with_default_endpoints() {
        let secret = ClientSecret::from_json(INSTALLED).unwrap();
        assert_eq!(secret.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(secret.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(secret.auth_uri, DEFAULT_AUTH_URI);
    }

    #[test]
    fn parses_web_section() {
        let json = r#"{"web":{"client_id":"id","client_secret":"s","token_uri":"http://t/token"}}"#;
        let secret = ClientSecret::from_json(json).unwrap();
        assert_eq!(secret.token_uri, "http://t/token");
    }

    #[test]
    fn rejects_unknown_layout() {
        assert!(ClientSecret::from_json(r#"{"other":{}}"#).is_err());
        assert!(ClientSecret::from_json("not json").is_err());
    }

    #[test]
    fn missing_file_is_a_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientSecret::read(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Credentials(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn descriptor_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        assert!(ensure_descriptor(&path, INSTALLED).unwrap());
        assert_eq!(ClientSecret::read(&path).unwrap().client_secret, "shh");

        let other = r#"{"installed":{"client_id":"x","client_secret":"other"}}"#;
        assert!(!ensure_descriptor(&path, other).unwrap());
        assert_eq!(ClientSecret::read(&path).unwrap().client_secret, "shh");
    }

    #[test]
    fn invalid_json_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        assert!(ensure_descriptor(&path, "{}").is_err());
        assert!(!path.exists());
    }
}
