use meetsched::config::{Config, DEFAULT_REDIS_URL};
use meetsched::error::Error;
use std::collections::HashMap;
use std::time::Duration;

fn env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("UPSTASH_REDIS_REST_TOKEN", "redis-token".to_string()),
        ("SUBSCRIPTION_KEY", "sub-key".to_string()),
        ("OPENAI_API_KEY", "sk-test".to_string()),
        (
            "GCP_CREDENTIALS_JSON",
            r#"{"installed":{"client_id":"id","client_secret":"secret"}}"#.to_string(),
        ),
    ])
}

/// Smoke test to verify that the config can be loaded
#[test]
fn test_config_loads() {
    let env = env();
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

    assert_eq!(config.redis_url, DEFAULT_REDIS_URL);
    assert_eq!(config.redis_token, "redis-token");
    assert!(config.resolve_credentials_json().unwrap().contains("client_id"));
}

#[test]
fn test_missing_key_names_the_variable() {
    let mut env = env();
    env.remove("OPENAI_API_KEY");

    let err = Config::from_lookup(|key| env.get(key).cloned()).unwrap_err();
    assert!(matches!(err, Error::Environment(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn test_optional_timeouts() {
    let mut env = env();
    env.insert("OAUTH_CALLBACK_TIMEOUT_SECS", "120".to_string());
    env.insert("HTTP_TIMEOUT_SECS", "15".to_string());

    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    assert_eq!(config.auth_timeout, Some(Duration::from_secs(120)));
    assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
    assert!(config.http_client().is_ok());

    env.insert("HTTP_TIMEOUT_SECS", "soon".to_string());
    assert!(matches!(
        Config::from_lookup(|key| env.get(key).cloned()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_credentials_path_indirection() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("client.json");
    std::fs::write(&file, r#"{"installed":{"client_id":"from-file"}}"#).unwrap();

    let mut env = env();
    env.insert("GCP_CREDENTIALS_JSON", file.display().to_string());
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    assert!(config.resolve_credentials_json().unwrap().contains("from-file"));

    env.insert(
        "GCP_CREDENTIALS_JSON",
        dir.path().join("absent.json").display().to_string(),
    );
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    assert!(matches!(
        config.resolve_credentials_json(),
        Err(Error::Credentials(_))
    ));
}
