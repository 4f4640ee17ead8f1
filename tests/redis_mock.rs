use async_trait::async_trait;
use meetsched::components::link_store::{self, keys, record_link, LinkStore};
use meetsched::config::Config;
use meetsched::error::{link_store_error, BotResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock implementation of Redis for testing
#[derive(Debug, Clone, Default)]
pub struct MockRedis {
    data: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<usize>>,
    offline: bool,
}

impl MockRedis {
    /// Create a new mock Redis instance
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that refuses every command
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub async fn writes(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl LinkStore for MockRedis {
    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        if self.offline {
            return Err(link_store_error("connection refused"));
        }
        *self.writes.lock().await += 1;
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        if self.offline {
            return Err(link_store_error("connection refused"));
        }
        Ok(self.data.lock().await.get(key).cloned())
    }
}

fn config_for(url: &str) -> Config {
    let env = HashMap::from([
        ("UPSTASH_REDIS_REST_URL", url.to_string()),
        ("UPSTASH_REDIS_REST_TOKEN", "upstash-token".to_string()),
        ("SUBSCRIPTION_KEY", "sub-key".to_string()),
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("GCP_CREDENTIALS_JSON", r#"{"installed":{}}"#.to_string()),
    ]);
    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

/// Last write wins under the meeting key
#[tokio::test]
async fn test_record_link_overwrites() {
    let mock_redis = MockRedis::new();

    record_link(&mock_redis, "https://calendar.test/first")
        .await
        .unwrap();
    record_link(&mock_redis, "https://calendar.test/second")
        .await
        .unwrap();

    assert_eq!(mock_redis.writes().await, 2);
    assert_eq!(
        mock_redis.get(keys::MEETING_LINK).await.unwrap().as_deref(),
        Some("https://calendar.test/second")
    );
}

#[tokio::test]
async fn test_record_link_surfaces_store_errors() {
    let err = record_link(&MockRedis::offline(), "https://calendar.test/x")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}

/// `connect` picks the REST store for http(s) URLs
#[tokio::test]
async fn test_connect_uses_upstash_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/set/meeting_link"))
        .and(header("authorization", "Bearer upstash-token"))
        .and(body_string("https://calendar.test/evt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = link_store::connect(&config_for(&server.uri())).unwrap();
    record_link(store.as_ref(), "https://calendar.test/evt")
        .await
        .unwrap();
}

#[test]
fn test_connect_rejects_unknown_scheme() {
    let err = link_store::connect(&config_for("ftp://example.com")).err().unwrap();
    assert!(matches!(err, meetsched::error::Error::Config(_)));
}
