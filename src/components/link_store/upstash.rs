use super::LinkStore;
use crate::error::{link_store_error, BotResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Upstash Redis over its REST API
#[derive(Clone)]
pub struct UpstashLinkStore {
    client: Client,
    base_url: String,
    token: String,
}

/// Every REST reply carries either a result or an error
#[derive(Debug, Deserialize)]
struct UpstashReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl UpstashLinkStore {
    pub fn new(client: Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    /// `{base}/{command}/{key}` with the key escaped as one segment
    fn command_url(&self, command: &str, key: &str) -> BotResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| link_store_error(&format!("Invalid Upstash URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| link_store_error("Upstash URL cannot be a base"))?
            .pop_if_empty()
            .extend([command, key]);
        Ok(url)
    }

    async fn read_reply(command: &str, response: Response) -> BotResult<Option<Value>> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            link_store_error(&format!("Failed to read Upstash {} reply: {}", command, e))
        })?;

        let reply: Option<UpstashReply> = serde_json::from_str(&body).ok();

        if let Some(error) = reply.as_ref().and_then(|r| r.error.clone()) {
            return Err(link_store_error(&format!(
                "Upstash {} failed: HTTP {} - {}",
                command, status, error
            )));
        }

        if !status.is_success() {
            return Err(link_store_error(&format!(
                "Upstash {} failed: HTTP {} - {}",
                command, status, body
            )));
        }

        let reply = reply.ok_or_else(|| {
            link_store_error(&format!("Unexpected Upstash {} reply: {}", command, body))
        })?;
        Ok(reply.result)
    }
}

#[async_trait]
impl LinkStore for UpstashLinkStore {
    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        let url = self.command_url("set", key)?;
        debug!("Upstash SET {}", key);

        // Value goes in the body so it does not need path escaping
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await
            .map_err(|e| link_store_error(&format!("Failed to reach Upstash: {}", e)))?;

        match Self::read_reply("SET", response).await? {
            Some(Value::String(ok)) if ok == "OK" => Ok(()),
            other => Err(link_store_error(&format!("Upstash SET returned {:?}", other))),
        }
    }

    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        let url = self.command_url("get", key)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| link_store_error(&format!("Failed to reach Upstash: {}", e)))?;

        match Self::read_reply("GET", response).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(other) => Ok(Some(other.to_string())),
        }
    }
}
