use super::LinkStore;
use crate::error::{link_store_error, BotResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::info;
use url::Url;

/// Plain Redis server reached over the RESP protocol
pub struct RedisLinkStore {
    client: RedisClient,
}

impl RedisLinkStore {
    /// The token becomes the password unless the URL already has one
    pub fn new(mut url: Url, token: &str) -> BotResult<Self> {
        if url.password().is_none() && !token.is_empty() {
            url.set_password(Some(token))
                .map_err(|_| link_store_error("Cannot attach password to Redis URL"))?;
        }

        info!(
            "Using Redis at {}",
            url.host_str().unwrap_or("<unknown host>")
        );

        let client = RedisClient::open(url.as_str())
            .map_err(|e| link_store_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get_connection(&self) -> BotResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| link_store_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl LinkStore for RedisLinkStore {
    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        let mut conn = self.get_connection().await?;

        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| link_store_error(&format!("Redis SET error: {}", e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        let mut conn = self.get_connection().await?;

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| link_store_error(&format!("Redis GET error: {}", e)))?;

        Ok(value)
    }
}
