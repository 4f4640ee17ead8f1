//! Remote key-value store holding the latest meeting link.
//!
//! Upstash is reached over its REST API; plain Redis servers through the
//! `redis` crate. Writes overwrite unconditionally.

mod memory;
mod redis_store;
mod upstash;

pub use memory::MemoryLinkStore;
pub use redis_store::RedisLinkStore;
pub use upstash::UpstashLinkStore;

use crate::config::Config;
use crate::error::{config_error, BotResult};
use async_trait::async_trait;
use tracing::info;
use url::Url;

// Key constants
pub mod keys {
    pub const MEETING_LINK: &str = "meeting_link";
}

/// Minimal get/set surface of a key-value store
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> BotResult<()>;
    async fn get(&self, key: &str) -> BotResult<Option<String>>;
}

/// Store the link under the fixed meeting key
pub async fn record_link(store: &dyn LinkStore, link: &str) -> BotResult<()> {
    store.set(keys::MEETING_LINK, link).await?;
    info!("Recorded meeting link under '{}'", keys::MEETING_LINK);
    Ok(())
}

/// Pick a store implementation from the configured URL scheme
pub fn connect(config: &Config) -> BotResult<Box<dyn LinkStore>> {
    let url = Url::parse(&config.redis_url)
        .map_err(|e| config_error(&format!("Invalid UPSTASH_REDIS_REST_URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(Box::new(UpstashLinkStore::new(
            config.http_client()?,
            &config.redis_url,
            &config.redis_token,
        ))),
        "redis" => Ok(Box::new(RedisLinkStore::new(url, &config.redis_token)?)),
        other => Err(config_error(&format!(
            "Unsupported key-value store scheme: {}",
            other
        ))),
    }
}
