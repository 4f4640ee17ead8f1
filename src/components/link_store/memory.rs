use super::LinkStore;
use crate::error::BotResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryLinkStore {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.lock().await.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn set(&self, key: &str, value: &str) -> BotResult<()> {
        let mut data = self.data.lock().await;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> BotResult<Option<String>> {
        let data = self.data.lock().await;
        Ok(data.get(key).cloned())
    }
}
