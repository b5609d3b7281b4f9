//! Durable storage for the prompt collection and sync settings
//!
//! `PromptStore` is the typed JSON layer; the bytes live in any
//! [`KeyValueStore`] backend. Loading is failure tolerant: a missing or
//! unreadable collection boots as empty rather than aborting startup.

pub mod file;
pub mod memory;
pub mod writer;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use writer::StoreWriter;

use crate::core::data::Prompt;
use crate::core::traits::{KeyValueStore, StoreKey};
use crate::utils::error::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct PromptStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PromptStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: StoreKey) -> AppResult<Option<T>> {
        let Some(bytes) = self.backend.get(key).await? else {
            return Ok(None);
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AppError::Persistence(format!("Failed to parse '{}': {}", key.as_str(), e)))
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| AppError::Persistence(format!("Failed to serialize '{}': {}", key.as_str(), e)))?;
        self.backend.put(key, bytes).await
    }

    /// Load the collection, surfacing read and parse failures
    pub async fn load_prompts(&self) -> AppResult<Vec<Prompt>> {
        Ok(self.read_json(StoreKey::Prompts).await?.unwrap_or_default())
    }

    /// Load the collection, degrading to an empty one on any failure
    pub async fn load_or_empty(&self) -> Vec<Prompt> {
        match self.load_prompts().await {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!(error = %e, "could not load prompt collection, starting empty");
                Vec::new()
            }
        }
    }

    pub async fn save_prompts(&self, prompts: &[Prompt]) -> AppResult<()> {
        self.write_json(StoreKey::Prompts, prompts).await
    }

    /// Persisted sync flag; anything unreadable counts as disabled
    pub async fn load_sync_enabled(&self) -> bool {
        match self.read_json::<bool>(StoreKey::SyncEnabled).await {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "could not read sync setting, treating sync as disabled");
                false
            }
        }
    }

    pub async fn save_sync_enabled(&self, enabled: bool) -> AppResult<()> {
        self.write_json(StoreKey::SyncEnabled, &enabled).await
    }

    pub async fn load_remote_ids(&self) -> HashMap<String, String> {
        match self.read_json(StoreKey::RemoteIds).await {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not read remote id map, starting fresh");
                HashMap::new()
            }
        }
    }

    pub async fn save_remote_ids(&self, ids: &HashMap<String, String>) -> AppResult<()> {
        self.write_json(StoreKey::RemoteIds, ids).await
    }

    pub async fn load_gist_id(&self) -> Option<String> {
        match self.read_json(StoreKey::GistId).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "could not read stored gist id");
                None
            }
        }
    }

    pub async fn save_gist_id(&self, id: &str) -> AppResult<()> {
        self.write_json(StoreKey::GistId, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::{Category, NewPrompt};
    use chrono::Utc;

    fn store() -> (Arc<MemoryStore>, PromptStore) {
        let backend = Arc::new(MemoryStore::default());
        (backend.clone(), PromptStore::new(backend))
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_fields() {
        let (_, store) = store();
        let now = Utc::now();
        let mut second = NewPrompt::new("Second", "two", Category::Design)
            .with_tags(["ui", "colors"])
            .into_prompt(now);
        second.is_favorite = true;
        let prompts = vec![
            NewPrompt::new("First", "one", Category::Writing).into_prompt(now),
            second,
        ];

        store.save_prompts(&prompts).await.unwrap();
        let loaded = store.load_prompts().await.unwrap();
        assert_eq!(loaded, prompts);

        store.save_prompts(&loaded).await.unwrap();
        assert_eq!(store.load_prompts().await.unwrap(), prompts);
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_collections_load_empty() {
        let (backend, store) = store();
        assert!(store.load_prompts().await.unwrap().is_empty());

        backend.put(StoreKey::Prompts, b"{not json".to_vec()).await.unwrap();
        assert!(matches!(store.load_prompts().await, Err(AppError::Persistence(_))));
        assert!(store.load_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_flag_defaults_to_disabled() {
        let (backend, store) = store();
        assert!(!store.load_sync_enabled().await);

        store.save_sync_enabled(true).await.unwrap();
        assert!(store.load_sync_enabled().await);

        backend.put(StoreKey::SyncEnabled, b"maybe".to_vec()).await.unwrap();
        assert!(!store.load_sync_enabled().await);
    }

    #[tokio::test]
    async fn test_remote_ids_round_trip() {
        let (_, store) = store();
        let ids = HashMap::from([("local".to_string(), "remote".to_string())]);
        store.save_remote_ids(&ids).await.unwrap();
        assert_eq!(store.load_remote_ids().await, ids);
    }
}
