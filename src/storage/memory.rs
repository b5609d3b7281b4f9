use crate::core::traits::{KeyValueStore, StoreKey};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-process backend; contents live as long as the value
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Number of successful `put` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn put(&self, key: StoreKey, value: Vec<u8>) -> AppResult<()> {
        self.entries.lock().await.insert(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
