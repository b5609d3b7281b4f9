//! Write-behind saving of the prompt collection
//!
//! All saves go through one background task. Callers publish snapshots and
//! return immediately; the task always writes the newest snapshot, so a
//! burst of mutations collapses into a single write and the last write to
//! land is the final collection.

use crate::core::data::Prompt;
use crate::storage::PromptStore;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct Snapshot {
    version: u64,
    prompts: Arc<Vec<Prompt>>,
}

pub struct StoreWriter {
    snapshots: watch::Sender<Option<Snapshot>>,
    written: watch::Receiver<u64>,
    version: u64,
    task: JoinHandle<()>,
}

impl StoreWriter {
    pub fn spawn(store: PromptStore, handle: &Handle) -> Self {
        let (snapshots, rx) = watch::channel(None);
        let (written_tx, written) = watch::channel(0);
        let task = handle.spawn(run(store, rx, written_tx));

        Self {
            snapshots,
            written,
            version: 0,
            task,
        }
    }

    /// Queue `prompts` for saving without waiting for the write
    pub fn save(&mut self, prompts: &[Prompt]) {
        self.version += 1;
        self.snapshots.send_replace(Some(Snapshot {
            version: self.version,
            prompts: Arc::new(prompts.to_vec()),
        }));
    }

    /// Wait until every queued snapshot has been attempted
    pub async fn flush(&self) {
        let target = self.version;
        let mut written = self.written.clone();
        if written.wait_for(|v| *v >= target).await.is_err() {
            warn!(version = target, "store writer stopped before flushing");
        }
    }

    /// Flush, then stop the background task
    pub async fn close(self) {
        let StoreWriter { snapshots, task, .. } = self;
        drop(snapshots);
        if let Err(e) = task.await {
            warn!(error = %e, "store writer task failed");
        }
    }
}

async fn run(
    store: PromptStore,
    mut snapshots: watch::Receiver<Option<Snapshot>>,
    written: watch::Sender<u64>,
) {
    while snapshots.changed().await.is_ok() {
        let latest = {
            let current = snapshots.borrow_and_update();
            current
                .as_ref()
                .map(|s| (s.version, Arc::clone(&s.prompts)))
        };
        let Some((version, prompts)) = latest else {
            continue;
        };

        match store.save_prompts(&prompts).await {
            Ok(()) => debug!(version, count = prompts.len(), "saved prompt collection"),
            // The in-memory collection stays authoritative
            Err(e) => warn!(version, error = %e, "failed to save prompt collection"),
        }
        written.send_replace(version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::{Category, NewPrompt};
    use crate::core::traits::{KeyValueStore, StoreKey};
    use crate::storage::MemoryStore;
    use crate::utils::error::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::Utc;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: StoreKey) -> AppResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn put(&self, _key: StoreKey, _value: Vec<u8>) -> AppResult<()> {
            Err(AppError::Persistence("disk full".to_string()))
        }
    }

    fn prompt(title: &str) -> Prompt {
        NewPrompt::new(title, "body", Category::Writing).into_prompt(Utc::now())
    }

    #[tokio::test]
    async fn test_burst_of_saves_coalesces() {
        let backend = Arc::new(MemoryStore::default());
        let store = PromptStore::new(backend.clone());
        let mut writer = StoreWriter::spawn(store.clone(), &Handle::current());

        let mut prompts = Vec::new();
        for title in ["a", "b", "c"] {
            prompts.push(prompt(title));
            writer.save(&prompts);
        }
        writer.flush().await;

        assert_eq!(backend.write_count(), 1);
        assert_eq!(store.load_prompts().await.unwrap(), prompts);
    }

    #[tokio::test]
    async fn test_later_save_wins() {
        let backend = Arc::new(MemoryStore::default());
        let store = PromptStore::new(backend.clone());
        let mut writer = StoreWriter::spawn(store.clone(), &Handle::current());

        writer.save(&[prompt("first")]);
        writer.flush().await;
        writer.save(&[]);
        writer.close().await;

        assert_eq!(backend.write_count(), 2);
        assert!(store.load_prompts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_does_not_block_flush() {
        let store = PromptStore::new(Arc::new(BrokenStore));
        let mut writer = StoreWriter::spawn(store, &Handle::current());

        writer.save(&[prompt("lost")]);
        writer.flush().await;
        writer.close().await;
    }

    #[tokio::test]
    async fn test_flush_without_saves_returns() {
        let store = PromptStore::new(Arc::new(MemoryStore::default()));
        let writer = StoreWriter::spawn(store, &Handle::current());
        writer.flush().await;
    }
}
