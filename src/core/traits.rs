//! Core trait definitions for prompt management
//!
//! These traits are the seams between the in-memory library and the
//! outside world: durable key-value storage on one side, the optional
//! remote collaborator on the other.

use crate::core::data::{NewPrompt, Prompt, PromptPatch};
use crate::utils::error::AppResult;
use async_trait::async_trait;

/// Logical keys of the durable store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The ordered prompt collection
    Prompts,
    /// The persisted sync-enabled flag
    SyncEnabled,
    /// Local id to remote id mapping maintained by the sync layer
    RemoteIds,
    /// Id of the gist created on first sync write
    GistId,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Prompts => "prompts",
            StoreKey::SyncEnabled => "sync_enabled",
            StoreKey::RemoteIds => "remote_ids",
            StoreKey::GistId => "gist_id",
        }
    }
}

/// Durable key-value storage
///
/// Values are opaque blobs; the typed layer in `storage` decides the
/// encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, `None` if nothing was ever written
    async fn get(&self, key: StoreKey) -> AppResult<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`
    async fn put(&self, key: StoreKey, value: Vec<u8>) -> AppResult<()>;
}

/// Remote collaborator the sync layer mirrors mutations to
///
/// Every call either succeeds or fails; there is no finer error taxonomy.
/// Implementations assign ids on `create`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch up to `limit` prompts
    async fn list(&self, limit: usize) -> AppResult<Vec<Prompt>>;

    /// Create a prompt and return it with its remote id
    async fn create(&self, prompt: &NewPrompt) -> AppResult<Prompt>;

    /// Apply a partial update to the prompt with the given remote id
    async fn update(&self, id: &str, patch: &PromptPatch) -> AppResult<Prompt>;

    /// Remove the prompt with the given remote id
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}
