//! The prompt library service
//!
//! `PromptLibrary` owns the in-memory collection. Mutations apply to it
//! immediately and return; saving and remote propagation happen in the
//! background. Build one at startup and pass it to whatever needs it.

use crate::config::Config;
use crate::core::data::{NewPrompt, Prompt, PromptPatch, PromptStats};
use crate::core::search::{ScoredPrompt, SearchEngine, SearchFilters};
use crate::core::traits::RemoteStore;
use crate::storage::{FileStore, PromptStore, StoreWriter};
use crate::sync::{self, SyncCoordinator, SyncState};
use crate::utils::error::AppResult;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct LibraryOptions {
    /// Upper bound on prompts fetched when sync is enabled
    pub remote_list_limit: usize,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            remote_list_limit: 500,
        }
    }
}

pub struct PromptLibrary {
    prompts: Vec<Prompt>,
    writer: StoreWriter,
    sync: SyncCoordinator,
}

impl PromptLibrary {
    /// Load the collection and sync state.
    ///
    /// Must run inside a tokio runtime; background work is spawned on it.
    pub async fn open(
        store: PromptStore,
        remote: Option<Arc<dyn RemoteStore>>,
        options: LibraryOptions,
    ) -> Self {
        let handle = Handle::current();
        let prompts = store.load_or_empty().await;
        let sync = SyncCoordinator::load(
            store.clone(),
            remote,
            options.remote_list_limit,
            handle.clone(),
        )
        .await;
        let writer = StoreWriter::spawn(store, &handle);

        debug!(
            count = prompts.len(),
            sync_enabled = sync.is_enabled(),
            "opened prompt library"
        );

        Self {
            prompts,
            writer,
            sync,
        }
    }

    /// Open the file-backed library described by `config`
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let store = PromptStore::new(Arc::new(FileStore::new(&config.general.data_dir)));
        let remote = sync::remote_from_config(config, &store).await?;
        let options = LibraryOptions {
            remote_list_limit: config.general.remote_list_limit,
        };
        Ok(Self::open(store, remote, options).await)
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.prompts.iter().position(|p| p.id == id)
    }

    fn persist(&mut self) {
        self.writer.save(&self.prompts);
    }

    pub fn create_prompt(&mut self, draft: NewPrompt) -> AppResult<Prompt> {
        draft.validate()?;

        let prompt = draft.into_prompt(Utc::now());
        self.prompts.push(prompt.clone());
        self.persist();
        self.sync.propagate_create(&prompt);

        debug!(id = %prompt.id, "created prompt");
        Ok(prompt)
    }

    /// Merge `patch` into the prompt with `id`; `Ok(None)` if there is none
    pub fn update_prompt(&mut self, id: &str, patch: PromptPatch) -> AppResult<Option<Prompt>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        patch.validate()?;

        let prompt = &mut self.prompts[index];
        prompt.apply(&patch, Utc::now());
        let updated = prompt.clone();

        self.persist();
        self.sync.propagate_update(id, patch);

        debug!(id, "updated prompt");
        Ok(Some(updated))
    }

    pub fn delete_prompt(&mut self, id: &str) -> Option<Prompt> {
        let index = self.position(id)?;
        let removed = self.prompts.remove(index);

        self.persist();
        self.sync.propagate_delete(id);

        debug!(id, "deleted prompt");
        Some(removed)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Option<Prompt> {
        let index = self.position(id)?;

        let prompt = &mut self.prompts[index];
        prompt.is_favorite = !prompt.is_favorite;
        prompt.touch(Utc::now());
        let toggled = prompt.clone();

        self.persist();
        self.sync
            .propagate_update(id, PromptPatch::favorite(toggled.is_favorite));

        Some(toggled)
    }

    pub fn search(&self, filters: &SearchFilters) -> Vec<ScoredPrompt<'_>> {
        SearchEngine::search(&self.prompts, filters, Utc::now())
    }

    pub fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
        SearchEngine::suggestions(&self.prompts, partial, limit)
    }

    pub fn all_tags(&self) -> Vec<String> {
        self.prompts
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> PromptStats {
        PromptStats::from_prompts(&self.prompts)
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.sync.is_enabled()
    }

    pub fn remote_name(&self) -> Option<&'static str> {
        self.sync.remote_name()
    }

    /// Enable sync; on a successful fetch the remote collection replaces
    /// the local one. Returns whether local state was replaced.
    pub async fn enable_sync(&mut self) -> AppResult<bool> {
        let Some(remote_prompts) = self.sync.enable().await? else {
            return Ok(false);
        };

        debug!(
            discarded = self.prompts.len(),
            fetched = remote_prompts.len(),
            "replacing local prompts with remote collection"
        );
        self.prompts = remote_prompts;
        self.persist();
        Ok(true)
    }

    pub async fn disable_sync(&mut self) {
        self.sync.disable().await;
    }

    /// Wait until the latest collection has been handed to the store
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Wait for in-flight propagation and pending saves
    pub async fn settle(&mut self) {
        self.sync.drain().await;
        self.writer.flush().await;
    }

    pub async fn shutdown(mut self) {
        self.sync.drain().await;
        self.writer.close().await;
    }
}
