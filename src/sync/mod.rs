//! Optional mirroring of the prompt collection to a remote service
//!
//! Consistency contract: the local collection is always authoritative for
//! the running session. While sync is enabled every local mutation is
//! propagated by its own background task; the caller never waits for it
//! and a failed propagation is logged and dropped. Propagations may land
//! in any order, except that an update or delete of a prompt whose create
//! is still in flight waits for that create. Enabling sync is remote-wins: the remote collection
//! replaces the local one, and nothing edited while sync was disabled is
//! pushed.

pub mod gist;
pub mod rest;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::core::data::{NewPrompt, Prompt, PromptPatch};
use crate::core::traits::RemoteStore;
use crate::storage::PromptStore;
use crate::utils::error::{AppError, AppResult};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub fn get_github_token() -> Option<String> {
    std::env::var("PROMPTDECK_GITHUB_TOKEN").ok().filter(|t| !t.is_empty())
}

pub fn get_remote_api_key() -> Option<String> {
    std::env::var("PROMPTDECK_REMOTE_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Build the remote collaborator named by the configuration, if any.
///
/// `store` holds state a remote keeps between runs, such as a created gist id.
pub async fn remote_from_config(
    config: &Config,
    store: &PromptStore,
) -> AppResult<Option<Arc<dyn RemoteStore>>> {
    match (&config.remote, &config.gist) {
        (Some(_), Some(_)) => Err(AppError::Config(
            "Configure either [remote] or [gist], not both".to_string(),
        )),
        (Some(remote), None) => Ok(Some(Arc::new(rest::RestRemote::new(remote.clone())?))),
        (None, Some(gist)) => {
            let remote = gist::GistRemote::new(gist.clone())?
                .with_store(store.clone())
                .await;
            Ok(Some(Arc::new(remote)))
        }
        (None, None) => Ok(None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Disabled,
    Enabled,
}

impl SyncState {
    pub fn is_enabled(&self) -> bool {
        *self == SyncState::Enabled
    }
}

type RemoteIds = Arc<Mutex<HashMap<String, String>>>;

/// Resolves to the remote id once an in-flight create lands.
/// Closed without a value when the create failed.
type PendingCreate = watch::Receiver<Option<String>>;

pub struct SyncCoordinator {
    remote: Option<Arc<dyn RemoteStore>>,
    store: PromptStore,
    state: SyncState,
    list_limit: usize,
    /// Local id -> remote id for prompts created here and mirrored later
    remote_ids: RemoteIds,
    /// Creates still in flight, keyed by local id
    pending: HashMap<String, PendingCreate>,
    tasks: JoinSet<()>,
    handle: Handle,
}

impl SyncCoordinator {
    /// Restore the persisted sync state
    pub async fn load(
        store: PromptStore,
        remote: Option<Arc<dyn RemoteStore>>,
        list_limit: usize,
        handle: Handle,
    ) -> Self {
        let state = if store.load_sync_enabled().await {
            SyncState::Enabled
        } else {
            SyncState::Disabled
        };
        if state.is_enabled() && remote.is_none() {
            warn!("sync is enabled but no remote is configured; mutations stay local");
        }
        let remote_ids = Arc::new(Mutex::new(store.load_remote_ids().await));

        Self {
            remote,
            store,
            state,
            list_limit,
            remote_ids,
            pending: HashMap::new(),
            tasks: JoinSet::new(),
            handle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    pub fn remote_name(&self) -> Option<&'static str> {
        self.remote.as_ref().map(|r| r.name())
    }

    /// Propagation tasks spawned and not yet reaped
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Switch to `Enabled` and fetch the remote collection.
    ///
    /// Returns the collection that must replace local state, or `None` when
    /// sync was already enabled or the fetch failed (local state stands).
    pub async fn enable(&mut self) -> AppResult<Option<Vec<Prompt>>> {
        let Some(remote) = self.remote.clone() else {
            return Err(AppError::Config(
                "No remote configured. Add a [remote] or [gist] section to the config".to_string(),
            ));
        };
        if self.is_enabled() {
            return Ok(None);
        }

        self.state = SyncState::Enabled;
        if let Err(e) = self.store.save_sync_enabled(true).await {
            warn!(error = %e, "failed to persist sync flag");
        }
        info!(remote = remote.name(), "sync enabled");

        match remote.list(self.list_limit).await {
            Ok(prompts) => {
                debug!(count = prompts.len(), "fetched remote collection");
                // Fetched records carry remote ids already
                let mut ids = self.remote_ids.lock().await;
                ids.clear();
                if let Err(e) = self.store.save_remote_ids(&ids).await {
                    warn!(error = %e, "failed to reset remote id map");
                }
                Ok(Some(prompts))
            }
            Err(e) => {
                warn!(remote = remote.name(), error = %e, "initial sync fetch failed, keeping local prompts");
                Ok(None)
            }
        }
    }

    /// Switch to `Disabled`; nothing is fetched or reconciled
    pub async fn disable(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.state = SyncState::Disabled;
        if let Err(e) = self.store.save_sync_enabled(false).await {
            warn!(error = %e, "failed to persist sync flag");
        }
        info!("sync disabled");
    }

    fn active_remote(&self) -> Option<Arc<dyn RemoteStore>> {
        if self.is_enabled() {
            self.remote.clone()
        } else {
            None
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        while self.tasks.try_join_next().is_some() {}
        self.pending
            .retain(|_, rx| rx.borrow().is_none() && rx.has_changed().is_ok());
        self.tasks.spawn_on(task, &self.handle);
    }

    /// Handle to wait on before touching `id` remotely
    fn pending_create(&self, id: &str) -> Option<PendingCreate> {
        self.pending.get(id).cloned()
    }

    pub fn propagate_create(&mut self, prompt: &Prompt) {
        let Some(remote) = self.active_remote() else {
            return;
        };
        let local_id = prompt.id.clone();
        let key = local_id.clone();
        let draft = NewPrompt {
            title: prompt.title.clone(),
            content: prompt.content.clone(),
            category: prompt.category,
            tags: prompt.tags.clone(),
            is_favorite: prompt.is_favorite,
        };
        let remote_ids = Arc::clone(&self.remote_ids);
        let store = self.store.clone();
        let (created_tx, created_rx) = watch::channel(None);

        self.spawn(async move {
            match remote.create(&draft).await {
                Ok(created) => {
                    if created.id != local_id {
                        // Saved under the lock so map snapshots land in order
                        let mut ids = remote_ids.lock().await;
                        ids.insert(local_id, created.id.clone());
                        if let Err(e) = store.save_remote_ids(&ids).await {
                            warn!(error = %e, "failed to persist remote id map");
                        }
                    }
                    created_tx.send_replace(Some(created.id));
                }
                Err(e) => {
                    warn!(remote = remote.name(), id = %local_id, error = %e, "failed to propagate create");
                }
            }
        });
        self.pending.insert(key, created_rx);
    }

    pub fn propagate_update(&mut self, id: &str, patch: PromptPatch) {
        let Some(remote) = self.active_remote() else {
            return;
        };
        let local_id = id.to_string();
        let remote_ids = Arc::clone(&self.remote_ids);
        let pending = self.pending_create(id);

        self.spawn(async move {
            let target = resolve(&remote_ids, pending, &local_id).await;
            if let Err(e) = remote.update(&target, &patch).await {
                warn!(remote = remote.name(), id = %local_id, error = %e, "failed to propagate update");
            }
        });
    }

    pub fn propagate_delete(&mut self, id: &str) {
        let Some(remote) = self.active_remote() else {
            return;
        };
        let local_id = id.to_string();
        let remote_ids = Arc::clone(&self.remote_ids);
        let store = self.store.clone();
        let pending = self.pending_create(id);

        self.spawn(async move {
            let target = resolve(&remote_ids, pending, &local_id).await;
            match remote.delete(&target).await {
                Ok(()) => {
                    let mut ids = remote_ids.lock().await;
                    if ids.remove(&local_id).is_some()
                        && let Err(e) = store.save_remote_ids(&ids).await
                    {
                        warn!(error = %e, "failed to persist remote id map");
                    }
                }
                Err(e) => {
                    warn!(remote = remote.name(), id = %local_id, error = %e, "failed to propagate delete");
                }
            }
        });
    }

    /// Wait for every in-flight propagation to finish
    pub async fn drain(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "sync task panicked");
            }
        }
    }
}

/// Remote id for `local_id`, after any create for it has landed
async fn resolve(remote_ids: &RemoteIds, pending: Option<PendingCreate>, local_id: &str) -> String {
    if let Some(mut created) = pending {
        // An error means the create failed; fall back to the local id
        let _ = created.wait_for(Option::is_some).await;
    }
    remote_ids
        .lock()
        .await
        .get(local_id)
        .cloned()
        .unwrap_or_else(|| local_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryRemote;
    use super::*;
    use crate::core::data::Category;
    use crate::core::traits::{KeyValueStore, StoreKey};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Backend whose next remote id write after `arm` stalls, so a later
    /// write can overtake it
    #[derive(Default)]
    struct StallingStore {
        inner: MemoryStore,
        armed: AtomicBool,
    }

    impl StallingStore {
        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KeyValueStore for StallingStore {
        async fn get(&self, key: StoreKey) -> AppResult<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: StoreKey, value: Vec<u8>) -> AppResult<()> {
            if key == StoreKey::RemoteIds && self.armed.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            self.inner.put(key, value).await
        }
    }

    async fn coordinator(remote: Option<Arc<MemoryRemote>>) -> (PromptStore, SyncCoordinator) {
        let store = PromptStore::new(Arc::new(MemoryStore::default()));
        let remote = remote.map(|r| r as Arc<dyn RemoteStore>);
        let sync = SyncCoordinator::load(store.clone(), remote, 100, Handle::current()).await;
        (store, sync)
    }

    fn local(title: &str) -> Prompt {
        NewPrompt::new(title, "body", Category::Writing).into_prompt(Utc::now())
    }

    #[tokio::test]
    async fn test_enable_without_remote_is_config_error() {
        let (_, mut sync) = coordinator(None).await;
        assert!(matches!(sync.enable().await, Err(AppError::Config(_))));
        assert!(!sync.is_enabled());
    }

    #[tokio::test]
    async fn test_enable_fetches_and_persists_flag() {
        let remote = Arc::new(MemoryRemote::with_prompts(vec![local("remote one")]));
        let (store, mut sync) = coordinator(Some(remote)).await;

        let fetched = sync.enable().await.unwrap().unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(store.load_sync_enabled().await);

        // Already enabled: no second fetch
        assert!(sync.enable().await.unwrap().is_none());

        sync.disable().await;
        assert!(!store.load_sync_enabled().await);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_sync_enabled() {
        let remote = Arc::new(MemoryRemote::default());
        remote.set_failing(true);
        let (_, mut sync) = coordinator(Some(remote)).await;

        assert!(sync.enable().await.unwrap().is_none());
        assert!(sync.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_sync_does_not_propagate() {
        let remote = Arc::new(MemoryRemote::default());
        let (_, mut sync) = coordinator(Some(remote.clone())).await;

        sync.propagate_create(&local("quiet"));
        sync.drain().await;
        assert!(remote.snapshot().await.is_empty());
        assert_eq!(sync.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_use_remote_ids() {
        let remote = Arc::new(MemoryRemote::default());
        let (store, mut sync) = coordinator(Some(remote.clone())).await;
        sync.enable().await.unwrap();

        let prompt = local("mirrored");
        sync.propagate_create(&prompt);
        sync.drain().await;

        let ids = store.load_remote_ids().await;
        let remote_id = ids.get(&prompt.id).cloned().unwrap();
        assert_ne!(remote_id, prompt.id);

        sync.propagate_update(&prompt.id, PromptPatch::favorite(true));
        sync.drain().await;
        let mirrored = remote.snapshot().await;
        assert_eq!(mirrored[0].id, remote_id);
        assert!(mirrored[0].is_favorite);

        sync.propagate_delete(&prompt.id);
        sync.drain().await;
        assert!(remote.snapshot().await.is_empty());
        assert!(store.load_remote_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_propagation_failures_are_swallowed() {
        let remote = Arc::new(MemoryRemote::default());
        let (_, mut sync) = coordinator(Some(remote.clone())).await;
        sync.enable().await.unwrap();
        remote.set_failing(true);

        let lost = local("lost");
        sync.propagate_create(&lost);
        sync.propagate_update(&lost.id, PromptPatch::favorite(true));
        sync.propagate_update("missing", PromptPatch::favorite(true));
        sync.propagate_delete("missing");
        sync.drain().await;

        assert!(remote.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_waits_for_slow_create() {
        let remote = Arc::new(MemoryRemote::with_create_delay(Duration::from_millis(50)));
        let (store, mut sync) = coordinator(Some(remote.clone())).await;
        sync.enable().await.unwrap();

        let prompt = local("slow");
        sync.propagate_create(&prompt);
        sync.propagate_update(&prompt.id, PromptPatch::favorite(true));
        sync.drain().await;

        let mirrored = remote.snapshot().await;
        assert_eq!(mirrored.len(), 1);
        assert!(mirrored[0].is_favorite);
        assert_eq!(store.load_remote_ids().await.get(&prompt.id), Some(&mirrored[0].id));
    }

    #[tokio::test]
    async fn test_delete_waits_for_slow_create() {
        let remote = Arc::new(MemoryRemote::with_create_delay(Duration::from_millis(50)));
        let (store, mut sync) = coordinator(Some(remote.clone())).await;
        sync.enable().await.unwrap();

        let prompt = local("short lived");
        sync.propagate_create(&prompt);
        sync.propagate_delete(&prompt.id);
        sync.drain().await;

        assert!(remote.snapshot().await.is_empty());
        assert!(store.load_remote_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_remote_id_saves_land_in_order() {
        let backend = Arc::new(StallingStore::default());
        let store = PromptStore::new(backend.clone());
        let remote: Arc<dyn RemoteStore> = Arc::new(MemoryRemote::default());
        let mut sync = SyncCoordinator::load(store.clone(), Some(remote), 100, Handle::current()).await;
        sync.enable().await.unwrap();
        backend.arm();

        let first = local("first");
        let second = local("second");
        sync.propagate_create(&first);
        sync.propagate_create(&second);
        sync.drain().await;

        let ids = store.load_remote_ids().await;
        assert_eq!(ids.len(), 2);
        assert!(ids.contains_key(&first.id));
        assert!(ids.contains_key(&second.id));
    }
}
