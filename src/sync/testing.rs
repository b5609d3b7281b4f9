use crate::core::data::{NewPrompt, Prompt, PromptPatch};
use crate::core::traits::RemoteStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Remote double that keeps its collection in memory
#[derive(Default)]
pub struct MemoryRemote {
    prompts: Mutex<Vec<Prompt>>,
    failing: AtomicBool,
    next_id: AtomicUsize,
    create_delay: Duration,
}

impl MemoryRemote {
    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts: Mutex::new(prompts),
            ..Self::default()
        }
    }

    /// Hold every `create` for `delay` before it lands
    pub fn with_create_delay(delay: Duration) -> Self {
        Self {
            create_delay: delay,
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Vec<Prompt> {
        self.prompts.lock().await.clone()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn list(&self, limit: usize) -> AppResult<Vec<Prompt>> {
        self.check()?;
        Ok(self.prompts.lock().await.iter().take(limit).cloned().collect())
    }

    async fn create(&self, prompt: &NewPrompt) -> AppResult<Prompt> {
        self.check()?;
        let mut created = prompt.clone().into_prompt(Utc::now());
        created.id = format!("remote-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        self.prompts.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &PromptPatch) -> AppResult<Prompt> {
        self.check()?;
        let mut prompts = self.prompts.lock().await;
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Remote prompt '{}'", id)))?;
        prompt.apply(patch, Utc::now());
        Ok(prompt.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.check()?;
        let mut prompts = self.prompts.lock().await;
        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            return Err(AppError::NotFound(format!("Remote prompt '{}'", id)));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
