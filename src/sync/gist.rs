use super::get_github_token;
use crate::config::GistConfig;
use crate::core::data::{NewPrompt, Prompt, PromptPatch};
use crate::core::traits::RemoteStore;
use crate::storage::PromptStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::{handle_flow, FlowResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const GITHUB_API_BASE: &str = "https://api.github.com";
const GIST_DESCRIPTION: &str = "promptdeck prompts";

#[derive(Debug, Deserialize)]
struct Gist {
    id: String,
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateGistRequest {
    description: String,
    public: bool,
    files: HashMap<String, GistFileContent>,
}

#[derive(Debug, Serialize)]
struct GistFileContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct UpdateGistRequest {
    files: HashMap<String, GistFileContent>,
}

/// Keeps the whole collection as one JSON file inside a GitHub Gist.
///
/// Every mutation is a read-modify-write of that file, serialized by the
/// gist id lock so concurrent propagations cannot lose each other's edits.
/// A gist created here is remembered in the attached store so later runs
/// write to the same gist.
pub struct GistRemote {
    client: Client,
    config: GistConfig,
    access_token: String,
    gist_id: Mutex<Option<String>>,
    store: Option<PromptStore>,
}

impl GistRemote {
    pub fn new(config: GistConfig) -> AppResult<Self> {
        // Try to get access token from config first, then environment
        let access_token = config
            .access_token
            .clone()
            .or_else(get_github_token)
            .ok_or_else(|| {
                AppError::Config("GitHub access token not found. Set it in config or use PROMPTDECK_GITHUB_TOKEN environment variable".to_string())
            })?;

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("promptdeck/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            gist_id: Mutex::new(config.gist_id.clone()),
            config,
            access_token,
            store: None,
        })
    }

    /// Attach the store that remembers created gists. A configured
    /// `gist_id` wins over a remembered one.
    pub async fn with_store(mut self, store: PromptStore) -> Self {
        if self.config.gist_id.is_none()
            && let Some(id) = store.load_gist_id().await
        {
            debug!(gist_id = %id, "using stored gist id");
            *self.gist_id.get_mut() = Some(id);
        }
        self.store = Some(store);
        self
    }

    async fn remember_gist_id(&self, id: &str) {
        info!(gist_id = %id, "created gist");
        if let Some(store) = &self.store
            && let Err(e) = store.save_gist_id(id).await
        {
            warn!(gist_id = %id, error = %e, "failed to store gist id");
        }
        handle_flow(FlowResult::Success(format!(
            "Created gist {} for synced prompts (set gist_id in [gist] to share it across machines)",
            id
        )));
    }

    async fn get_gist(&self, gist_id: &str) -> AppResult<Gist> {
        let url = format!("{}/gists/{}", GITHUB_API_BASE, gist_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to fetch gist from GitHub: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Sync(format!(
                "Failed to get gist: {} - {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("Failed to parse gist response: {}", e)))
    }

    /// Large files come back truncated and must be fetched from `raw_url`
    async fn file_content(&self, file: &GistFile) -> AppResult<String> {
        match (&file.content, &file.raw_url) {
            (Some(content), _) if !file.truncated => Ok(content.clone()),
            (_, Some(raw_url)) => self
                .client
                .get(raw_url)
                .bearer_auth(&self.access_token)
                .send()
                .await
                .map_err(|e| AppError::Network(format!("Failed to fetch gist file: {}", e)))?
                .text()
                .await
                .map_err(|e| AppError::Network(format!("Failed to read gist file: {}", e))),
            (Some(content), None) => Ok(content.clone()),
            (None, None) => Ok(String::new()),
        }
    }

    async fn create_gist(&self, content: String) -> AppResult<String> {
        let url = format!("{}/gists", GITHUB_API_BASE);

        let mut files = HashMap::new();
        files.insert(self.config.file_name.clone(), GistFileContent { content });

        let request = CreateGistRequest {
            description: GIST_DESCRIPTION.to_string(),
            public: self.config.public,
            files,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to create gist: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Sync(format!(
                "Failed to create gist: {} - {}",
                status, error_text
            )));
        }

        let gist: Gist = response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("Failed to parse create gist response: {}", e)))?;

        Ok(gist.id)
    }

    async fn update_gist(&self, gist_id: &str, content: String) -> AppResult<()> {
        let url = format!("{}/gists/{}", GITHUB_API_BASE, gist_id);

        let mut files = HashMap::new();
        files.insert(self.config.file_name.clone(), GistFileContent { content });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&UpdateGistRequest { files })
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to update gist: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Sync(format!(
                "Failed to update gist: {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }

    async fn read_collection(&self, gist_id: Option<&str>) -> AppResult<Vec<Prompt>> {
        let Some(gist_id) = gist_id else {
            return Ok(Vec::new());
        };
        let gist = self.get_gist(gist_id).await?;
        let Some(file) = gist.files.get(&self.config.file_name) else {
            return Ok(Vec::new());
        };
        decode_collection(&self.file_content(file).await?)
    }

    async fn write_collection(&self, gist_id: &mut Option<String>, prompts: &[Prompt]) -> AppResult<()> {
        let content = serde_json::to_string_pretty(prompts)
            .map_err(|e| AppError::Sync(format!("Failed to serialize prompts: {}", e)))?;

        match gist_id {
            Some(id) => self.update_gist(id, content).await,
            None => {
                let id = self.create_gist(content).await?;
                self.remember_gist_id(&id).await;
                *gist_id = Some(id);
                Ok(())
            }
        }
    }
}

fn decode_collection(content: &str) -> AppResult<Vec<Prompt>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content)
        .map_err(|e| AppError::Sync(format!("Failed to parse gist content: {}", e)))
}

#[async_trait]
impl RemoteStore for GistRemote {
    async fn list(&self, limit: usize) -> AppResult<Vec<Prompt>> {
        let gist_id = self.gist_id.lock().await.clone();
        let mut prompts = self.read_collection(gist_id.as_deref()).await?;
        prompts.truncate(limit);
        Ok(prompts)
    }

    async fn create(&self, prompt: &NewPrompt) -> AppResult<Prompt> {
        let mut gist_id = self.gist_id.lock().await;
        let mut prompts = self.read_collection(gist_id.as_deref()).await?;

        let created = prompt.clone().into_prompt(Utc::now());
        prompts.push(created.clone());
        self.write_collection(&mut gist_id, &prompts).await?;

        Ok(created)
    }

    async fn update(&self, id: &str, patch: &PromptPatch) -> AppResult<Prompt> {
        let mut gist_id = self.gist_id.lock().await;
        let mut prompts = self.read_collection(gist_id.as_deref()).await?;

        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::Sync(format!("Prompt '{}' not found in gist", id)))?;
        prompt.apply(patch, Utc::now());
        let updated = prompt.clone();

        self.write_collection(&mut gist_id, &prompts).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut gist_id = self.gist_id.lock().await;
        let mut prompts = self.read_collection(gist_id.as_deref()).await?;

        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            return Err(AppError::Sync(format!("Prompt '{}' not found in gist", id)));
        }

        self.write_collection(&mut gist_id, &prompts).await
    }

    fn name(&self) -> &'static str {
        "gist"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::Category;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn config() -> GistConfig {
        GistConfig {
            file_name: "promptdeck.json".to_string(),
            access_token: Some("test".to_string()),
            gist_id: None,
            public: false,
        }
    }

    #[test]
    fn test_decode_collection() {
        assert!(decode_collection("").unwrap().is_empty());
        assert!(decode_collection("  \n").unwrap().is_empty());
        assert!(matches!(decode_collection("{"), Err(AppError::Sync(_))));

        let prompts = vec![NewPrompt::new("t", "c", Category::Business).into_prompt(Utc::now())];
        let json = serde_json::to_string(&prompts).unwrap();
        assert_eq!(decode_collection(&json).unwrap(), prompts);
    }

    #[test]
    fn test_gist_response_parsing() {
        let body = r#"{
            "id": "abc123",
            "files": {
                "promptdeck.json": {"content": "[]", "truncated": false, "raw_url": null}
            }
        }"#;
        let gist: Gist = serde_json::from_str(body).unwrap();
        assert_eq!(gist.id, "abc123");
        assert_eq!(gist.files["promptdeck.json"].content.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_list_without_gist_id_is_empty() {
        let client = GistRemote::new(config()).unwrap();
        assert!(client.list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_created_gist_id_is_reused_next_run() {
        let store = PromptStore::new(Arc::new(MemoryStore::default()));

        let first = GistRemote::new(config()).unwrap().with_store(store.clone()).await;
        assert_eq!(*first.gist_id.lock().await, None);
        first.remember_gist_id("new-gist").await;

        let second = GistRemote::new(config()).unwrap().with_store(store.clone()).await;
        assert_eq!(second.gist_id.lock().await.as_deref(), Some("new-gist"));
    }

    #[tokio::test]
    async fn test_configured_gist_id_wins_over_stored() {
        let store = PromptStore::new(Arc::new(MemoryStore::default()));
        store.save_gist_id("stored").await.unwrap();

        let configured = GistConfig {
            gist_id: Some("configured".to_string()),
            ..config()
        };
        let client = GistRemote::new(configured).unwrap().with_store(store).await;
        assert_eq!(client.gist_id.lock().await.as_deref(), Some("configured"));
    }
}
