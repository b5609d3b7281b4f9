use super::get_remote_api_key;
use crate::config::RemoteConfig;
use crate::core::data::{NewPrompt, Prompt, PromptPatch};
use crate::core::traits::RemoteStore;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

/// JSON REST collection at `{base_url}/prompts`
pub struct RestRemote {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestRemote {
    pub fn new(config: RemoteConfig) -> AppResult<Self> {
        let api_key = config.api_key.clone().or_else(get_remote_api_key);

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("promptdeck/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/prompts", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/prompts/{}", self.base_url, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Sync(format!(
                "Failed to {}: {} - {}",
                action, status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn list(&self, limit: usize) -> AppResult<Vec<Prompt>> {
        let request = self
            .client
            .get(self.collection_url())
            .query(&[("limit", limit)]);
        let response = self.send(request, "list remote prompts").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("Failed to parse prompt list: {}", e)))
    }

    async fn create(&self, prompt: &NewPrompt) -> AppResult<Prompt> {
        let request = self.client.post(self.collection_url()).json(prompt);
        let response = self.send(request, "create remote prompt").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("Failed to parse created prompt: {}", e)))
    }

    async fn update(&self, id: &str, patch: &PromptPatch) -> AppResult<Prompt> {
        let request = self.client.patch(self.item_url(id)).json(patch);
        let response = self.send(request, "update remote prompt").await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Sync(format!("Failed to parse updated prompt: {}", e)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let request = self.client.delete(self.item_url(id));
        self.send(request, "delete remote prompt").await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let remote = RestRemote::new(RemoteConfig {
            base_url: "https://example.com/api/".to_string(),
            api_key: Some("key".to_string()),
        })
        .unwrap();

        assert_eq!(remote.collection_url(), "https://example.com/api/prompts");
        assert_eq!(remote.item_url("abc"), "https://example.com/api/prompts/abc");
        assert_eq!(remote.api_key.as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails() {
        let remote = RestRemote::new(RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
        })
        .unwrap();

        assert!(remote.list(10).await.is_err());
    }
}
