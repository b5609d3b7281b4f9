use crate::core::search::SortBy;
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gist: Option<GistConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub default_sort: SortBy,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_remote_list_limit")]
    pub remote_list_limit: usize,
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default = "default_true")]
    pub content_preview: bool,
}

/// REST collaborator exposing `{base_url}/prompts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistConfig {
    pub file_name: String,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub access_token: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub gist_id: Option<String>,
    #[serde(default)]
    pub public: bool,
}

fn default_suggestion_limit() -> usize {
    8
}

fn default_remote_list_limit() -> usize {
    500
}

fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptdeck");

        Self {
            data_dir,
            default_sort: SortBy::Relevance,
            suggestion_limit: default_suggestion_limit(),
            remote_list_limit: default_remote_list_limit(),
            color: true,
            content_preview: true,
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        Self::load_custom(&Self::config_file_path())
    }

    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
        }
        Ok(())
    }

    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.general.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory cannot be empty".to_string()));
        }

        if self.general.suggestion_limit == 0 {
            return Err(AppError::Config(
                "Suggestion limit must be at least 1".to_string(),
            ));
        }

        if self.remote.is_some() && self.gist.is_some() {
            return Err(AppError::Config(
                "Configure either [remote] or [gist], not both".to_string(),
            ));
        }

        if let Some(remote) = &self.remote {
            let url = remote.base_url.trim();
            if url.is_empty() {
                return Err(AppError::Config("Remote base URL cannot be empty".to_string()));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "Remote base URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if let Some(gist) = &self.gist {
            if gist.file_name.is_empty() {
                return Err(AppError::Config(
                    "Gist file name cannot be empty when gist sync is configured".to_string(),
                ));
            }

            // Validate file name has proper extension
            if !Path::new(&gist.file_name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            {
                return Err(AppError::Config(
                    "Gist file name should have .json extension".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_file_path())
    }

    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;

        Ok(())
    }

    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptdeck")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [general]
            data_dir = "/tmp/promptdeck"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.default_sort, SortBy::Relevance);
        assert_eq!(config.general.suggestion_limit, 8);
        assert_eq!(config.general.remote_list_limit, 500);
        assert!(config.general.color);
        assert!(config.remote.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_strings_read_as_none() {
        let config = Config::from_toml(
            r#"
            [general]
            data_dir = "/tmp/promptdeck"
            default_sort = "updated_at"

            [gist]
            file_name = "prompts.json"
            access_token = ""
            gist_id = "abc"
            "#,
        )
        .unwrap();

        let gist = config.gist.unwrap();
        assert_eq!(gist.access_token, None);
        assert_eq!(gist.gist_id.as_deref(), Some("abc"));
        assert_eq!(config.general.default_sort, SortBy::UpdatedAt);
    }

    #[test]
    fn test_validation_rules() {
        let mut config = Config::default();
        config.general.suggestion_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.remote = Some(RemoteConfig {
            base_url: "ftp://example.com".to_string(),
            api_key: None,
        });
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gist = Some(GistConfig {
            file_name: "prompts.toml".to_string(),
            access_token: None,
            gist_id: None,
            public: false,
        });
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.remote = Some(RemoteConfig {
            base_url: "https://example.com".to_string(),
            api_key: None,
        });
        config.gist = Some(GistConfig {
            file_name: "prompts.json".to_string(),
            access_token: None,
            gist_id: None,
            public: false,
        });
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_remote_only_config_uses_general_defaults() {
        let config = Config::from_toml(
            r#"
            [gist]
            file_name = "prompts.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.general, GeneralConfig::default());
        assert_eq!(config.gist.unwrap().file_name, "prompts.json");
        assert!(config.remote.is_none());
    }

    #[test]
    fn test_load_custom_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let created = Config::load_custom(&path).unwrap();
        assert!(path.exists());

        let reloaded = Config::load_custom(&path).unwrap();
        assert_eq!(created, reloaded);
    }
}
