use crate::core::traits::{KeyValueStore, StoreKey};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: StoreKey) -> AppResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(&self, key: StoreKey, value: Vec<u8>) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Persistence(format!(
                "Failed to create data directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        // Write-then-rename: readers never see a partial file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to replace {}: {}", path.display(), e)))?;

        Ok(())
    }
}
