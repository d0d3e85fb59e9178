//! One-day model list cache.
//!
//! A single JSON entry `{date, models}` on disk. The entry is only served on
//! the UTC date it was written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::models::ModelInfo;
use super::GeminiClient;
use crate::error::{ReaderError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    date: NaiveDate,
    models: Vec<ModelInfo>,
}

pub struct ModelCache {
    path: PathBuf,
}

impl ModelCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Cached models if the entry was written on `today`.
    pub fn get(&self, today: NaiveDate) -> Option<Vec<ModelInfo>> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(e) => e,
            Err(e) => {
                warn!("Ignoring unreadable model cache {}: {e}", self.path.display());
                return None;
            }
        };

        if entry.date == today {
            debug!("Model cache hit ({} models)", entry.models.len());
            Some(entry.models)
        } else {
            debug!("Model cache expired (written {})", entry.date);
            None
        }
    }

    pub fn put(&self, today: NaiveDate, models: &[ModelInfo]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let entry = CacheEntry {
            date: today,
            models: models.to_vec(),
        };
        let json = serde_json::to_string(&entry).map_err(|e| ReaderError::Cache(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl GeminiClient {
    /// Model list for `api_key`, served from `cache` when fresh.
    ///
    /// `refresh` drops the cached entry first.
    pub async fn cached_models(
        &self,
        cache: &ModelCache,
        api_key: &str,
        refresh: bool,
    ) -> Result<Vec<ModelInfo>> {
        let today = ModelCache::today();
        if refresh {
            cache.clear()?;
        } else if let Some(models) = cache.get(today) {
            return Ok(models);
        }

        let models = self.list_models(api_key).await?;
        if let Err(e) = cache.put(today, &models) {
            warn!("Failed to write model cache {}: {e}", cache.path().display());
        } else {
            info!("Cached {} models at {}", models.len(), cache.path().display());
        }
        Ok(models)
    }
}
