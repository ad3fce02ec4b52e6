//! Episode catalog
//!
//! Read-only episode records, loaded once at startup from either a local JSON
//! file or a hosted PostgREST table. Episodes are kept newest first by
//! `published_date`.

pub mod links;

pub use links::{TranscriptDownloads, TranscriptLinks};

use crate::error::{Error, Result};
use podplay_common::config::CatalogConfig;
use podplay_common::{Episode, EpisodeId};
use std::cmp::Ordering;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// In-memory episode catalog
#[derive(Debug, Clone, Default)]
pub struct EpisodeCatalog {
    episodes: Vec<Episode>,
}

impl EpisodeCatalog {
    pub fn from_episodes(mut episodes: Vec<Episode>) -> Self {
        episodes.sort_by(newest_first);
        Self { episodes }
    }

    /// Load a JSON array of episode records
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let episodes: Vec<Episode> = serde_json::from_str(&content)?;
        info!("Loaded {} episodes from {}", episodes.len(), path.display());
        Ok(Self::from_episodes(episodes))
    }

    /// Fetch every row of a hosted episode table
    pub async fn fetch_remote(base_url: &str, api_key: Option<&str>, table: &str) -> Result<Self> {
        let url = rest_url(base_url, table)?;
        debug!(url = %url, "Fetching episode catalog");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut request = client.get(url);
        if let Some(key) = api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Catalog(format!(
                "Catalog request returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let episodes: Vec<Episode> = response.json().await?;
        info!("Fetched {} episodes from {}", episodes.len(), base_url);
        Ok(Self::from_episodes(episodes))
    }

    /// Load according to configuration: local file first, then remote table
    pub async fn load(config: &CatalogConfig) -> Result<Self> {
        if let Some(path) = &config.path {
            return Self::load_file(path);
        }
        if let Some(url) = &config.url {
            return Self::fetch_remote(url, config.api_key.as_deref(), &config.table).await;
        }
        warn!("No catalog configured; serving an empty episode list");
        Ok(Self::default())
    }

    pub fn get(&self, id: &EpisodeId) -> Option<&Episode> {
        self.episodes.iter().find(|e| &e.id == id)
    }

    /// All episodes, newest first
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }
}

/// `{base}/rest/v1/{table}?select=*&order=published_date.desc`
fn rest_url(base_url: &str, table: &str) -> Result<url::Url> {
    let base = url::Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid catalog url '{}': {}", base_url, e)))?;
    let mut url = base
        .join(&format!("rest/v1/{}", table))
        .map_err(|e| Error::Config(format!("Invalid catalog table '{}': {}", table, e)))?;
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("order", "published_date.desc");
    Ok(url)
}

// ISO-8601 dates order lexicographically; undated episodes go last
fn newest_first(a: &Episode, b: &Episode) -> Ordering {
    match (&a.published_date, &b.published_date) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
