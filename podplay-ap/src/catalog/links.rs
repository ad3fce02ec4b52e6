//! Public download links for stored transcript documents

use podplay_common::config::StorageConfig;
use podplay_common::{Episode, Language};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Download link per language (None where no document is available)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptDownloads {
    pub en: Option<String>,
    pub fr: Option<String>,
}

/// Resolves stored document paths to public object-storage URLs
#[derive(Debug, Clone)]
pub struct TranscriptLinks {
    storage_base: Option<Url>,
    bucket: String,
}

impl TranscriptLinks {
    pub fn new(storage_base: Option<&str>, bucket: impl Into<String>) -> Self {
        let storage_base = storage_base.and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Invalid storage base url '{}': {}", raw, e);
                None
            }
        });
        Self {
            storage_base,
            bucket: bucket.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.base_url.as_deref(), config.transcript_bucket.clone())
    }

    /// `{storage_base}/storage/v1/object/public/{bucket}/{path}`
    ///
    /// Absolute http(s) URLs pass through. Blank paths, a missing storage
    /// base or an unbuildable URL yield None.
    pub fn resolve(&self, path: Option<&str>) -> Option<String> {
        let path = path.map(str::trim).filter(|p| !p.is_empty())?;

        if let Ok(url) = Url::parse(path) {
            if matches!(url.scheme(), "http" | "https") {
                return Some(url.into());
            }
        }

        let Some(base) = self.storage_base.as_ref() else {
            debug!("No storage base configured, cannot link {}", path);
            return None;
        };

        let mut url = base.clone();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments
                    .pop_if_empty()
                    .extend(["storage", "v1", "object", "public", self.bucket.as_str()])
                    .extend(path.trim_start_matches('/').split('/'));
            }
            Err(()) => {
                warn!("Error generating transcript URL for {}: base cannot hold a path", path);
                return None;
            }
        }
        Some(url.into())
    }

    /// Links for both languages of an episode
    pub fn downloads(&self, episode: &Episode) -> TranscriptDownloads {
        TranscriptDownloads {
            en: self.resolve(episode.transcript_path(Language::En)),
            fr: self.resolve(episode.transcript_path(Language::Fr)),
        }
    }
}
