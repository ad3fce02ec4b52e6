//! Audio source URI normalization
//!
//! File-sharing hosts serve an HTML preview page unless the link carries the
//! direct-download marker (`dl=1`). Binding the preview URL to a media handle
//! yields no playable byte stream, so every source goes through
//! [`SourceNormalizer::normalize`] before it is bound.

use tracing::debug;
use url::Url;

/// Query parameter carrying the download mode
pub const DOWNLOAD_PARAM: &str = "dl";

/// Rewrites share links of known file-sharing hosts into direct-download links
#[derive(Debug, Clone)]
pub struct SourceNormalizer {
    hosts: Vec<String>,
}

impl Default for SourceNormalizer {
    fn default() -> Self {
        Self::new(["dropbox.com"])
    }
}

impl SourceNormalizer {
    /// Create a normalizer for the given host names.
    ///
    /// A host matches itself and any of its subdomains (`dropbox.com` matches
    /// `www.dropbox.com`).
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.into().trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn is_sharing_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    }

    /// Normalize a raw audio source.
    ///
    /// Returns `None` when nothing playable remains (empty or blank input).
    /// Sources that are not absolute URLs, or that belong to other hosts, are
    /// returned trimmed but otherwise untouched.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(_) => return Some(trimmed.to_string()),
        };

        let sharing = url.host_str().map(|h| self.is_sharing_host(h)).unwrap_or(false);
        if !sharing {
            return Some(trimmed.to_string());
        }

        // Work on the raw segments so every other parameter keeps its exact bytes
        let marker = format!("{}=1", DOWNLOAD_PARAM);
        let mut segments: Vec<&str> = url
            .query()
            .unwrap_or("")
            .split('&')
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.contains(&marker.as_str()) {
            return Some(trimmed.to_string());
        }

        let mut found = false;
        for segment in segments.iter_mut() {
            let key = segment.split('=').next().unwrap_or("");
            if key == DOWNLOAD_PARAM {
                *segment = &marker;
                found = true;
            }
        }
        if !found {
            segments.push(&marker);
        }

        let query = segments.join("&");
        url.set_query(Some(&query));

        debug!("Normalized share link {} -> {}", trimmed, url);
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_marker_rewritten() {
        let normalizer = SourceNormalizer::new(["x.example"]);
        assert_eq!(
            normalizer.normalize("https://x.example/foo?dl=0").as_deref(),
            Some("https://x.example/foo?dl=1")
        );
    }

    #[test]
    fn test_marker_appended_when_absent() {
        let normalizer = SourceNormalizer::new(["x.example"]);
        assert_eq!(
            normalizer.normalize("https://x.example/foo").as_deref(),
            Some("https://x.example/foo?dl=1")
        );
        assert_eq!(
            normalizer.normalize("https://x.example/foo?rlkey=abc").as_deref(),
            Some("https://x.example/foo?rlkey=abc&dl=1")
        );
    }

    #[test]
    fn test_other_parameters_keep_their_bytes() {
        let normalizer = SourceNormalizer::new(["x.example"]);
        assert_eq!(
            normalizer
                .normalize("https://x.example/foo?name=a%20b&raw&t=~x&dl=0#t=30")
                .as_deref(),
            Some("https://x.example/foo?name=a%20b&raw&t=~x&dl=1#t=30")
        );
        assert_eq!(
            normalizer.normalize("https://x.example/foo?name=a%20b&raw&t=~x").as_deref(),
            Some("https://x.example/foo?name=a%20b&raw&t=~x&dl=1")
        );
    }

    #[test]
    fn test_direct_link_left_alone() {
        let normalizer = SourceNormalizer::default();
        let link = "https://www.dropbox.com/s/abc/ep.mp3?rlkey=k&dl=1";
        assert_eq!(normalizer.normalize(link).as_deref(), Some(link));
    }

    #[test]
    fn test_subdomains_match() {
        let normalizer = SourceNormalizer::default();
        assert_eq!(
            normalizer.normalize("https://www.dropbox.com/s/abc/ep.mp3?dl=0").as_deref(),
            Some("https://www.dropbox.com/s/abc/ep.mp3?dl=1")
        );
    }

    #[test]
    fn test_other_hosts_untouched() {
        let normalizer = SourceNormalizer::default();
        let link = "https://cdn.example/ep.mp3?dl=0";
        assert_eq!(normalizer.normalize(link).as_deref(), Some(link));
        // Not a subdomain match
        let lookalike = "https://notdropbox.com/ep.mp3";
        assert_eq!(normalizer.normalize(lookalike).as_deref(), Some(lookalike));
    }

    #[test]
    fn test_blank_is_missing() {
        let normalizer = SourceNormalizer::default();
        assert_eq!(normalizer.normalize(""), None);
        assert_eq!(normalizer.normalize("   \n"), None);
    }

    #[test]
    fn test_relative_paths_pass_through() {
        let normalizer = SourceNormalizer::default();
        assert_eq!(normalizer.normalize(" audio/ep1.mp3 ").as_deref(), Some("audio/ep1.mp3"));
    }
}
