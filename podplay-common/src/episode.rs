//! Episode records as published by the hosted episode table
//!
//! The player only reads a handful of these fields (id, title, audio source,
//! duration hint, transcripts). The rest are carried so catalog listings can
//! be served without a second lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Episode identifier (row id in the episode table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EpisodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Transcript language
///
/// English is the primary locale of the show, French the secondary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// The other language of the pair (used by compact language toggles)
    pub fn other(self) -> Self {
        match self {
            Language::En => Language::Fr,
            Language::Fr => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(Error::InvalidInput(format!("unknown language '{}'", other))),
        }
    }
}

/// One podcast episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub published_date: Option<String>,
    /// Duration hint in seconds (editorial value, not measured)
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Primary audio source
    #[serde(default)]
    pub dropbox_audio_url: Option<String>,
    /// Legacy audio source, used only when the primary one is empty
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub guests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub transcript_en: Option<String>,
    #[serde(default)]
    pub transcript_fr: Option<String>,
    /// Stored path of the downloadable English transcript document
    #[serde(default)]
    pub transcript_en_path: Option<String>,
    /// Stored path of the downloadable French transcript document
    #[serde(default)]
    pub transcript_fr_path: Option<String>,
    #[serde(default)]
    pub show_notes: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Episode {
    /// Minimal episode with a title and audio source
    pub fn new(id: impl Into<String>, title: impl Into<String>, audio: impl Into<String>) -> Self {
        Self {
            id: EpisodeId::new(id),
            title: title.into(),
            description: String::new(),
            published_date: None,
            duration: 0.0,
            cover_image_url: None,
            dropbox_audio_url: Some(audio.into()),
            audio_url: None,
            hosts: Vec::new(),
            guests: Vec::new(),
            tags: Vec::new(),
            season_number: None,
            episode_number: None,
            transcript_en: None,
            transcript_fr: None,
            transcript_en_path: None,
            transcript_fr_path: None,
            show_notes: None,
        }
    }

    /// Raw (not yet normalized) audio source, if any
    pub fn audio_source(&self) -> Option<&str> {
        non_blank(self.dropbox_audio_url.as_ref()).or_else(|| non_blank(self.audio_url.as_ref()))
    }

    /// Full transcript text for a language
    pub fn transcript(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => non_blank(self.transcript_en.as_ref()),
            Language::Fr => non_blank(self.transcript_fr.as_ref()),
        }
    }

    /// Stored transcript document path for a language
    pub fn transcript_path(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => non_blank(self.transcript_en_path.as_ref()),
            Language::Fr => non_blank(self.transcript_fr_path.as_ref()),
        }
    }

    /// Short "Season X • Ep Y" label shown under the title
    pub fn numbering_label(&self) -> Option<String> {
        match (self.season_number, self.episode_number) {
            (Some(s), Some(e)) => Some(format!("Season {} • Ep {}", s, e)),
            (None, Some(e)) => Some(format!("Ep {}", e)),
            (Some(s), None) => Some(format!("Season {}", s)),
            (None, None) => None,
        }
    }
}
