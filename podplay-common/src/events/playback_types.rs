//! Playback-related type definitions
//!
//! Transport state and the published playback session snapshot.

use serde::{Deserialize, Serialize};

use crate::episode::{Episode, EpisodeId};

/// Transport state enumeration
///
/// Mutually exclusive lifecycle phase of the shared playback session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// No episode bound
    #[default]
    Idle,
    /// Source bound, start not yet resolved
    Loading,
    Playing,
    Paused,
    /// Source rejected or handle faulted; next play re-loads from scratch
    Errored,
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportState::Idle => write!(f, "idle"),
            TransportState::Loading => write!(f, "loading"),
            TransportState::Playing => write!(f, "playing"),
            TransportState::Paused => write!(f, "paused"),
            TransportState::Errored => write!(f, "errored"),
        }
    }
}

/// Default volume for a fresh session (full scale)
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Default playback rate
pub const DEFAULT_RATE: f64 = 1.0;

/// Playback rates offered by the player controls.
///
/// The engine accepts any positive rate; this list only drives menus.
pub const RATE_PRESETS: [f64; 3] = [1.0, 1.5, 2.0];

/// Snapshot of the shared playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Episode bound to the media handle, if any
    pub active_episode: Option<Episode>,
    pub transport: TransportState,
    /// Position in seconds, never above `duration` once duration is known
    pub position: f64,
    /// Duration in seconds, 0 until metadata resolves
    pub duration: f64,
    /// Volume in [0, 1]
    pub volume: f64,
    /// Playback-speed multiplier
    pub rate: f64,
    /// Handle stalled waiting for data while the transport is playing
    pub buffering: bool,
    /// Episode whose last load request had no playable source
    pub missing_source: Option<EpisodeId>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            active_episode: None,
            transport: TransportState::Idle,
            position: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
            rate: DEFAULT_RATE,
            buffering: false,
            missing_source: None,
        }
    }
}

impl PlaybackSession {
    pub fn active_id(&self) -> Option<&EpisodeId> {
        self.active_episode.as_ref().map(|e| &e.id)
    }

    pub fn is_active(&self, id: &EpisodeId) -> bool {
        self.active_id() == Some(id)
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }

    /// Spinner condition: start pending or handle buffering
    pub fn is_loading(&self) -> bool {
        self.transport == TransportState::Loading || self.buffering
    }

    /// Elapsed fraction in [0, 1], `None` while duration is unknown
    pub fn progress_fraction(&self) -> Option<f64> {
        if self.duration > 0.0 {
            Some((self.position / self.duration).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}
