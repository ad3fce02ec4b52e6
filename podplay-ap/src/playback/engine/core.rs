//! Core playback engine - construction and state bookkeeping
//!
//! **Responsibilities:**
//! - PlaybackEngine struct definition and initialization
//! - Exclusive ownership of the media handle
//! - Binding/epoch counters used to recognise stale completions and events
//! - Committing session mutations (one publish per discrete event)

use crate::media::{BindingId, BoundSource, MediaHandle, StartFuture};
use crate::state::SessionChannels;
use podplay_common::config::TomlConfig;
use podplay_common::events::{
    PlaybackSession, PlayerEvent, TransportState, DEFAULT_RATE, DEFAULT_VOLUME,
};
use podplay_common::source::SourceNormalizer;
use podplay_common::Episode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub normalizer: SourceNormalizer,
    pub initial_volume: f64,
    pub initial_rate: f64,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            normalizer: SourceNormalizer::default(),
            initial_volume: DEFAULT_VOLUME,
            initial_rate: DEFAULT_RATE,
            event_capacity: 100,
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            normalizer: SourceNormalizer::new(config.source.direct_download_hosts.iter().cloned()),
            initial_volume: config.playback.initial_volume,
            initial_rate: config.playback.initial_rate,
            event_capacity: config.events.capacity,
        }
    }
}

/// Start/resume in flight, tagged with the binding and epoch it was issued
/// under. Its completion is applied only if both are still current.
pub(super) struct StartAttempt {
    pub(super) binding: BindingId,
    pub(super) epoch: u64,
    pub(super) future: StartFuture,
}

/// Mutable engine state, guarded by one lock that is never held across the
/// start future.
pub(super) struct EngineInner {
    pub(super) handle: Box<dyn MediaHandle>,
    pub(super) session: PlaybackSession,
    /// Normalized source currently bound
    pub(super) source: Option<String>,
    /// Current binding (0 = nothing bound)
    pub(super) binding: BindingId,
    pub(super) last_binding: BindingId,
    /// Bumped by every command that invalidates pending starts
    pub(super) epoch: u64,
    /// Handle reported a non-benign fault for the current binding
    pub(super) faulted: bool,
}

impl EngineInner {
    /// Whether the next play request must re-load instead of resuming
    pub(super) fn in_error(&self) -> bool {
        self.faulted
            || self.session.transport == TransportState::Errored
            || self.handle.has_error()
    }

    pub(super) fn title(&self) -> String {
        self.session
            .active_episode
            .as_ref()
            .map(|e| e.title.clone())
            .unwrap_or_default()
    }

    pub(super) fn source_uri(&self) -> String {
        self.source.clone().unwrap_or_default()
    }
}

/// Playback engine - sole owner of the media handle
///
/// All session mutations go through this type; the session store and UI
/// consumers only read snapshots.
pub struct PlaybackEngine {
    pub(super) inner: Mutex<EngineInner>,
    pub(super) channels: Arc<SessionChannels>,
    pub(super) normalizer: SourceNormalizer,
}

impl PlaybackEngine {
    /// Create a new engine owning `handle`
    pub fn new(mut handle: Box<dyn MediaHandle>, settings: EngineSettings) -> Self {
        let mut session = PlaybackSession::default();
        if settings.initial_volume.is_finite() {
            session.volume = settings.initial_volume.clamp(0.0, 1.0);
        } else {
            warn!("Ignoring non-finite initial volume");
        }
        if settings.initial_rate.is_finite() && settings.initial_rate > 0.0 {
            session.rate = settings.initial_rate;
        } else {
            warn!("Ignoring invalid initial rate {}", settings.initial_rate);
        }

        handle.set_volume(session.volume);
        handle.set_rate(session.rate);

        info!(
            "Creating playback engine (volume {:.2}, rate {}x)",
            session.volume, session.rate
        );

        let channels = Arc::new(SessionChannels::new(settings.event_capacity, session.clone()));

        Self {
            inner: Mutex::new(EngineInner {
                handle,
                session,
                source: None,
                binding: 0,
                last_binding: 0,
                epoch: 0,
                faulted: false,
            }),
            channels,
            normalizer: settings.normalizer,
        }
    }

    /// Publication channels shared with the session store
    pub fn channels(&self) -> Arc<SessionChannels> {
        Arc::clone(&self.channels)
    }

    /// Current session snapshot
    pub async fn session(&self) -> PlaybackSession {
        self.inner.lock().await.session.clone()
    }

    /// Normalize an episode's audio source (None = missing source)
    pub fn resolve_source(&self, episode: &Episode) -> Option<String> {
        episode
            .audio_source()
            .and_then(|raw| self.normalizer.normalize(raw))
    }

    /// Publish the session after a mutation
    ///
    /// Emits `TransportChanged` when the transport moved away from
    /// `old_transport`, then exactly one `SessionChanged`.
    pub(super) fn commit(&self, inner: &EngineInner, old_transport: TransportState) {
        let new_transport = inner.session.transport;
        if old_transport != new_transport {
            self.channels.emit(PlayerEvent::TransportChanged {
                old_state: old_transport,
                new_state: new_transport,
                timestamp: chrono::Utc::now(),
            });
        }
        self.channels.publish(&inner.session);
    }

    /// Tear down any previous binding and bind `episode` at `uri`.
    ///
    /// Resets position and duration, enters `Loading`, re-applies the retained
    /// volume and rate, and issues the start. The returned attempt must be
    /// awaited without holding the lock.
    pub(super) fn bind_locked(
        &self,
        inner: &mut EngineInner,
        episode: &Episode,
        uri: String,
    ) -> StartAttempt {
        let old_transport = inner.session.transport;

        if inner.binding != 0 {
            inner.handle.pause();
            inner.handle.unbind();
        }

        inner.last_binding += 1;
        inner.binding = inner.last_binding;
        inner.epoch += 1;
        inner.faulted = false;
        inner.source = Some(uri.clone());

        inner.session.active_episode = Some(episode.clone());
        inner.session.transport = TransportState::Loading;
        inner.session.position = 0.0;
        inner.session.duration = 0.0;
        inner.session.buffering = false;
        inner.session.missing_source = None;

        info!("Loading audio: {}", episode.title);
        info!("URL: {}", uri);

        inner.handle.bind(
            inner.binding,
            &BoundSource {
                uri: uri.clone(),
                duration_hint: episode.duration,
            },
        );
        inner.handle.set_rate(inner.session.rate);
        inner.handle.set_volume(inner.session.volume);

        self.channels.emit(PlayerEvent::EpisodeLoaded {
            episode_id: episode.id.clone(),
            title: episode.title.clone(),
            source: uri,
            timestamp: chrono::Utc::now(),
        });
        self.commit(inner, old_transport);

        StartAttempt {
            binding: inner.binding,
            epoch: inner.epoch,
            future: inner.handle.play(),
        }
    }

    /// Move to `Errored` and report the fault with episode and source context
    pub(super) fn fail_locked(&self, inner: &mut EngineInner, code: Option<u16>, message: String) {
        let old_transport = inner.session.transport;
        inner.session.transport = TransportState::Errored;
        inner.session.buffering = false;
        // Any start still pending for this binding is now meaningless
        inner.epoch += 1;

        if let Some(episode) = inner.session.active_episode.as_ref() {
            self.channels.emit(PlayerEvent::PlaybackFault {
                episode_id: episode.id.clone(),
                title: episode.title.clone(),
                source: inner.source.clone().unwrap_or_default(),
                code,
                message,
                timestamp: chrono::Utc::now(),
            });
        }
        self.commit(inner, old_transport);
    }
}
