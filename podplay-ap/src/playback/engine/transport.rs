//! Transport commands for PlaybackEngine
//!
//! **Responsibilities:**
//! - load / toggle / seek / volume / rate / close
//! - Settling asynchronous starts and discarding stale completions
//! - Classifying start rejections (aborted, unsupported, other)
//!
//! None of these return errors. Failures become session state.

use super::core::{EngineInner, StartAttempt};
use super::PlaybackEngine;
use crate::media::StartRejection;
use podplay_common::events::{PlayerEvent, TransportState};
use podplay_common::Episode;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// How a start/resume attempt settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// Handle confirmed playback; transport is Playing
    Playing,
    /// A newer command replaced this attempt before it settled
    Superseded,
    /// Platform aborted the start; state left untouched
    ///
    /// A load aborted this way stays `Loading` until the next command
    /// (toggle, load or close) moves it on.
    Aborted,
    /// Start rejected; transport is Errored
    Failed,
}

/// Result of `toggle_play`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "start", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Nothing loaded
    NoEpisode,
    Paused,
    /// Resumed the bound source
    Resumed(StartOutcome),
    /// Handle was in error; the episode was loaded again from scratch
    Reloaded(StartOutcome),
}

/// Result of `load`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "result", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Episode had no playable source; nothing was bound
    MissingSource,
    /// Episode was already active; toggled instead of restarting
    Toggled(ToggleOutcome),
    /// New source bound and started
    Loaded(StartOutcome),
}

impl PlaybackEngine {
    /// Load an episode and start it
    ///
    /// Loading the episode that is already active (and not in error) toggles
    /// play/pause instead of restarting it. An episode without a playable
    /// source is reported as missing and leaves the current episode alone.
    pub async fn load(&self, episode: &Episode) -> LoadOutcome {
        let mut inner = self.inner.lock().await;

        if inner.session.is_active(&episode.id) && !inner.in_error() {
            drop(inner);
            return LoadOutcome::Toggled(self.toggle_play().await);
        }

        let Some(uri) = self.resolve_source(episode) else {
            warn!("Audio URL is missing for episode: {}", episode.title);
            let old_transport = inner.session.transport;
            inner.session.missing_source = Some(episode.id.clone());
            self.channels.emit(PlayerEvent::MissingSource {
                episode_id: episode.id.clone(),
                title: episode.title.clone(),
                timestamp: chrono::Utc::now(),
            });
            self.commit(&inner, old_transport);
            return LoadOutcome::MissingSource;
        };

        let attempt = self.bind_locked(&mut inner, episode, uri);
        drop(inner);

        LoadOutcome::Loaded(self.settle_start(attempt).await)
    }

    /// Pause when playing, resume when paused
    ///
    /// A pending start (Loading) is cancelled like a pause. When the handle
    /// is in error the current episode is loaded again rather than resumed.
    pub async fn toggle_play(&self) -> ToggleOutcome {
        let mut inner = self.inner.lock().await;

        let Some(episode) = inner.session.active_episode.clone() else {
            debug!("Toggle ignored: no active episode");
            return ToggleOutcome::NoEpisode;
        };

        if inner.in_error() {
            warn!("Cannot resume: player is in error state. Reloading episode.");
            let Some(uri) = inner.source.clone().or_else(|| self.resolve_source(&episode)) else {
                return ToggleOutcome::NoEpisode;
            };
            let attempt = self.bind_locked(&mut inner, &episode, uri);
            drop(inner);
            return ToggleOutcome::Reloaded(self.settle_start(attempt).await);
        }

        match inner.session.transport {
            TransportState::Playing | TransportState::Loading => {
                self.pause_locked(&mut inner);
                ToggleOutcome::Paused
            }
            TransportState::Paused | TransportState::Idle | TransportState::Errored => {
                debug!("Resuming {}", episode.title);
                let attempt = StartAttempt {
                    binding: inner.binding,
                    epoch: inner.epoch,
                    future: inner.handle.play(),
                };
                drop(inner);
                ToggleOutcome::Resumed(self.settle_start(attempt).await)
            }
        }
    }

    fn pause_locked(&self, inner: &mut EngineInner) {
        let old_transport = inner.session.transport;
        inner.handle.pause();
        inner.epoch += 1;
        inner.session.transport = TransportState::Paused;
        inner.session.buffering = false;
        info!("Playback paused: {}", inner.title());
        self.commit(inner, old_transport);
    }

    /// Await a start and apply its result if it is still current
    async fn settle_start(&self, attempt: StartAttempt) -> StartOutcome {
        let StartAttempt {
            binding,
            epoch,
            future,
        } = attempt;
        let result = future.await;

        let mut inner = self.inner.lock().await;
        if inner.binding != binding || inner.epoch != epoch {
            debug!(
                "Discarding stale start (binding {} epoch {}, now binding {} epoch {})",
                binding, epoch, inner.binding, inner.epoch
            );
            return StartOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                let old_transport = inner.session.transport;
                inner.session.transport = TransportState::Playing;
                self.commit(&inner, old_transport);
                StartOutcome::Playing
            }
            Err(StartRejection::Aborted) => {
                debug!("Start aborted for {}", inner.title());
                StartOutcome::Aborted
            }
            Err(StartRejection::NotSupported(message)) => {
                warn!(
                    "Playback not supported for: {}. Check audio URL. ({})",
                    inner.title(),
                    message
                );
                warn!("Failed URL: {}", inner.source_uri());
                self.fail_locked(&mut inner, None, message);
                StartOutcome::Failed
            }
            Err(StartRejection::Other(message)) => {
                error!("Play failed for {}: {}", inner.title(), message);
                self.fail_locked(&mut inner, None, message);
                StartOutcome::Failed
            }
        }
    }

    /// Seek to `target` seconds
    ///
    /// Non-finite targets are rejected. The target is clamped into
    /// `[0, duration]` (an unknown duration clamps everything to 0) and the
    /// session position is updated immediately. Returns the applied position.
    pub async fn seek(&self, target: f64) -> Option<f64> {
        if !target.is_finite() {
            debug!("Seek ignored: non-finite target");
            return None;
        }
        let mut inner = self.inner.lock().await;
        self.seek_locked(&mut inner, target)
    }

    /// Seek relative to the current position
    pub async fn skip(&self, delta: f64) -> Option<f64> {
        if !delta.is_finite() {
            return None;
        }
        let mut inner = self.inner.lock().await;
        let target = inner.session.position + delta;
        self.seek_locked(&mut inner, target)
    }

    fn seek_locked(&self, inner: &mut EngineInner, target: f64) -> Option<f64> {
        inner.session.active_episode.as_ref()?;

        let upper = if inner.session.duration.is_finite() && inner.session.duration > 0.0 {
            inner.session.duration
        } else {
            0.0
        };
        let clamped = target.clamp(0.0, upper);

        inner.handle.set_position(clamped);
        inner.session.position = clamped;
        self.commit(inner, inner.session.transport);
        Some(clamped)
    }

    /// Set output volume, clamped to [0, 1]
    ///
    /// Retained while nothing is bound and re-applied on the next bind.
    pub async fn set_volume(&self, volume: f64) -> Option<f64> {
        if !volume.is_finite() {
            debug!("Volume ignored: non-finite value");
            return None;
        }
        let clamped = volume.clamp(0.0, 1.0);
        let mut inner = self.inner.lock().await;
        inner.handle.set_volume(clamped);
        inner.session.volume = clamped;
        self.commit(&inner, inner.session.transport);
        Some(clamped)
    }

    /// Set playback rate
    ///
    /// Any positive finite multiplier is passed through unchanged.
    pub async fn set_rate(&self, rate: f64) -> Option<f64> {
        if !rate.is_finite() || rate <= 0.0 {
            debug!("Rate ignored: {} is not a positive multiplier", rate);
            return None;
        }
        let mut inner = self.inner.lock().await;
        inner.handle.set_rate(rate);
        inner.session.rate = rate;
        self.commit(&inner, inner.session.transport);
        Some(rate)
    }

    /// Stop, rewind and detach the source; clear the active episode
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        let old_transport = inner.session.transport;

        inner.handle.pause();
        inner.handle.set_position(0.0);
        inner.handle.unbind();

        inner.binding = 0;
        inner.epoch += 1;
        inner.faulted = false;
        inner.source = None;

        inner.session.active_episode = None;
        inner.session.transport = TransportState::Idle;
        inner.session.position = 0.0;
        inner.session.duration = 0.0;
        inner.session.buffering = false;
        inner.session.missing_source = None;

        info!("Player closed");
        self.commit(&inner, old_transport);
    }
}
