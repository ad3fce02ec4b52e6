//! Shared playback session
//!
//! [`SessionStore`] is the one session of the application. It is built once at
//! the composition root and handed to consumers by clone; there is no global
//! accessor, so a consumer without a store simply cannot be written.
//!
//! Publication happens through [`SessionChannels`]:
//! - `watch` channel holding the latest snapshot (reactive reads)
//! - `EventBus` broadcasting every event (SSE clients, observers)

use crate::playback::{LoadOutcome, PlaybackEngine, ToggleOutcome};
use podplay_common::events::{EventBus, PlaybackSession, PlayerEvent};
use podplay_common::Episode;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Outbound channels of the session (written only by the engine)
pub struct SessionChannels {
    snapshot_tx: watch::Sender<PlaybackSession>,
    bus: EventBus,
}

impl SessionChannels {
    pub fn new(capacity: usize, initial: PlaybackSession) -> Self {
        let (snapshot_tx, _) = watch::channel(initial);
        Self {
            snapshot_tx,
            bus: EventBus::new(capacity),
        }
    }

    /// Replace the snapshot and broadcast one `SessionChanged`
    pub fn publish(&self, session: &PlaybackSession) {
        self.snapshot_tx.send_replace(session.clone());
        self.bus.emit_lossy(PlayerEvent::SessionChanged {
            session: session.clone(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// Broadcast an annotation event (transport change, fault, ...)
    pub fn emit(&self, event: PlayerEvent) {
        self.bus.emit_lossy(event);
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.snapshot_tx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<PlaybackSession> {
        self.snapshot_tx.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.bus.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

/// Application-wide playback session
///
/// Reads come from the published snapshot; every command is forwarded to the
/// engine, which is the only writer.
#[derive(Clone)]
pub struct SessionStore {
    engine: Arc<PlaybackEngine>,
    channels: Arc<SessionChannels>,
}

impl SessionStore {
    pub fn new(engine: Arc<PlaybackEngine>) -> Self {
        let channels = engine.channels();
        Self { engine, channels }
    }

    pub fn engine(&self) -> &Arc<PlaybackEngine> {
        &self.engine
    }

    /// Latest published session
    pub fn snapshot(&self) -> PlaybackSession {
        self.channels.snapshot()
    }

    /// Reactive view of the session; changes after every mutation
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.channels.watch()
    }

    /// Stream of every session event
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.channels.events()
    }

    /// Load an episode, or toggle it when it is already the active one
    pub async fn load_and_toggle(&self, episode: &Episode) -> LoadOutcome {
        self.engine.load(episode).await
    }

    pub async fn toggle_play(&self) -> ToggleOutcome {
        self.engine.toggle_play().await
    }

    pub async fn seek(&self, seconds: f64) -> Option<f64> {
        self.engine.seek(seconds).await
    }

    /// Seek relative to the current position (skip buttons)
    pub async fn skip(&self, delta_seconds: f64) -> Option<f64> {
        self.engine.skip(delta_seconds).await
    }

    pub async fn set_volume(&self, volume: f64) -> Option<f64> {
        self.engine.set_volume(volume).await
    }

    pub async fn set_rate(&self, rate: f64) -> Option<f64> {
        self.engine.set_rate(rate).await
    }

    pub async fn close(&self) {
        self.engine.close().await
    }
}
