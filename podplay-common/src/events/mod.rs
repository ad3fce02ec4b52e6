//! Event types for podplay
//!
//! Provides the PlayerEvent enum and the EventBus used to fan events out to
//! UI subscribers (SSE clients, in-process observers).

mod playback_types;

pub use playback_types::{
    PlaybackSession, TransportState, DEFAULT_RATE, DEFAULT_VOLUME, RATE_PRESETS,
};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::episode::EpisodeId;

/// podplay event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. Every discrete session mutation produces exactly one
/// `SessionChanged`; the other variants are annotations for consumers that
/// care about a specific transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Session snapshot after a mutation
    SessionChanged {
        session: PlaybackSession,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport state changed
    TransportChanged {
        old_state: TransportState,
        new_state: TransportState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new source was bound to the media handle
    EpisodeLoaded {
        episode_id: EpisodeId,
        title: String,
        /// Normalized source URI actually bound
        source: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Load requested for an episode without a playable source
    MissingSource {
        episode_id: EpisodeId,
        title: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback failed (start rejected or handle fault)
    PlaybackFault {
        episode_id: EpisodeId,
        title: String,
        source: String,
        /// Platform error code, `None` for start rejections
        code: Option<u16>,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::SessionChanged { .. } => "SessionChanged",
            PlayerEvent::TransportChanged { .. } => "TransportChanged",
            PlayerEvent::EpisodeLoaded { .. } => "EpisodeLoaded",
            PlayerEvent::MissingSource { .. } => "MissingSource",
            PlayerEvent::PlaybackFault { .. } => "PlaybackFault",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block the engine)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use podplay_common::events::{EventBus, PlayerEvent, TransportState};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(PlayerEvent::TransportChanged {
///     old_state: TransportState::Paused,
///     new_state: TransportState::Playing,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(PlayerEvent::TransportChanged { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers
    ///   start dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
