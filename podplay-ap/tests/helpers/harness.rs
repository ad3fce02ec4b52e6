//! Engine + store wired to a scripted handle

use super::scripted_handle::{HandleScript, ScriptedHandle};
use podplay_ap::media::MediaEvent;
use podplay_ap::playback::{EngineSettings, PlaybackEngine};
use podplay_ap::SessionStore;
use podplay_common::events::{PlaybackSession, PlayerEvent};
use podplay_common::source::SourceNormalizer;
use podplay_common::Episode;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct Harness {
    pub engine: Arc<PlaybackEngine>,
    pub store: SessionStore,
    pub script: HandleScript,
}

impl Harness {
    /// Starts stay pending until resolved through the script
    pub fn new() -> Self {
        let (handle, script) = ScriptedHandle::new();
        let settings = EngineSettings {
            normalizer: SourceNormalizer::new(["x.example", "dropbox.com"]),
            ..EngineSettings::default()
        };
        let engine = Arc::new(PlaybackEngine::new(Box::new(handle), settings));
        let store = SessionStore::new(Arc::clone(&engine));
        Self {
            engine,
            store,
            script,
        }
    }

    /// Starts resolve immediately with success
    pub fn auto_start() -> Self {
        let harness = Self::new();
        harness.script.set_auto_start(true);
        harness
    }

    pub fn session(&self) -> PlaybackSession {
        self.store.snapshot()
    }

    /// Deliver a handle event for the currently bound source
    pub async fn media(&self, make: impl FnOnce(u64) -> MediaEvent) {
        let binding = self.script.binding().expect("nothing bound");
        self.engine.handle_media_event(make(binding)).await;
    }

    /// Report metadata for the current binding
    pub async fn metadata(&self, duration: f64) {
        self.media(|binding| MediaEvent::MetadataReady { binding, duration })
            .await;
    }
}

/// Drain everything currently queued on an event receiver
pub fn drain(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Episode with a playable source on the test host
pub fn episode(id: &str, duration: f64) -> Episode {
    let mut episode = Episode::new(
        id,
        format!("Episode {}", id),
        format!("https://cdn.example/{}.mp3", id),
    );
    episode.duration = duration;
    episode
}

pub fn episode_without_source(id: &str) -> Episode {
    let mut episode = Episode::new(id, format!("Episode {}", id), "");
    episode.dropbox_audio_url = None;
    episode
}
