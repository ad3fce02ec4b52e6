//! Transcript panel driver
//!
//! Keeps one [`TranscriptSync`] in step with the session store: every
//! published snapshot is fed to it, an episode change resets the panel, and
//! the resulting [`TranscriptViewState`] is republished on a watch channel.
//! Scroll commands go out on a broadcast channel for whoever renders the panel.

use super::sync::{
    ScrollCommand, ScrollMetrics, ScrollOrigin, SyncSettings, TranscriptSync, TranscriptViewState,
};
use crate::state::SessionStore;
use parking_lot::Mutex;
use podplay_common::events::PlaybackSession;
use podplay_common::{EpisodeId, Language};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const SCROLL_CHANNEL_CAPACITY: usize = 32;

struct PanelInner {
    sync: TranscriptSync,
    active: Option<EpisodeId>,
    metrics: ScrollMetrics,
    position: f64,
    duration: f64,
}

/// One transcript panel bound to the application session
pub struct TranscriptPanel {
    inner: Mutex<PanelInner>,
    view_tx: watch::Sender<TranscriptViewState>,
    scroll_tx: broadcast::Sender<ScrollCommand>,
}

impl TranscriptPanel {
    /// Panel for the episode active in `session` (closed, auto-scroll on)
    pub fn new(settings: SyncSettings, session: &PlaybackSession) -> Self {
        let sync = TranscriptSync::new(settings);
        let (view_tx, _) = watch::channel(sync.state());
        let (scroll_tx, _) = broadcast::channel(SCROLL_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(PanelInner {
                sync,
                active: session.active_id().cloned(),
                metrics: ScrollMetrics::default(),
                position: session.position,
                duration: session.duration,
            }),
            view_tx,
            scroll_tx,
        }
    }

    /// Build a panel and keep it following `store` until the session closes
    pub fn spawn(settings: SyncSettings, store: &SessionStore) -> (Arc<Self>, JoinHandle<()>) {
        let panel = Arc::new(Self::new(settings, &store.snapshot()));
        let task = tokio::spawn(Arc::clone(&panel).follow(store.subscribe()));
        (panel, task)
    }

    /// Apply every published snapshot
    pub async fn follow(self: Arc<Self>, mut sessions: watch::Receiver<PlaybackSession>) {
        info!("Transcript panel following session");
        loop {
            let session = sessions.borrow_and_update().clone();
            self.apply_session(&session);
            if sessions.changed().await.is_err() {
                break;
            }
        }
        debug!("Session channel closed, transcript panel stops following");
    }

    /// Read-only view of the panel state
    pub fn subscribe(&self) -> watch::Receiver<TranscriptViewState> {
        self.view_tx.subscribe()
    }

    pub fn scroll_commands(&self) -> broadcast::Receiver<ScrollCommand> {
        self.scroll_tx.subscribe()
    }

    pub fn state(&self) -> TranscriptViewState {
        *self.view_tx.borrow()
    }

    /// Feed one session snapshot
    pub fn apply_session(&self, session: &PlaybackSession) -> Option<ScrollCommand> {
        let mut inner = self.inner.lock();
        let active = session.active_id();
        if inner.active.as_ref() != active {
            debug!("Active episode changed, resetting transcript panel");
            inner.active = active.cloned();
            inner.sync.on_episode_changed();
        }
        inner.position = session.position;
        inner.duration = session.duration;

        let PanelInner {
            sync,
            metrics,
            position,
            duration,
            ..
        } = &mut *inner;
        let command = sync.on_position(*position, *duration, metrics);
        self.publish(&inner, command)
    }

    /// The panel reported new geometry (resize, content change)
    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        self.inner.lock().metrics = metrics;
    }

    /// The panel scrolled; `metrics` is its geometry after the scroll
    pub fn on_scroll(&self, metrics: ScrollMetrics) -> ScrollOrigin {
        let mut inner = self.inner.lock();
        inner.metrics = metrics;
        let origin = inner.sync.on_scroll_notification();
        self.publish(&inner, None);
        origin
    }

    pub fn open(&self) -> Option<ScrollCommand> {
        let mut inner = self.inner.lock();
        inner.sync.open();
        let command = Self::catch_up(&mut inner);
        self.publish(&inner, command)
    }

    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.sync.close();
        self.publish(&inner, None);
    }

    pub fn select_language(&self, language: Language) -> Option<ScrollCommand> {
        let mut inner = self.inner.lock();
        inner.sync.select_language(language);
        let command = Self::catch_up(&mut inner);
        self.publish(&inner, command)
    }

    /// Flip between automatic and manual scrolling
    pub fn toggle_auto_scroll(&self) -> Option<ScrollCommand> {
        let mut inner = self.inner.lock();
        let PanelInner {
            sync,
            metrics,
            position,
            duration,
            ..
        } = &mut *inner;
        let command = sync.toggle_auto_scroll(*position, *duration, metrics);
        self.publish(&inner, command)
    }

    pub fn disable_auto_scroll(&self) {
        let mut inner = self.inner.lock();
        inner.sync.disable_auto_scroll();
        self.publish(&inner, None);
    }

    fn catch_up(inner: &mut PanelInner) -> Option<ScrollCommand> {
        let PanelInner {
            sync,
            metrics,
            position,
            duration,
            ..
        } = inner;
        sync.on_position(*position, *duration, metrics)
    }

    fn publish(&self, inner: &PanelInner, command: Option<ScrollCommand>) -> Option<ScrollCommand> {
        let state = inner.sync.state();
        self.view_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if let Some(command) = command {
            let _ = self.scroll_tx.send(command);
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podplay_common::Episode;

    fn playing(id: &str, position: f64, duration: f64) -> PlaybackSession {
        PlaybackSession {
            active_episode: Some(Episode::new(id, id, "https://cdn.example/a.mp3")),
            position,
            duration,
            ..PlaybackSession::default()
        }
    }

    #[test]
    fn test_episode_change_resets_view() {
        let panel = TranscriptPanel::new(SyncSettings::default(), &playing("e1", 0.0, 100.0));
        let mut view = panel.subscribe();
        panel.open();
        panel.select_language(Language::Fr);
        panel.disable_auto_scroll();
        assert!(!panel.state().auto_scroll_enabled);

        panel.apply_session(&playing("e2", 0.0, 100.0));

        assert!(view.has_changed().unwrap());
        let state = *view.borrow_and_update();
        assert!(state.auto_scroll_enabled);
        assert!(!state.open);
        assert_eq!(state.language, Language::Fr);
    }

    #[test]
    fn test_same_episode_keeps_manual_mode() {
        let panel = TranscriptPanel::new(SyncSettings::default(), &playing("e1", 0.0, 100.0));
        panel.open();
        panel.disable_auto_scroll();
        panel.apply_session(&playing("e1", 10.0, 100.0));
        assert!(!panel.state().auto_scroll_enabled);
        assert!(panel.state().open);
    }

    #[test]
    fn test_snapshots_drive_scroll_commands() {
        let panel = TranscriptPanel::new(SyncSettings::default(), &playing("e1", 0.0, 100.0));
        let mut commands = panel.scroll_commands();
        panel.set_metrics(ScrollMetrics::new(1500.0, 500.0, 0.0));
        panel.open();

        let command = panel.apply_session(&playing("e1", 25.0, 100.0)).unwrap();
        assert_eq!(command.offset, 250.0);
        assert_eq!(commands.try_recv().unwrap(), command);

        assert_eq!(
            panel.on_scroll(ScrollMetrics::new(1500.0, 500.0, 250.0)),
            ScrollOrigin::System
        );
        assert_eq!(
            panel.on_scroll(ScrollMetrics::new(1500.0, 500.0, 900.0)),
            ScrollOrigin::User
        );
        assert_eq!(panel.apply_session(&playing("e1", 50.0, 100.0)), None);

        let catch_up = panel.toggle_auto_scroll().unwrap();
        assert_eq!(catch_up.offset, 500.0);
    }

    #[test]
    fn test_unchanged_state_is_not_republished() {
        let panel = TranscriptPanel::new(SyncSettings::default(), &PlaybackSession::default());
        let mut view = panel.subscribe();
        view.borrow_and_update();
        panel.apply_session(&PlaybackSession::default());
        assert!(!view.has_changed().unwrap());
    }
}
