//! Media handle event consumption
//!
//! The engine is a state machine over the handle's event stream. Events
//! stamped with a binding other than the current one are dropped, so a
//! replaced source can never move the position or fault the new episode.

use super::PlaybackEngine;
use crate::media::{MediaEvent, MEDIA_ERR_ABORTED, MEDIA_ERR_SRC_NOT_SUPPORTED};
use podplay_common::events::TransportState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

impl PlaybackEngine {
    /// Consume handle events until the channel closes
    pub async fn run_media_events(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<MediaEvent>) {
        info!("Media event handler started");
        while let Some(event) = rx.recv().await {
            self.handle_media_event(event).await;
        }
        info!("Media event channel closed, handler exiting");
    }

    /// Apply one handle event to the session
    pub async fn handle_media_event(&self, event: MediaEvent) {
        let mut inner = self.inner.lock().await;

        if inner.binding == 0 || event.binding() != inner.binding {
            trace!(
                "Dropping event for binding {} (current {})",
                event.binding(),
                inner.binding
            );
            return;
        }

        let old_transport = inner.session.transport;
        match event {
            MediaEvent::PositionAdvanced { position, .. } => {
                if !position.is_finite() {
                    return;
                }
                let mut position = position.max(0.0);
                if inner.session.duration > 0.0 {
                    position = position.min(inner.session.duration);
                }
                if position == inner.session.position {
                    return;
                }
                inner.session.position = position;
            }
            MediaEvent::MetadataReady { duration, .. } => {
                if !duration.is_finite() || duration < 0.0 {
                    warn!("Ignoring invalid duration {} for {}", duration, inner.title());
                    return;
                }
                debug!("Metadata ready for {}: {:.1}s", inner.title(), duration);
                inner.session.duration = duration;
                if duration > 0.0 && inner.session.position > duration {
                    inner.session.position = duration;
                }
                inner.session.buffering = false;
            }
            MediaEvent::Ended { .. } => {
                info!("Playback ended: {}", inner.title());
                inner.session.transport = TransportState::Paused;
                inner.session.buffering = false;
                if inner.session.duration > 0.0 {
                    inner.session.position = inner.session.duration;
                }
            }
            MediaEvent::BufferingStarted { .. } => {
                if inner.session.buffering {
                    return;
                }
                inner.session.buffering = true;
            }
            MediaEvent::BufferingEnded { .. } => {
                if !inner.session.buffering {
                    return;
                }
                inner.session.buffering = false;
            }
            MediaEvent::Faulted { code, message, .. } => {
                if code == MEDIA_ERR_ABORTED {
                    debug!("Ignoring benign abort from media handle");
                    return;
                }
                let description = if code == MEDIA_ERR_SRC_NOT_SUPPORTED {
                    format!(
                        "Audio source not found or format not supported (Code {}).",
                        code
                    )
                } else {
                    format!("Audio playback error (Code {}): {}", code, message)
                };
                warn!("{} Episode: {}", description, inner.title());
                warn!("Failed URL: {}", inner.source_uri());

                inner.faulted = true;
                self.fail_locked(&mut inner, Some(code), description);
                return;
            }
        }

        self.commit(&inner, old_transport);
    }
}
