//! Headless media handle driven by a software clock
//!
//! Produces no sound. Position advances on a tokio interval scaled by the
//! playback rate, the episode's duration hint is reported as metadata, and
//! `Ended` fires when the clock reaches the duration. Used by the service
//! binary so UIs can be driven end to end without an audio device.

use super::{
    BindingId, BoundSource, MediaEvent, MediaHandle, StartFuture, StartRejection,
};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

const SUPPORTED_SCHEMES: [&str; 3] = ["http", "https", "file"];

#[derive(Debug)]
struct ClockState {
    binding: Option<BindingId>,
    uri: String,
    position: f64,
    duration: f64,
    rate: f64,
    volume: f64,
}

/// Software-clock media handle
pub struct ClockedHandle {
    events: mpsc::UnboundedSender<MediaEvent>,
    tick: Duration,
    state: Arc<Mutex<ClockState>>,
    ticker: Option<JoinHandle<()>>,
}

impl ClockedHandle {
    /// Create a handle reporting positions every `tick`
    pub fn new(events: mpsc::UnboundedSender<MediaEvent>, tick: Duration) -> Self {
        Self {
            events,
            tick: tick.max(Duration::from_millis(1)),
            state: Arc::new(Mutex::new(ClockState {
                binding: None,
                uri: String::new(),
                position: 0.0,
                duration: 0.0,
                rate: 1.0,
                volume: 1.0,
            })),
            ticker: None,
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn ticker_running(&self) -> bool {
        self.ticker.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Current clock position (seconds)
    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    pub fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn spawn_ticker(&mut self, binding: BindingId) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let tick = self.tick;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
            loop {
                interval.tick().await;
                let (position, ended) = {
                    let mut s = state.lock();
                    if s.binding != Some(binding) {
                        break;
                    }
                    s.position += tick.as_secs_f64() * s.rate;
                    let ended = s.duration > 0.0 && s.position >= s.duration;
                    if ended {
                        s.position = s.duration;
                    }
                    (s.position, ended)
                };

                if events.send(MediaEvent::PositionAdvanced { binding, position }).is_err() {
                    break;
                }
                if ended {
                    let _ = events.send(MediaEvent::Ended { binding });
                    break;
                }
            }
        }));
    }
}

impl MediaHandle for ClockedHandle {
    fn bind(&mut self, binding: BindingId, source: &BoundSource) {
        self.stop_ticker();
        {
            let mut s = self.state.lock();
            s.binding = Some(binding);
            s.uri = source.uri.clone();
            s.position = 0.0;
            s.duration = if source.duration_hint.is_finite() {
                source.duration_hint.max(0.0)
            } else {
                0.0
            };
        }
        debug!("Clocked handle bound #{} to {}", binding, source.uri);

        if source.duration_hint.is_finite() && source.duration_hint > 0.0 {
            let _ = self.events.send(MediaEvent::MetadataReady {
                binding,
                duration: source.duration_hint,
            });
        }
    }

    fn unbind(&mut self) {
        self.stop_ticker();
        let mut s = self.state.lock();
        s.binding = None;
        s.uri.clear();
        s.position = 0.0;
        s.duration = 0.0;
    }

    fn play(&mut self) -> StartFuture {
        let (binding, uri) = {
            let mut s = self.state.lock();
            let Some(binding) = s.binding else {
                return futures::future::ready(Err(StartRejection::NotSupported(
                    "no source bound".to_string(),
                )))
                .boxed();
            };
            // Playing again after the end restarts from the top
            if s.duration > 0.0 && s.position >= s.duration {
                s.position = 0.0;
            }
            (binding, s.uri.clone())
        };

        match Url::parse(&uri) {
            Ok(url) if SUPPORTED_SCHEMES.contains(&url.scheme()) => {}
            Ok(url) => {
                return futures::future::ready(Err(StartRejection::NotSupported(format!(
                    "unsupported scheme '{}'",
                    url.scheme()
                ))))
                .boxed();
            }
            Err(e) => {
                return futures::future::ready(Err(StartRejection::NotSupported(format!(
                    "invalid source '{}': {}",
                    uri, e
                ))))
                .boxed();
            }
        }

        if !self.ticker_running() {
            self.spawn_ticker(binding);
        }
        futures::future::ready(Ok(())).boxed()
    }

    fn pause(&mut self) {
        self.stop_ticker();
    }

    fn set_position(&mut self, seconds: f64) {
        self.state.lock().position = seconds.max(0.0);
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn set_rate(&mut self, rate: f64) {
        self.state.lock().rate = rate;
    }

    fn has_error(&self) -> bool {
        false
    }
}

impl Drop for ClockedHandle {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(uri: &str, duration_hint: f64) -> BoundSource {
        BoundSource {
            uri: uri.to_string(),
            duration_hint,
        }
    }

    #[tokio::test]
    async fn test_bind_reports_duration_hint() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = ClockedHandle::new(tx, Duration::from_millis(10));

        handle.bind(7, &source("https://cdn.example/a.mp3", 120.0));
        assert_eq!(
            rx.recv().await,
            Some(MediaEvent::MetadataReady { binding: 7, duration: 120.0 })
        );
    }

    #[tokio::test]
    async fn test_play_without_source_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut handle = ClockedHandle::new(tx, Duration::from_millis(10));
        assert!(matches!(handle.play().await, Err(StartRejection::NotSupported(_))));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut handle = ClockedHandle::new(tx, Duration::from_millis(10));
        handle.bind(1, &source("ftp://files.example/a.mp3", 0.0));
        assert!(matches!(handle.play().await, Err(StartRejection::NotSupported(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_runs_to_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = ClockedHandle::new(tx, Duration::from_millis(500));
        handle.bind(2, &source("https://cdn.example/a.mp3", 1.0));
        handle.set_rate(2.0);
        assert!(handle.play().await.is_ok());

        let mut saw_end = false;
        while let Some(event) = rx.recv().await {
            if event == (MediaEvent::Ended { binding: 2 }) {
                saw_end = true;
                break;
            }
        }
        assert!(saw_end);
        assert_eq!(handle.position(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_clock() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut handle = ClockedHandle::new(tx, Duration::from_millis(100));
        handle.bind(3, &source("https://cdn.example/a.mp3", 0.0));
        handle.play().await.unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.pause();
        let paused_at = handle.position();
        assert!(paused_at > 0.0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(handle.position(), paused_at);
    }
}
