//! Media handle abstraction
//!
//! The playback engine drives exactly one [`MediaHandle`]. A handle binds one
//! source at a time, starts playback asynchronously, and reports its
//! lifecycle through a closed set of typed [`MediaEvent`]s delivered over an
//! mpsc channel that the engine consumes.
//!
//! Every bind is tagged with a [`BindingId`] chosen by the engine. Handles
//! stamp each event with the binding it belongs to, which lets the engine
//! drop events that arrive after the source was replaced.

pub mod clocked;

use futures::future::BoxFuture;
use thiserror::Error;

pub use clocked::ClockedHandle;

/// Identifier of one source binding (0 means "nothing bound")
pub type BindingId = u64;

/// Fault code: operation aborted by the caller (benign)
pub const MEDIA_ERR_ABORTED: u16 = 1;
/// Fault code: network failure while fetching the source
pub const MEDIA_ERR_NETWORK: u16 = 2;
/// Fault code: source could not be decoded
pub const MEDIA_ERR_DECODE: u16 = 3;
/// Fault code: source not found or format not supported
pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

/// Lifecycle events emitted by a media handle
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback position moved (seconds)
    PositionAdvanced { binding: BindingId, position: f64 },
    /// Source metadata resolved; duration in seconds
    MetadataReady { binding: BindingId, duration: f64 },
    /// Playback reached the end of the source
    Ended { binding: BindingId },
    /// Handle stalled waiting for data
    BufferingStarted { binding: BindingId },
    /// Handle has enough data to continue
    BufferingEnded { binding: BindingId },
    /// Asynchronous fault with a platform error code
    Faulted {
        binding: BindingId,
        code: u16,
        message: String,
    },
}

impl MediaEvent {
    pub fn binding(&self) -> BindingId {
        match self {
            MediaEvent::PositionAdvanced { binding, .. }
            | MediaEvent::MetadataReady { binding, .. }
            | MediaEvent::Ended { binding }
            | MediaEvent::BufferingStarted { binding }
            | MediaEvent::BufferingEnded { binding }
            | MediaEvent::Faulted { binding, .. } => *binding,
        }
    }
}

/// Why an asynchronous start/resume was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartRejection {
    /// A newer load or seek interrupted this start
    #[error("start aborted by a newer request")]
    Aborted,
    /// The platform cannot play this source
    #[error("source not supported: {0}")]
    NotSupported(String),
    #[error("start failed: {0}")]
    Other(String),
}

/// Source handed to [`MediaHandle::bind`]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSource {
    /// Normalized source URI
    pub uri: String,
    /// Editorial duration of the episode in seconds (0 when unknown)
    pub duration_hint: f64,
}

/// Pending result of a start/resume
pub type StartFuture = BoxFuture<'static, Result<(), StartRejection>>;

/// One streaming-audio handle
///
/// Only the playback engine may call these methods. All of them except
/// [`MediaHandle::play`] take effect immediately.
pub trait MediaHandle: Send {
    /// Bind a new source. Any previous source must already be unbound.
    fn bind(&mut self, binding: BindingId, source: &BoundSource);

    /// Stop, rewind and detach the current source
    fn unbind(&mut self);

    /// Start or resume playback of the bound source
    fn play(&mut self) -> StartFuture;

    fn pause(&mut self);

    /// Move the playhead (seconds, already clamped by the engine)
    fn set_position(&mut self, seconds: f64);

    /// Output volume in [0, 1]
    fn set_volume(&mut self, volume: f64);

    /// Playback-speed multiplier
    fn set_rate(&mut self, rate: f64);

    /// Whether the handle is latched in an error condition
    fn has_error(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_binding_accessor() {
        let events = [
            MediaEvent::PositionAdvanced { binding: 3, position: 1.0 },
            MediaEvent::MetadataReady { binding: 3, duration: 10.0 },
            MediaEvent::Ended { binding: 3 },
            MediaEvent::BufferingStarted { binding: 3 },
            MediaEvent::BufferingEnded { binding: 3 },
            MediaEvent::Faulted { binding: 3, code: MEDIA_ERR_NETWORK, message: "stall".into() },
        ];
        assert!(events.iter().all(|e| e.binding() == 3));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            StartRejection::NotSupported("bad codec".into()).to_string(),
            "source not supported: bad codec"
        );
    }
}
