//! # podplay audio player library (podplay-ap)
//!
//! Single shared playback session for a podcast site, driven by a media
//! handle's asynchronous lifecycle, plus transcript scroll synchronization
//! and segmentation.
//!
//! **Architecture:**
//! - [`playback::PlaybackEngine`] owns the one [`media::MediaHandle`]
//! - [`state::SessionStore`] republishes engine state to any number of consumers
//! - [`transcript`] maps position to scroll offset and splits transcript text;
//!   [`transcript::TranscriptPanel`] follows the store
//! - [`api`] is the HTTP/SSE consumer of the store

pub mod api;
pub mod catalog;
pub mod error;
pub mod media;
pub mod playback;
pub mod state;
pub mod transcript;

pub use error::{Error, Result};
pub use state::SessionStore;
