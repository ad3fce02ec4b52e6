//! # podplay Common Library
//!
//! Shared code for the podplay player crates:
//! - Episode records and transcript languages
//! - Event types (PlayerEvent enum) and the EventBus
//! - Bootstrap configuration loading
//! - Audio source URI normalization
//! - Clock formatting for player displays

pub mod config;
pub mod episode;
pub mod error;
pub mod events;
pub mod human_time;
pub mod source;

pub use episode::{Episode, EpisodeId, Language};
pub use error::{Error, Result};
