//! Playback engine module
//!
//! **Module Structure:**
//! - `core.rs`: engine struct, construction, state commit/publish helpers
//! - `transport.rs`: transport commands (load, toggle, seek, volume, rate, close)
//! - `media_events.rs`: state machine over media handle lifecycle events

mod core;
mod media_events;
mod transport;

pub use self::core::{EngineSettings, PlaybackEngine};
pub use self::transport::{LoadOutcome, StartOutcome, ToggleOutcome};
