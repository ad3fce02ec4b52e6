//! Playback engine for the shared episode session

pub mod engine;

pub use engine::{EngineSettings, LoadOutcome, PlaybackEngine, StartOutcome, ToggleOutcome};
