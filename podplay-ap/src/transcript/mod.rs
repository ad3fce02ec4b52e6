//! Transcript presentation
//!
//! - `segment.rs`: splits raw transcript text into speaker/plain/spacer blocks
//! - `sync.rs`: maps playback position to a scroll offset and arbitrates
//!   automatic vs. user scrolling
//! - `panel.rs`: follows the session store and publishes the panel view state

pub mod panel;
pub mod segment;
pub mod sync;

pub use panel::TranscriptPanel;
pub use segment::{segment, Block, Segments, SPEAKER_LABEL_LIMIT};
pub use sync::{
    ScrollBehavior, ScrollCommand, ScrollMetrics, ScrollOrigin, SyncSettings, TranscriptSync,
    TranscriptViewState,
};
