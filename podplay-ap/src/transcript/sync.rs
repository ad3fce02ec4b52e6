//! Transcript scroll synchronization
//!
//! [`TranscriptSync`] is pure with respect to the playback engine: the caller
//! feeds it positions and scroll notifications together with the panel's
//! current [`ScrollMetrics`], and it answers with the [`ScrollCommand`] (if
//! any) the panel should perform.
//!
//! Arbitration:
//! - a programmatic scroll marks the next scroll notification as
//!   system-originated; that notification consumes the mark and is ignored
//! - any other notification is a user scroll and disables auto-scroll
//! - switching language, reopening the panel or changing episode re-enables
//!   auto-scroll and discards a stale mark

use podplay_common::config::TranscriptConfig;
use podplay_common::Language;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Geometry of the transcript panel at the time of a callback
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Full height of the rendered transcript
    pub content_height: f64,
    /// Visible height of the panel
    pub viewport_height: f64,
    /// Current scroll offset from the top
    pub scroll_offset: f64,
}

impl ScrollMetrics {
    pub fn new(content_height: f64, viewport_height: f64, scroll_offset: f64) -> Self {
        Self {
            content_height,
            viewport_height,
            scroll_offset,
        }
    }

    /// Distance the panel can scroll (may be <= 0 for short transcripts)
    pub fn scrollable(&self) -> f64 {
        self.content_height - self.viewport_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    /// Animate over the given duration
    Smooth(#[serde(with = "millis")] Duration),
    Instant,
}

/// Scroll the panel should perform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollCommand {
    pub offset: f64,
    pub behavior: ScrollBehavior,
}

/// Who caused a scroll notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollOrigin {
    System,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    /// Minimum offset difference before a programmatic scroll is issued
    pub deadband: f64,
    pub smooth_scroll: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            deadband: 5.0,
            smooth_scroll: Duration::from_millis(300),
        }
    }
}

impl From<&TranscriptConfig> for SyncSettings {
    fn from(config: &TranscriptConfig) -> Self {
        Self {
            deadband: config.scroll_deadband,
            smooth_scroll: Duration::from_millis(config.smooth_scroll_ms),
        }
    }
}

/// Observable state of one transcript panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranscriptViewState {
    pub language: Language,
    pub auto_scroll_enabled: bool,
    pub open: bool,
}

/// Scroll arbitration for one transcript panel
#[derive(Debug, Clone)]
pub struct TranscriptSync {
    settings: SyncSettings,
    language: Language,
    auto_scroll_enabled: bool,
    open: bool,
    system_scroll_pending: bool,
}

impl Default for TranscriptSync {
    fn default() -> Self {
        Self::new(SyncSettings::default())
    }
}

impl TranscriptSync {
    /// Closed panel, primary language, auto-scroll on
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            language: Language::default(),
            auto_scroll_enabled: true,
            open: false,
            system_scroll_pending: false,
        }
    }

    pub fn state(&self) -> TranscriptViewState {
        TranscriptViewState {
            language: self.language,
            auto_scroll_enabled: self.auto_scroll_enabled,
            open: self.open,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn auto_scroll_enabled(&self) -> bool {
        self.auto_scroll_enabled
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Fraction of the transcript matching the playback position
    pub fn scroll_target(position: f64, duration: f64) -> Option<f64> {
        if !(duration > 0.0) || !position.is_finite() || !duration.is_finite() {
            return None;
        }
        Some((position / duration).clamp(0.0, 1.0))
    }

    /// Absolute offset for `position`, or None when nothing can scroll
    pub fn target_offset(position: f64, duration: f64, metrics: &ScrollMetrics) -> Option<f64> {
        let scrollable = metrics.scrollable();
        if !(scrollable > 0.0) {
            return None;
        }
        Self::scroll_target(position, duration).map(|fraction| fraction * scrollable)
    }

    /// Open (or reopen) the panel; auto-scroll is re-enabled
    pub fn open(&mut self) {
        self.open = true;
        self.reset_arbitration();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.system_scroll_pending = false;
    }

    /// Switch transcript language; auto-scroll is re-enabled
    pub fn select_language(&mut self, language: Language) {
        if language != self.language {
            debug!("Transcript language {} -> {}", self.language, language);
        }
        self.language = language;
        self.reset_arbitration();
    }

    /// The active episode changed: close the panel and start over
    pub fn on_episode_changed(&mut self) {
        self.open = false;
        self.reset_arbitration();
    }

    fn reset_arbitration(&mut self) {
        self.auto_scroll_enabled = true;
        self.system_scroll_pending = false;
    }

    /// Playback position changed
    ///
    /// Returns a smooth scroll toward the target when auto-scroll is on, the
    /// panel is open, and the current offset is outside the deadband.
    pub fn on_position(
        &mut self,
        position: f64,
        duration: f64,
        metrics: &ScrollMetrics,
    ) -> Option<ScrollCommand> {
        if !self.auto_scroll_enabled || !self.open {
            return None;
        }
        let target = Self::target_offset(position, duration, metrics)?;
        if (metrics.scroll_offset - target).abs() <= self.settings.deadband {
            return None;
        }

        self.system_scroll_pending = true;
        Some(ScrollCommand {
            offset: target,
            behavior: ScrollBehavior::Smooth(self.settings.smooth_scroll),
        })
    }

    /// The panel reported a scroll
    pub fn on_scroll_notification(&mut self) -> ScrollOrigin {
        if self.system_scroll_pending {
            self.system_scroll_pending = false;
            return ScrollOrigin::System;
        }
        if self.auto_scroll_enabled {
            debug!("Manual scroll detected, auto-scroll disabled");
        }
        self.auto_scroll_enabled = false;
        ScrollOrigin::User
    }

    /// Turn auto-scroll off without a scroll event (toggle button)
    pub fn disable_auto_scroll(&mut self) {
        self.auto_scroll_enabled = false;
        self.system_scroll_pending = false;
    }

    /// Turn auto-scroll back on and catch up immediately
    ///
    /// The returned jump is marked system-originated so its own notification
    /// does not disable auto-scroll again. No jump is issued when already
    /// within the deadband.
    pub fn resume_auto_scroll(
        &mut self,
        position: f64,
        duration: f64,
        metrics: &ScrollMetrics,
    ) -> Option<ScrollCommand> {
        self.auto_scroll_enabled = true;
        self.system_scroll_pending = false;
        if !self.open {
            return None;
        }

        let target = Self::target_offset(position, duration, metrics)?;
        if (metrics.scroll_offset - target).abs() <= self.settings.deadband {
            return None;
        }
        self.system_scroll_pending = true;
        Some(ScrollCommand {
            offset: target,
            behavior: ScrollBehavior::Instant,
        })
    }

    /// Flip auto-scroll (the panel's mode button)
    pub fn toggle_auto_scroll(
        &mut self,
        position: f64,
        duration: f64,
        metrics: &ScrollMetrics,
    ) -> Option<ScrollCommand> {
        if self.auto_scroll_enabled {
            self.disable_auto_scroll();
            None
        } else {
            self.resume_auto_scroll(position, duration, metrics)
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open_sync() -> TranscriptSync {
        let mut sync = TranscriptSync::default();
        sync.open();
        sync
    }

    fn panel(offset: f64) -> ScrollMetrics {
        // 1000 scrollable units
        ScrollMetrics::new(1400.0, 400.0, offset)
    }

    #[test]
    fn test_position_maps_to_proportional_offset() {
        let mut sync = open_sync();
        let cmd = sync.on_position(30.0, 120.0, &panel(0.0)).unwrap();
        assert_relative_eq!(cmd.offset, 250.0);
        assert_eq!(cmd.behavior, ScrollBehavior::Smooth(Duration::from_millis(300)));
    }

    #[test]
    fn test_user_scroll_stops_auto_scroll() {
        let mut sync = open_sync();
        assert!(sync.on_position(30.0, 120.0, &panel(0.0)).is_some());
        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::System);
        assert!(sync.auto_scroll_enabled());

        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::User);
        assert!(!sync.auto_scroll_enabled());
        assert_eq!(sync.on_position(60.0, 120.0, &panel(250.0)), None);
    }

    #[test]
    fn test_deadband_suppresses_small_corrections() {
        let mut sync = open_sync();
        assert_eq!(sync.on_position(30.0, 120.0, &panel(246.0)), None);
        assert!(sync.on_position(30.0, 120.0, &panel(244.0)).is_some());
    }

    #[test]
    fn test_nothing_to_scroll() {
        let mut sync = open_sync();
        assert_eq!(sync.on_position(30.0, 0.0, &panel(0.0)), None);
        assert_eq!(
            sync.on_position(30.0, 120.0, &ScrollMetrics::new(300.0, 400.0, 0.0)),
            None
        );
        // No mark left behind, so the next notification is the user's
        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::User);
    }

    #[test]
    fn test_closed_panel_never_scrolls() {
        let mut sync = TranscriptSync::default();
        assert_eq!(sync.on_position(30.0, 120.0, &panel(0.0)), None);
    }

    #[test]
    fn test_language_switch_resets_arbitration() {
        let mut sync = open_sync();
        sync.on_position(30.0, 120.0, &panel(0.0));
        sync.disable_auto_scroll();

        sync.select_language(Language::Fr);
        assert_eq!(
            sync.state(),
            TranscriptViewState { language: Language::Fr, auto_scroll_enabled: true, open: true }
        );
        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::User);
    }

    #[test]
    fn test_reopen_discards_stale_mark() {
        let mut sync = open_sync();
        sync.on_position(30.0, 120.0, &panel(0.0));
        sync.close();
        sync.open();
        assert!(sync.auto_scroll_enabled());
        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::User);
    }

    #[test]
    fn test_resume_jumps_immediately() {
        let mut sync = open_sync();
        sync.on_scroll_notification();
        assert!(!sync.auto_scroll_enabled());

        let cmd = sync.resume_auto_scroll(90.0, 120.0, &panel(0.0)).unwrap();
        assert_relative_eq!(cmd.offset, 750.0);
        assert_eq!(cmd.behavior, ScrollBehavior::Instant);
        assert_eq!(sync.on_scroll_notification(), ScrollOrigin::System);
        assert!(sync.auto_scroll_enabled());
    }

    #[test]
    fn test_episode_change_closes_panel() {
        let mut sync = open_sync();
        sync.disable_auto_scroll();
        sync.on_episode_changed();
        assert!(!sync.is_open());
        assert!(sync.auto_scroll_enabled());
    }

    #[test]
    fn test_scroll_target_fraction() {
        assert_eq!(TranscriptSync::scroll_target(10.0, 0.0), None);
        assert_eq!(TranscriptSync::scroll_target(f64::NAN, 10.0), None);
        assert_relative_eq!(TranscriptSync::scroll_target(5.0, 20.0).unwrap(), 0.25);
    }

    #[test]
    fn test_settings_from_config() {
        let config = TranscriptConfig {
            scroll_deadband: 12.0,
            smooth_scroll_ms: 150,
        };
        let settings = SyncSettings::from(&config);
        assert_eq!(settings.deadband, 12.0);
        assert_eq!(settings.smooth_scroll, Duration::from_millis(150));
    }
}
