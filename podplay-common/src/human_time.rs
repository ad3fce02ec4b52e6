//! Human-readable time formatting for player displays
//!
//! The player bar shows elapsed and total time as `M:SS`. Minutes are not
//! folded into hours; a 95 minute episode reads `95:00`.

/// Format seconds as `M:SS`.
///
/// Zero, negative and non-finite values render as `0:00` (duration is zero
/// until metadata resolves, and the display must not flicker through `NaN`).
///
/// # Examples
///
/// ```
/// use podplay_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(9.7), "0:09");
/// assert_eq!(format_clock(75.0), "1:15");
/// assert_eq!(format_clock(5700.0), "95:00");
/// assert_eq!(format_clock(f64::NAN), "0:00");
/// ```
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Elapsed share of the episode as a percentage in `[0, 100]`.
///
/// Returns 0 while the duration is unknown.
pub fn progress_percent(position: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    (position / duration * 100.0).clamp(0.0, 100.0)
}
