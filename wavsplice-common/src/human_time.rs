//! Human-readable clock formatting for durations
//!
//! Durations are shown as `HH:MM:SS.ss`: whole hours and minutes by integer
//! division, the remaining seconds with two decimal places.

/// Placeholder shown when a duration cannot be determined
pub const UNKNOWN_CLOCK: &str = "--:--:--.--";

/// Format seconds as `HH:MM:SS.ss`.
///
/// Rounding happens once, on hundredths of a second, so a value such as
/// 59.999s carries into the next minute instead of printing `60.00`.
/// Negative values are prefixed with a minus sign.
///
/// # Examples
///
/// ```
/// use wavsplice_common::human_time::format_clock;
///
/// assert_eq!(format_clock(5.5), "00:00:05.50");
/// assert_eq!(format_clock(330.25), "00:05:30.25");
/// assert_eq!(format_clock(3661.0), "01:01:01.00");
/// ```
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() {
        return UNKNOWN_CLOCK.to_string();
    }

    let is_negative = seconds < 0.0;
    let total_hundredths = (seconds.abs() * 100.0).round() as u64;

    let hours = total_hundredths / 360_000;
    let minutes = (total_hundredths % 360_000) / 6_000;
    let remainder = (total_hundredths % 6_000) as f64 / 100.0;

    let formatted = format!("{:02}:{:02}:{:05.2}", hours, minutes, remainder);
    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format a frame count at `sample_rate` as `HH:MM:SS.ss`.
///
/// ```
/// use wavsplice_common::human_time::format_clock_frames;
///
/// assert_eq!(format_clock_frames(242_550, 44100), "00:00:05.50");
/// ```
pub fn format_clock_frames(frames: u64, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return UNKNOWN_CLOCK.to_string();
    }
    format_clock(crate::timing::frames_to_seconds(frames, sample_rate))
}

/// Format optional seconds, using [`UNKNOWN_CLOCK`] for `None`.
pub fn format_clock_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(seconds) => format_clock(seconds),
        None => UNKNOWN_CLOCK.to_string(),
    }
}
