//! Seconds ↔ frames conversion
//!
//! A frame is one sample per channel. Durations in configuration are given in
//! seconds and converted with the reference sample rate of the job; durations
//! reported back to the user are derived from frame counts.
//!
//! ```rust
//! use wavsplice_common::timing::*;
//!
//! assert_eq!(seconds_to_frames(0.5, 44100), 22_050);
//! assert_eq!(frames_to_seconds(88_200, 44100), 2.0);
//! ```

use serde::{Deserialize, Serialize};

/// Convert seconds to a whole number of frames (rounded to nearest)
///
/// Negative, NaN or infinite inputs yield 0.
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64).round() as u64
}

/// Convert frames to seconds
///
/// A zero sample rate yields 0.0 rather than dividing by zero.
pub fn frames_to_seconds(frames: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    frames as f64 / sample_rate as f64
}

/// A length of audio expressed either in frames or in seconds
///
/// Seconds are resolved against a sample rate only once one is known, so the
/// same configuration value works for every job regardless of its format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSpan {
    Frames(u64),
    Seconds(f64),
}

impl TimeSpan {
    /// Resolve to a frame count at `sample_rate`
    pub fn to_frames(&self, sample_rate: u32) -> u64 {
        match *self {
            TimeSpan::Frames(frames) => frames,
            TimeSpan::Seconds(seconds) => seconds_to_frames(seconds, sample_rate),
        }
    }

    /// True when the span is zero or negative
    pub fn is_zero(&self) -> bool {
        match *self {
            TimeSpan::Frames(frames) => frames == 0,
            TimeSpan::Seconds(seconds) => !(seconds > 0.0),
        }
    }
}

impl Default for TimeSpan {
    fn default() -> Self {
        TimeSpan::Frames(0)
    }
}

impl std::fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeSpan::Frames(frames) => write!(f, "{} frames", frames),
            TimeSpan::Seconds(seconds) => write!(f, "{}s", seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_frames() {
        assert_eq!(seconds_to_frames(2.0, 44100), 88_200);
        assert_eq!(seconds_to_frames(1.5, 48000), 72_000);
        assert_eq!(seconds_to_frames(0.0, 44100), 0);
        assert_eq!(seconds_to_frames(-1.0, 44100), 0);
        assert_eq!(seconds_to_frames(f64::NAN, 44100), 0);
    }

    #[test]
    fn test_frames_to_seconds() {
        assert_eq!(frames_to_seconds(44100, 44100), 1.0);
        assert_eq!(frames_to_seconds(22050, 44100), 0.5);
        assert_eq!(frames_to_seconds(100, 0), 0.0);
    }

    #[test]
    fn test_time_span_resolution() {
        assert_eq!(TimeSpan::Seconds(0.5).to_frames(44100), 22_050);
        assert_eq!(TimeSpan::Frames(1234).to_frames(44100), 1234);
        assert!(TimeSpan::Seconds(0.0).is_zero());
        assert!(TimeSpan::Frames(0).is_zero());
        assert!(!TimeSpan::Seconds(0.01).is_zero());
    }
}
