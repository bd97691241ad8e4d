//! Leading-silence removal
//!
//! Audio is dropped from the start of the buffer until `above_frames`
//! consecutive frames are louder than the threshold; the first of those
//! frames becomes the new start. A frame is loud when any of its channels
//! exceeds the threshold in absolute value. Trailing silence is handled by
//! running this effect on reversed audio.

use super::{Effect, SampleBuffer};
use crate::error::{Error, Result, Stage};
use serde::Serialize;

/// Amplitude threshold for silence detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Fraction of full scale (0.01 = 1%)
    Fraction(f64),
    /// Level relative to full scale in dB (negative)
    Decibels(f64),
}

impl Threshold {
    /// Parse `"1%"`, `"-48d"`, `"-48dB"` or a plain fraction such as `"0.01"`
    pub fn parse(value: &str) -> Result<Self> {
        let text = value.trim();
        let invalid = || Error::effect(Stage::Silence, format!("invalid threshold '{}'", value));

        let threshold = if let Some(number) = text.strip_suffix('%') {
            let percent: f64 = number.trim().parse().map_err(|_| invalid())?;
            Threshold::Fraction(percent / 100.0)
        } else if let Some(number) = strip_decibel_suffix(text) {
            Threshold::Decibels(number.trim().parse().map_err(|_| invalid())?)
        } else {
            Threshold::Fraction(text.parse().map_err(|_| invalid())?)
        };

        threshold.linear()?;
        Ok(threshold)
    }

    /// Linear amplitude in (0.0, 1.0]
    pub fn linear(&self) -> Result<f64> {
        let value = match *self {
            Threshold::Fraction(fraction) => fraction,
            Threshold::Decibels(db) => 10f64.powf(db / 20.0),
        };
        if !(value > 0.0 && value <= 1.0) {
            return Err(Error::effect(
                Stage::Silence,
                format!("threshold {} is outside (0, full scale]", self),
            ));
        }
        Ok(value)
    }
}

fn strip_decibel_suffix(text: &str) -> Option<&str> {
    ["dB", "db", "DB", "d"]
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Threshold::Fraction(fraction) => write!(f, "{}%", fraction * 100.0),
            Threshold::Decibels(db) => write!(f, "{}dB", db),
        }
    }
}

/// Removes audio before the first sustained non-silent run
#[derive(Debug, Clone)]
pub struct SilenceTrim {
    above_frames: usize,
    threshold: f64,
}

impl SilenceTrim {
    /// `above_frames` of 0 is treated as 1: the first loud frame stops trimming
    pub fn new(above_frames: usize, threshold: Threshold) -> Result<Self> {
        Ok(Self {
            above_frames: above_frames.max(1),
            threshold: threshold.linear()?,
        })
    }

    /// Index of the first frame of the first run of `above_frames` loud frames
    fn sound_start(&self, buffer: &SampleBuffer) -> Option<usize> {
        let mut run = 0;
        for index in 0..buffer.frames() {
            let loud = buffer
                .frame(index)
                .iter()
                .any(|sample| sample.abs() > self.threshold);
            if loud {
                run += 1;
                if run == self.above_frames {
                    return Some(index + 1 - run);
                }
            } else {
                run = 0;
            }
        }
        None
    }
}

impl Effect for SilenceTrim {
    fn stage(&self) -> Stage {
        Stage::Silence
    }

    fn apply(&mut self, mut buffer: SampleBuffer) -> Result<SampleBuffer> {
        let start = self.sound_start(&buffer).unwrap_or_else(|| buffer.frames());
        buffer.samples.drain(..start * buffer.channels);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_forms() {
        assert_eq!(Threshold::parse("1%").unwrap(), Threshold::Fraction(0.01));
        assert_eq!(Threshold::parse(" 0.05 ").unwrap(), Threshold::Fraction(0.05));
        assert_eq!(Threshold::parse("-40dB").unwrap(), Threshold::Decibels(-40.0));
        assert_eq!(Threshold::parse("-40d").unwrap(), Threshold::Decibels(-40.0));
        assert!((Threshold::Decibels(-20.0).linear().unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_bad_thresholds() {
        for value in ["", "loud", "0", "150%", "6dB", "-x%"] {
            assert!(
                matches!(
                    Threshold::parse(value),
                    Err(Error::EffectConfiguration { stage: Stage::Silence, .. })
                ),
                "{:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_trims_until_sustained_sound() {
        // A lone click at index 1 is shorter than the 3-frame run required
        let samples = vec![0.0, 0.5, 0.0, 0.3, 0.4, 0.5, 0.0];
        let mut trim = SilenceTrim::new(3, Threshold::Fraction(0.1)).unwrap();
        let out = trim.apply(SampleBuffer::new(samples, 1)).unwrap();
        assert_eq!(out.samples, vec![0.3, 0.4, 0.5, 0.0]);
    }

    #[test]
    fn test_any_channel_counts_as_sound() {
        let samples = vec![0.0, 0.0, 0.0, -0.6, 0.2, 0.2];
        let mut trim = SilenceTrim::new(1, Threshold::Fraction(0.1)).unwrap();
        let out = trim.apply(SampleBuffer::new(samples, 2)).unwrap();
        assert_eq!(out.samples, vec![0.0, -0.6, 0.2, 0.2]);
    }

    #[test]
    fn test_all_silence_trims_everything() {
        let mut trim = SilenceTrim::new(1, Threshold::Fraction(0.1)).unwrap();
        let out = trim.apply(SampleBuffer::new(vec![0.01; 10], 1)).unwrap();
        assert!(out.samples.is_empty());
    }

    #[test]
    fn test_no_leading_silence_is_untouched() {
        let samples = vec![0.5, 0.5, 0.0, 0.5];
        let mut trim = SilenceTrim::new(2, Threshold::Fraction(0.1)).unwrap();
        let out = trim.apply(SampleBuffer::new(samples.clone(), 1)).unwrap();
        assert_eq!(out.samples, samples);
    }
}
