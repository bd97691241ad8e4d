//! Frame-order reversal

use super::{Effect, SampleBuffer};
use crate::error::{Result, Stage};

/// Reverses the order of frames, keeping channel order within each frame
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl Effect for Reverse {
    fn stage(&self) -> Stage {
        Stage::Reverse
    }

    fn apply(&mut self, buffer: SampleBuffer) -> Result<SampleBuffer> {
        let channels = buffer.channels.max(1);
        let samples = buffer
            .samples
            .chunks_exact(channels)
            .rev()
            .flatten()
            .copied()
            .collect();
        Ok(SampleBuffer::new(samples, buffer.channels))
    }
}
