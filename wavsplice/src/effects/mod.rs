//! In-memory effects chain
//!
//! Each [`Effect`] consumes a [`SampleBuffer`] and hands on a new one. The
//! chain runs its effects in insertion order and stops at the first error.

pub mod reverse;
pub mod silence;

pub use reverse::Reverse;
pub use silence::{SilenceTrim, Threshold};

use crate::error::{Result, Stage};
use tracing::debug;

/// Interleaved samples with their channel count
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub samples: Vec<f64>,
    pub channels: usize,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f64>, channels: usize) -> Self {
        Self { samples, channels }
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    /// Samples of frame `index`
    pub fn frame(&self, index: usize) -> &[f64] {
        &self.samples[index * self.channels..(index + 1) * self.channels]
    }
}

/// One stage of an effects chain
pub trait Effect: Send {
    /// Stage reported in errors and logs
    fn stage(&self) -> Stage;

    fn apply(&mut self, buffer: SampleBuffer) -> Result<SampleBuffer>;
}

/// Ordered list of effects
#[derive(Default)]
pub struct EffectsChain {
    effects: Vec<Box<dyn Effect>>,
}

impl EffectsChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect to the end of the chain
    pub fn with(mut self, effect: impl Effect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run `buffer` through every effect in order
    pub fn run(&mut self, mut buffer: SampleBuffer) -> Result<SampleBuffer> {
        for effect in &mut self.effects {
            let before = buffer.frames();
            buffer = effect.apply(buffer)?;
            debug!("{} effect: {} -> {} frames", effect.stage(), before, buffer.frames());
        }
        Ok(buffer)
    }
}
