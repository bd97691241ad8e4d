//! Test helpers for wavsplice integration tests
//!
//! Each integration test binary uses a different subset.
#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{
    frame_count, generate_padded_tone, generate_silent_wav, generate_sine_wav, read_samples,
    TEST_SAMPLE_RATE,
};
