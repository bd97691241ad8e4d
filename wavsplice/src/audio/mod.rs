//! Audio stream access
//!
//! [`codec`] defines the seam the pipelines are written against; [`wav`]
//! implements it for PCM WAV files.

pub mod codec;
pub mod wav;

pub use codec::{read_to_end, AudioCodec, SampleEncoding, SampleReader, SampleWriter, SignalFormat};
pub use wav::WavCodec;
