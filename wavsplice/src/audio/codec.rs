//! Codec abstraction used by the splice, trim and duration pipelines
//!
//! Samples cross this boundary as interleaved `f64` values normalised to
//! [-1.0, 1.0]. A frame is one sample for each channel.

use crate::error::{Error, Result, Stage};
use serde::Serialize;
use std::path::Path;

/// Sample encoding of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleEncoding {
    Int,
    Float,
}

/// Signal metadata of an open stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub encoding: SampleEncoding,
}

impl SignalFormat {
    /// 16-bit integer PCM
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample: 16,
            encoding: SampleEncoding::Int,
        }
    }

    /// Whether this stream can be spliced onto a job whose first input had
    /// `reference`. Only rate and channel count have to agree; bit depth and
    /// encoding are normalised away when samples are read.
    pub fn matches_reference(&self, reference: &SignalFormat) -> bool {
        self.sample_rate == reference.sample_rate && self.channels == reference.channels
    }
}

impl std::fmt::Display for SignalFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoding = match self.encoding {
            SampleEncoding::Int => "int",
            SampleEncoding::Float => "float",
        };
        write!(
            f,
            "{} Hz, {} ch, {}-bit {}",
            self.sample_rate, self.channels, self.bits_per_sample, encoding
        )
    }
}

/// An input stream open for reading. Dropping it closes the stream.
pub trait SampleReader {
    /// Path the stream was opened from
    fn path(&self) -> &Path;

    /// Signal format of the stream
    fn format(&self) -> SignalFormat;

    /// Total length in frames, when the container records it
    fn length_frames(&self) -> Option<u64>;

    /// Append up to `max_frames` frames of interleaved samples to `buf`.
    ///
    /// Returns the number of frames appended; 0 signals end of stream.
    fn read(&mut self, buf: &mut Vec<f64>, max_frames: usize) -> Result<usize>;
}

/// An output stream open for writing
pub trait SampleWriter {
    /// Signal format the stream was opened with
    fn format(&self) -> SignalFormat;

    /// Write interleaved samples, returning the number of samples written
    fn write(&mut self, samples: &[f64]) -> Result<usize>;

    /// Flush and close the stream, returning the frames written
    fn finalize(self) -> Result<u64>
    where
        Self: Sized;
}

/// Opens sample streams for a container format
pub trait AudioCodec {
    type Reader: SampleReader;
    type Writer: SampleWriter;

    fn open_read(&self, path: &Path) -> Result<Self::Reader>;

    fn open_write(&self, path: &Path, format: &SignalFormat) -> Result<Self::Writer>;
}

/// Chunk size used when draining a reader
pub(crate) const READ_CHUNK_FRAMES: usize = 4096;

/// Read every remaining frame of `reader`
pub fn read_to_end<R: SampleReader>(reader: &mut R) -> Result<Vec<f64>> {
    let channels = reader.format().channels as usize;
    let capacity = reader
        .length_frames()
        .map(|frames| frames as usize * channels)
        .unwrap_or(0);
    let mut samples = Vec::with_capacity(capacity);
    while reader.read(&mut samples, READ_CHUNK_FRAMES)? > 0 {}
    Ok(samples)
}

/// Read until `frames` frames have been appended or the stream ends
pub(crate) fn read_frames<R: SampleReader>(
    reader: &mut R,
    buf: &mut Vec<f64>,
    frames: usize,
) -> Result<usize> {
    let mut total = 0;
    while total < frames {
        let got = reader.read(buf, frames - total)?;
        if got == 0 {
            break;
        }
        total += got;
    }
    Ok(total)
}

/// Write all of `samples`, treating a short write as a flow failure
pub(crate) fn write_all<W: SampleWriter>(writer: &mut W, samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }
    let written = writer.write(samples)?;
    if written != samples.len() {
        return Err(Error::flow(
            Stage::Output,
            format!("short write: {} of {} samples", written, samples.len()),
        ));
    }
    Ok(())
}
