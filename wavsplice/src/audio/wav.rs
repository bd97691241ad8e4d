//! PCM WAV codec using hound
//!
//! Integer PCM (8 to 32 bits) is scaled by 2^(bits-1) and 32-bit float is
//! widened to `f64`, so samples that pass through unchanged are written back
//! bit-for-bit.

use super::codec::{AudioCodec, SampleEncoding, SampleReader, SampleWriter, SignalFormat};
use crate::error::{Error, Result, Stage};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Codec for `.wav` files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl AudioCodec for WavCodec {
    type Reader = WavSampleReader;
    type Writer = WavSampleWriter;

    fn open_read(&self, path: &Path) -> Result<WavSampleReader> {
        WavSampleReader::open(path)
    }

    fn open_write(&self, path: &Path, format: &SignalFormat) -> Result<WavSampleWriter> {
        WavSampleWriter::create(path, format)
    }
}

fn to_signal_format(spec: &WavSpec) -> SignalFormat {
    SignalFormat {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        encoding: match spec.sample_format {
            SampleFormat::Int => SampleEncoding::Int,
            SampleFormat::Float => SampleEncoding::Float,
        },
    }
}

fn to_wav_spec(format: &SignalFormat) -> WavSpec {
    WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: match format.encoding {
            SampleEncoding::Int => SampleFormat::Int,
            SampleEncoding::Float => SampleFormat::Float,
        },
    }
}

/// Check a format is one this codec can carry, returning the integer scale
fn check_format(format: &SignalFormat) -> std::result::Result<f64, String> {
    if format.sample_rate == 0 {
        return Err("sample rate is zero".to_string());
    }
    if format.channels == 0 {
        return Err("channel count is zero".to_string());
    }
    match format.encoding {
        SampleEncoding::Int if (8..=32).contains(&format.bits_per_sample) => {
            Ok((1u64 << (format.bits_per_sample - 1)) as f64)
        }
        SampleEncoding::Float if format.bits_per_sample == 32 => Ok(1.0),
        _ => Err(format!("unsupported sample format ({})", format)),
    }
}

/// An open `.wav` input
pub struct WavSampleReader {
    path: PathBuf,
    reader: WavReader<BufReader<File>>,
    format: SignalFormat,
    scale: f64,
}

impl WavSampleReader {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path).map_err(|e| Error::open(path, e))?;
        let format = to_signal_format(&reader.spec());
        let scale = check_format(&format).map_err(|reason| Error::open(path, reason))?;

        debug!(
            "Opened {} for reading: {}, {} frames",
            path.display(),
            format,
            reader.duration()
        );

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            format,
            scale,
        })
    }
}

impl SampleReader for WavSampleReader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> SignalFormat {
        self.format
    }

    fn length_frames(&self) -> Option<u64> {
        Some(self.reader.duration() as u64)
    }

    fn read(&mut self, buf: &mut Vec<f64>, max_frames: usize) -> Result<usize> {
        let channels = self.format.channels as usize;
        let wanted = max_frames * channels;
        let before = buf.len();

        match self.format.encoding {
            SampleEncoding::Int => {
                let scale = self.scale;
                for sample in self.reader.samples::<i32>().take(wanted) {
                    let sample = sample.map_err(|e| Error::flow(Stage::Input, e))?;
                    buf.push(sample as f64 / scale);
                }
            }
            SampleEncoding::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    let sample = sample.map_err(|e| Error::flow(Stage::Input, e))?;
                    buf.push(sample as f64);
                }
            }
        }

        let read = buf.len() - before;
        if read % channels != 0 {
            return Err(Error::flow(
                Stage::Input,
                format!("{} ends in a partial frame", self.path.display()),
            ));
        }
        Ok(read / channels)
    }
}

/// An open `.wav` output
pub struct WavSampleWriter {
    path: PathBuf,
    writer: WavWriter<BufWriter<File>>,
    format: SignalFormat,
    scale: f64,
    samples_written: u64,
}

impl WavSampleWriter {
    pub fn create(path: &Path, format: &SignalFormat) -> Result<Self> {
        let scale = check_format(format).map_err(|reason| Error::open(path, reason))?;
        let writer = WavWriter::create(path, to_wav_spec(format)).map_err(|e| Error::open(path, e))?;

        debug!("Opened {} for writing: {}", path.display(), format);

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            format: *format,
            scale,
            samples_written: 0,
        })
    }

    fn quantize(&self, sample: f64) -> i32 {
        let max = self.scale - 1.0;
        let min = -self.scale;
        (sample * self.scale).round().clamp(min, max) as i32
    }
}

impl SampleWriter for WavSampleWriter {
    fn format(&self) -> SignalFormat {
        self.format
    }

    fn write(&mut self, samples: &[f64]) -> Result<usize> {
        let channels = self.format.channels as usize;
        if samples.len() % channels != 0 {
            return Err(Error::flow(
                Stage::Output,
                format!("{} samples is not a whole number of frames", samples.len()),
            ));
        }

        for &sample in samples {
            let result = match self.format.encoding {
                SampleEncoding::Int => {
                    let value = self.quantize(sample);
                    self.writer.write_sample(value)
                }
                SampleEncoding::Float => self.writer.write_sample(sample as f32),
            };
            result.map_err(|e| Error::flow(Stage::Output, format!("{}: {}", self.path.display(), e)))?;
        }

        self.samples_written += samples.len() as u64;
        Ok(samples.len())
    }

    fn finalize(self) -> Result<u64> {
        let frames = self.samples_written / self.format.channels as u64;
        let path = self.path;
        self.writer
            .finalize()
            .map_err(|e| Error::flow(Stage::Output, format!("{}: {}", path.display(), e)))?;
        debug!("Closed {} after {} frames", path.display(), frames);
        Ok(frames)
    }
}
