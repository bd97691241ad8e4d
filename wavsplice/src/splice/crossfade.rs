//! Streaming crossfade join
//!
//! The splicer keeps the last `overlap + search` frames of produced audio
//! in a pending buffer instead of writing them straight away. When the next
//! input starts, its head is read, a join offset is chosen inside the search
//! window, and the held tail and the head are mixed with the fade curve.
//! Frames before the join are written unchanged; frames of the tail past the
//! mixed region are dropped.
//!
//! Output length for inputs of `L1..Ln` frames is
//! `ΣL - Σoverlap_k - Σoffset_k`, where `overlap_k` is the configured
//! overlap clamped to the frames available on both sides of join `k`.

use crate::audio::codec::{read_frames, write_all, SampleReader, SampleWriter, READ_CHUNK_FRAMES};
use crate::error::Result;
use tracing::debug;
use wavsplice_common::FadeCurve;

/// Frames compared when scoring a candidate join offset
const COMPARE_FRAMES: usize = 1024;

/// Outcome of one join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Join {
    pub overlap_frames: usize,
    pub offset_frames: usize,
}

pub(crate) struct Splicer {
    channels: usize,
    overlap: usize,
    search: usize,
    curve: FadeCurve,
    pending: Vec<f64>,
}

impl Splicer {
    pub fn new(channels: usize, overlap: usize, search: usize, curve: FadeCurve) -> Self {
        Self {
            channels,
            overlap,
            search,
            curve,
            pending: Vec::with_capacity((overlap + search + READ_CHUNK_FRAMES) * channels),
        }
    }

    fn holdback(&self) -> usize {
        self.overlap + self.search
    }

    fn pending_frames(&self) -> usize {
        self.pending.len() / self.channels
    }

    /// Copy the rest of `reader` through, holding back the join region
    pub fn stream<R: SampleReader, W: SampleWriter>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<()> {
        while reader.read(&mut self.pending, READ_CHUNK_FRAMES)? > 0 {
            self.flush(writer, self.holdback())?;
        }
        Ok(())
    }

    /// Crossfade the head of `reader` onto the held tail
    pub fn join<R: SampleReader>(&mut self, reader: &mut R) -> Result<Join> {
        let ch = self.channels;
        if self.overlap == 0 {
            return Ok(Join {
                overlap_frames: 0,
                offset_frames: 0,
            });
        }

        let mut head = Vec::with_capacity(self.overlap * ch);
        let head_frames = read_frames(reader, &mut head, self.overlap)?;
        let tail_frames = self.pending_frames();

        let overlap = self.overlap.min(head_frames).min(tail_frames);
        if overlap == 0 {
            self.pending.extend_from_slice(&head);
            return Ok(Join {
                overlap_frames: 0,
                offset_frames: 0,
            });
        }

        let max_offset = self.search.min(tail_frames - overlap);
        let offset = find_join_offset(&self.pending, &head, ch, overlap, max_offset);
        let start = tail_frames - overlap - offset;

        crossfade_into(
            &mut self.pending[start * ch..(start + overlap) * ch],
            &head[..overlap * ch],
            ch,
            self.curve,
        );
        self.pending.truncate((start + overlap) * ch);
        self.pending.extend_from_slice(&head[overlap * ch..]);

        debug!(
            "Joined at {} frames before the end of held audio: overlap {} frames, offset {}",
            overlap + offset,
            overlap,
            offset
        );

        Ok(Join {
            overlap_frames: overlap,
            offset_frames: offset,
        })
    }

    /// Write everything still held
    pub fn finish<W: SampleWriter>(&mut self, writer: &mut W) -> Result<()> {
        self.flush(writer, 0)
    }

    fn flush<W: SampleWriter>(&mut self, writer: &mut W, keep_frames: usize) -> Result<()> {
        let frames = self.pending_frames();
        if frames <= keep_frames {
            return Ok(());
        }
        let end = (frames - keep_frames) * self.channels;
        write_all(writer, &self.pending[..end])?;
        self.pending.drain(..end);
        Ok(())
    }
}

/// Pick how many frames earlier than the natural join to start the overlap.
///
/// Candidates `0..=max_offset` are scored by the squared difference between
/// the held tail at the candidate start and the head of the next input over a
/// short comparison window; the lowest score wins, ties going to the smaller offset.
pub(crate) fn find_join_offset(
    pending: &[f64],
    head: &[f64],
    channels: usize,
    overlap: usize,
    max_offset: usize,
) -> usize {
    if max_offset == 0 {
        return 0;
    }

    let tail_frames = pending.len() / channels;
    let compared = overlap.min(COMPARE_FRAMES) * channels;

    let mut best_offset = 0;
    let mut best_score = f64::INFINITY;
    for offset in 0..=max_offset {
        let start = (tail_frames - overlap - offset) * channels;
        let score: f64 = pending[start..start + compared]
            .iter()
            .zip(&head[..compared])
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        if score < best_score {
            best_score = score;
            best_offset = offset;
        }
    }
    best_offset
}

/// Mix `head` into `tail` in place: tail fades out while head fades in
pub(crate) fn crossfade_into(tail: &mut [f64], head: &[f64], channels: usize, curve: FadeCurve) {
    let frames = tail.len() / channels;
    for frame in 0..frames {
        let position = (frame as f32 + 0.5) / frames as f32;
        let fade_out = curve.fade_out_gain(position) as f64;
        let fade_in = curve.fade_in_gain(position) as f64;
        for c in 0..channels {
            let i = frame * channels + c;
            tail[i] = tail[i] * fade_out + head[i] * fade_in;
        }
    }
}
