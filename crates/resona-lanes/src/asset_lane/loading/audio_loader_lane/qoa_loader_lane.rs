// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Implements an asset loader for the Quite OK Audio format.
//!
//! A QOA file is an 8-byte header (`qoaf` magic, u32 samples per channel)
//! followed by frames. Each frame carries its own layout header, a 4-tap LMS
//! predictor state per channel, and 64-bit slices of 20 samples quantized to
//! 3 bits against one of 16 scalefactors. All fields are big-endian.

use super::AudioDecodeError;
use crate::asset_lane::loading::AssetLoaderLane;
use resona_data::DecodedAudio;
use std::error::Error;
use thiserror::Error;

const QOA_MAGIC: u32 = u32::from_be_bytes(*b"qoaf");
const SLICE_LEN: usize = 20;
const LMS_LEN: usize = 4;
const FRAME_HEADER_SIZE: usize = 8;
/// History and weights, 4 × i16 each.
const LMS_STATE_SIZE: usize = 16;

const SCALEFACTORS: [i32; 16] = [
    1, 7, 21, 45, 84, 138, 211, 304, 421, 562, 731, 928, 1157, 1419, 1715, 2048,
];

/// Quantized residual levels, in quarters: 0.75, -0.75, 2.5, -2.5, ...
const DEQUANT_QUARTERS: [i32; 8] = [3, -3, 10, -10, 18, -18, 28, -28];

const DEQUANT: [[i32; 8]; 16] = build_dequant_table();

const fn build_dequant_table() -> [[i32; 8]; 16] {
    let mut table = [[0; 8]; 16];
    let mut s = 0;
    while s < 16 {
        let mut q = 0;
        while q < 8 {
            // Round half away from zero.
            let n = SCALEFACTORS[s] * DEQUANT_QUARTERS[q];
            table[s][q] = if n >= 0 { (n + 2) / 4 } else { -((-n + 2) / 4) };
            q += 1;
        }
        s += 1;
    }
    table
}

/// Errors raised while parsing a QOA stream.
#[derive(Debug, Error)]
pub enum QoaError {
    /// The first four bytes are not `qoaf`.
    #[error("missing \"qoaf\" magic")]
    BadMagic,
    /// The data ends before a complete structure could be read.
    #[error("truncated {0}")]
    Truncated(&'static str),
    /// A frame header is inconsistent.
    #[error("frame {index}: {reason}")]
    BadFrame {
        /// Zero-based frame position in the file.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// The stream layout is valid QOA but cannot be mixed.
    #[error(transparent)]
    Layout(#[from] AudioDecodeError),
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn peek_u64(&self, what: &'static str) -> Result<u64, QoaError> {
        let chunk = self
            .bytes
            .get(self.pos..self.pos + 8)
            .ok_or(QoaError::Truncated(what))?;
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        Ok(u64::from_be_bytes(word))
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64, QoaError> {
        let word = self.peek_u64(what)?;
        self.pos += 8;
        Ok(word)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Lms {
    history: [i32; LMS_LEN],
    weights: [i32; LMS_LEN],
}

impl Lms {
    fn from_words(mut history: u64, mut weights: u64) -> Self {
        let mut lms = Self::default();
        for i in 0..LMS_LEN {
            lms.history[i] = (history >> 48) as u16 as i16 as i32;
            lms.weights[i] = (weights >> 48) as u16 as i16 as i32;
            history <<= 16;
            weights <<= 16;
        }
        lms
    }

    fn predict(&self) -> i64 {
        let sum: i64 = self
            .history
            .iter()
            .zip(&self.weights)
            .map(|(&h, &w)| h as i64 * w as i64)
            .sum();
        sum >> 13
    }

    fn update(&mut self, sample: i32, residual: i32) {
        let delta = residual >> 4;
        for (weight, &history) in self.weights.iter_mut().zip(&self.history) {
            *weight = weight.wrapping_add(if history < 0 { -delta } else { delta });
        }
        self.history.rotate_left(1);
        self.history[LMS_LEN - 1] = sample;
    }
}

struct FrameHeader {
    channels: u16,
    sample_rate: u32,
    samples: usize,
    size: usize,
}

impl FrameHeader {
    fn parse(word: u64) -> Self {
        Self {
            channels: ((word >> 56) & 0xff) as u16,
            sample_rate: ((word >> 32) & 0xff_ffff) as u32,
            samples: ((word >> 16) & 0xffff) as usize,
            size: (word & 0xffff) as usize,
        }
    }
}

/// Decodes a complete QOA file into interleaved 16-bit samples.
///
/// Files declaring 0 total samples are treated as streams and decoded until
/// the data runs out.
pub fn decode_qoa(bytes: &[u8]) -> Result<DecodedAudio, QoaError> {
    let mut reader = ByteReader::new(bytes);
    let file_header = reader.read_u64("file header")?;
    if (file_header >> 32) as u32 != QOA_MAGIC {
        return Err(QoaError::BadMagic);
    }
    let total_frames = (file_header & 0xffff_ffff) as usize;

    let first = FrameHeader::parse(reader.peek_u64("frame header")?);
    let channels = super::check_channels(first.channels)?;
    let sample_rate = first.sample_rate;
    if sample_rate == 0 {
        return Err(QoaError::BadFrame {
            index: 0,
            reason: "sample rate is zero".into(),
        });
    }

    let channel_count = channels as usize;
    let expected = total_frames * channel_count;
    // Every 8-byte slice holds at most 20 samples of one channel.
    let holdable = reader.remaining() / 8 * SLICE_LEN;
    if expected > holdable {
        return Err(QoaError::Truncated("frame data"));
    }
    let mut samples = Vec::with_capacity(if total_frames == 0 { holdable } else { expected });
    let mut index = 0;
    while reader.remaining() > 0 && (total_frames == 0 || samples.len() < expected) {
        decode_frame(&mut reader, index, channels, sample_rate, &mut samples)?;
        index += 1;
    }

    if total_frames != 0 {
        if samples.len() < expected {
            return Err(QoaError::Truncated("frame data"));
        }
        samples.truncate(expected);
    }

    Ok(DecodedAudio {
        channel_count: channels,
        sample_rate,
        samples,
    })
}

fn decode_frame(
    reader: &mut ByteReader<'_>,
    index: usize,
    channels: u16,
    sample_rate: u32,
    out: &mut Vec<i16>,
) -> Result<(), QoaError> {
    let bad_frame = |reason: &str| QoaError::BadFrame {
        index,
        reason: reason.to_string(),
    };

    let frame_start = reader.pos;
    let header = FrameHeader::parse(reader.read_u64("frame header")?);
    if header.channels != channels || header.sample_rate != sample_rate {
        return Err(bad_frame("channel layout or sample rate changed mid-stream"));
    }

    let channel_count = channels as usize;
    let prelude = FRAME_HEADER_SIZE + LMS_STATE_SIZE * channel_count;
    if header.size < prelude {
        return Err(bad_frame("frame size smaller than its header"));
    }
    let slice_capacity = (header.size - prelude) / 8;
    let slices_needed = header.samples.div_ceil(SLICE_LEN) * channel_count;
    if slices_needed > slice_capacity {
        return Err(bad_frame("declares more samples than it holds"));
    }
    if reader.remaining() < header.size - FRAME_HEADER_SIZE {
        return Err(QoaError::Truncated("frame data"));
    }

    let mut lms = Vec::with_capacity(channel_count);
    for _ in 0..channel_count {
        let history = reader.read_u64("LMS history")?;
        let weights = reader.read_u64("LMS weights")?;
        lms.push(Lms::from_words(history, weights));
    }

    let base = out.len();
    out.resize(base + header.samples * channel_count, 0);

    for slice_start in (0..header.samples).step_by(SLICE_LEN) {
        let slice_end = (slice_start + SLICE_LEN).min(header.samples);
        for (c, state) in lms.iter_mut().enumerate() {
            let mut slice = reader.read_u64("slice")?;
            let scalefactor = ((slice >> 60) & 0xf) as usize;
            slice <<= 4;

            for si in slice_start..slice_end {
                let quantized = ((slice >> 61) & 0x7) as usize;
                let dequantized = DEQUANT[scalefactor][quantized];
                let reconstructed = (state.predict() + dequantized as i64)
                    .clamp(i16::MIN as i64, i16::MAX as i64) as i32;

                out[base + si * channel_count + c] = reconstructed as i16;
                slice <<= 3;
                state.update(reconstructed, dequantized);
            }
        }
    }

    // Frames may be padded past their last slice.
    reader.pos = frame_start + header.size;
    Ok(())
}

/// An `AssetLoaderLane` that decodes Quite OK Audio files.
#[derive(Default)]
pub struct QoaLoaderLane;

impl QoaLoaderLane {
    /// Creates a new instance of `QoaLoaderLane`.
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoaderLane<DecodedAudio> for QoaLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<DecodedAudio, Box<dyn Error + Send + Sync>> {
        Ok(decode_qoa(bytes)?)
    }
}

impl resona_core::lane::Lane for QoaLoaderLane {
    fn strategy_name(&self) -> &'static str {
        "QoaLoader"
    }

    fn lane_kind(&self) -> resona_core::lane::LaneKind {
        resona_core::lane::LaneKind::Asset
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
