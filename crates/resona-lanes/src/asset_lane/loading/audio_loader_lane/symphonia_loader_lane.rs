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

//! Implements an asset loader for compressed audio formats using the
//! `symphonia` library.

use super::{check_channels, AudioDecodeError};
use crate::asset_lane::loading::AssetLoaderLane;
use resona_core::AudioFormat;
use resona_data::DecodedAudio;
use std::{error::Error, io::Cursor};
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};

/// An `AssetLoaderLane` that uses `symphonia` to decode FLAC, Ogg Vorbis and
/// MP3 data.
///
/// The lane is parameterized by the format it was registered for, which is
/// passed to the prober as an extension hint.
pub struct SymphoniaLoaderLane {
    format: AudioFormat,
}

impl SymphoniaLoaderLane {
    /// Creates a loader for `format`.
    pub fn new(format: AudioFormat) -> Self {
        Self { format }
    }

    /// The format this lane was registered for.
    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

impl AssetLoaderLane<DecodedAudio> for SymphoniaLoaderLane {
    fn load(&self, bytes: &[u8]) -> Result<DecodedAudio, Box<dyn Error + Send + Sync>> {
        // 1. Create a media source stream from the in-memory byte slice.
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        // 2. Probe for the container, hinting at the expected extension.
        let mut hint = Hint::new();
        hint.with_extension(self.format.extension());
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
        let mut format_reader = probed.format;

        // 3. Find the default audio track.
        let track = format_reader
            .default_track()
            .ok_or(AudioDecodeError::MissingParameter("default track"))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or(AudioDecodeError::MissingParameter("sample rate"))?;
        // Some containers only reveal the layout once the first packet decodes.
        let mut channel_count = track
            .codec_params
            .channels
            .map(|c| check_channels(c.count() as u16))
            .transpose()?;

        // 4. Create a decoder for the track.
        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs().make(&track.codec_params, &dec_opts)?;

        // 5. Decode all packets, converting and interleaving into i16.
        let mut samples = Vec::<i16>::new();

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                // End of stream
                Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(Box::new(e)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    if channel_count.is_none() {
                        channel_count = Some(check_channels(spec.channels.count() as u16)?);
                    }
                    // Symphonia gives us samples in planes (e.g., LLL..., RRR...).
                    // Convert and interleave them into LRLR... i16.
                    let mut sample_buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    sample_buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(sample_buf.samples());
                }
                // A corrupt packet is not fatal, the rest of the stream is kept.
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping undecodable {} packet: {}", self.format, e);
                }
                Err(e) => return Err(Box::new(e)),
            }
        }

        let channel_count =
            channel_count.ok_or(AudioDecodeError::MissingParameter("channel layout"))?;

        log::debug!(
            "Decoded {} stream: {} ch, {} Hz, {} samples",
            self.format,
            channel_count,
            sample_rate,
            samples.len()
        );

        Ok(DecodedAudio {
            channel_count,
            sample_rate,
            samples,
        })
    }
}

impl resona_core::lane::Lane for SymphoniaLoaderLane {
    fn strategy_name(&self) -> &'static str {
        "SymphoniaLoader"
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
