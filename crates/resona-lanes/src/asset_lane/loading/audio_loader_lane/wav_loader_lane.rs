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

//! Implements an asset loader for `.wav` audio files.

use super::{check_channels, AudioDecodeError};
use crate::asset_lane::loading::AssetLoaderLane;
use resona_core::audio::I16_NORMALIZER;
use resona_data::DecodedAudio;
use std::{error::Error, io::Cursor};

/// An `AssetLoaderLane` that decodes PCM data from the WAV format.
///
/// 16-bit integer samples are copied as-is. 8, 24 and 32-bit integer and
/// 32-bit float samples are rescaled to 16 bits.
#[derive(Default)]
pub struct WavLoaderLane;

impl WavLoaderLane {
    /// Creates a new instance of `WavLoaderLane`.
    pub fn new() -> Self {
        Self
    }
}

/// Shifts an integer sample of `bits` width into the 16-bit range.
fn rescale_int(sample: i32, bits: u16) -> i16 {
    if bits <= 16 {
        (sample << (16 - bits)) as i16
    } else {
        (sample >> (bits - 16)) as i16
    }
}

fn float_to_i16(sample: f32) -> i16 {
    (sample * I16_NORMALIZER)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl AssetLoaderLane<DecodedAudio> for WavLoaderLane {
    /// Parses a byte slice representing a `.wav` file into `DecodedAudio`.
    fn load(&self, bytes: &[u8]) -> Result<DecodedAudio, Box<dyn Error + Send + Sync>> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channel_count = check_channels(spec.channels)?;

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Int, 16) => {
                reader.samples::<i16>().collect::<Result<_, _>>()?
            }
            (hound::SampleFormat::Int, bits @ (8 | 24 | 32)) => reader
                .samples::<i32>()
                .map(|s| s.map(|v| rescale_int(v, bits)))
                .collect::<Result<_, _>>()?,
            (hound::SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(float_to_i16))
                .collect::<Result<_, _>>()?,
            (format, bits) => {
                let kind = match format {
                    hound::SampleFormat::Int => "integer",
                    hound::SampleFormat::Float => "float",
                };
                let encoding = format!("{bits}-bit {kind} PCM");
                return Err(AudioDecodeError::UnsupportedEncoding(encoding).into());
            }
        };

        Ok(DecodedAudio {
            channel_count,
            sample_rate: spec.sample_rate,
            samples,
        })
    }
}

impl resona_core::lane::Lane for WavLoaderLane {
    fn strategy_name(&self) -> &'static str {
        "WavLoader"
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

#[cfg(test)]
mod tests {
    use super::*;

    // A WAV file 16-bit, mono, 44100Hz, containing 4 samples (0.1, -0.1, 0.2, -0.2).
    const TEST_WAV_BYTES: &[u8] = &[
        82, 73, 70, 70, 52, 0, 0, 0, 87, 65, 86, 69, 102, 109, 116, 32, 16, 0, 0, 0, 1, 0, 1, 0,
        68, 172, 0, 0, 136, 88, 1, 0, 2, 0, 16, 0, 100, 97, 116, 97, 8, 0, 0, 0, 0, 12, 204, 251,
        51, 13, 205, 243,
    ];

    fn encode<S: hound::Sample + Copy>(spec: hound::WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_wav_loader_success() {
        let loader = WavLoaderLane::new();
        let decoded = loader.load(TEST_WAV_BYTES).expect("The WAV loading should not fail");

        assert_eq!(decoded.sample_rate, 44100, "The sample rate is incorrect");
        assert_eq!(decoded.channel_count, 1, "The number of channels is incorrect");
        assert_eq!(decoded.samples, vec![3072, -1076, 3379, -3123]);
    }

    #[test]
    fn test_wav_loader_invalid_bytes() {
        let loader = WavLoaderLane::new();
        let invalid_bytes = &[0, 1, 2, 3, 4];
        let result = loader.load(invalid_bytes);

        assert!(result.is_err(), "The loading of invalid bytes should fail");
    }

    #[test]
    fn test_wav_loader_rescales_other_depths() {
        let int8 = encode(
            hound::WavSpec {
                channels: 2,
                sample_rate: 8000,
                bits_per_sample: 8,
                sample_format: hound::SampleFormat::Int,
            },
            &[64i8, -128],
        );
        let decoded = WavLoaderLane::new().load(&int8).unwrap();
        assert_eq!(decoded.channel_count, 2);
        assert_eq!(decoded.samples, vec![64 << 8, i16::MIN]);

        let float = encode(
            hound::WavSpec {
                channels: 1,
                sample_rate: 8000,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
            &[0.5f32, -1.0, 2.0],
        );
        let decoded = WavLoaderLane::new().load(&float).unwrap();
        assert_eq!(decoded.samples, vec![16384, -32767, i16::MAX]);
    }

    #[test]
    fn test_wav_loader_rejects_surround() {
        let bytes = encode(
            hound::WavSpec {
                channels: 3,
                sample_rate: 8000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            &[0i16; 3],
        );
        let err = WavLoaderLane::new().load(&bytes).unwrap_err();
        assert!(err.to_string().contains("3 channels"));
    }
}
