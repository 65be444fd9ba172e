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

//! A registry of audio decoders, keyed by format.

use resona_core::{asset::AssetHandle, lane::Lane, AudioError, AudioFormat};
use resona_data::{AudioBuffer, DecodedAudio};
use resona_lanes::asset_lane::{loader_for, AssetLoaderLane};
use std::{collections::HashMap, path::Path, time::Instant};

/// Turns encoded audio into shared [`AudioBuffer`]s.
///
/// Every format enabled at compile time gets its default decoder lane;
/// [`register`](Self::register) replaces one.
pub struct SoundLoader {
    output_sample_rate: u32,
    loaders: HashMap<AudioFormat, Box<dyn AssetLoaderLane<DecodedAudio>>>,
}

impl SoundLoader {
    /// Creates a loader producing buffers for an `output_sample_rate` mix.
    pub fn new(output_sample_rate: u32) -> Self {
        let loaders = AudioFormat::ALL
            .into_iter()
            .filter_map(|format| loader_for(format).map(|lane| (format, lane)))
            .collect();
        Self {
            output_sample_rate,
            loaders,
        }
    }

    /// Registers `loader` for `format`, replacing any previous one.
    pub fn register(
        &mut self,
        format: AudioFormat,
        loader: impl AssetLoaderLane<DecodedAudio> + 'static,
    ) {
        log::debug!(
            "Registering {} for {} assets",
            loader.strategy_name(),
            format
        );
        self.loaders.insert(format, Box::new(loader));
    }

    /// Returns `true` if a decoder is registered for `format`.
    pub fn supports(&self, format: AudioFormat) -> bool {
        self.loaders.contains_key(&format)
    }

    /// Decodes an in-memory file of a known format.
    ///
    /// # Errors
    /// [`AudioError::UnsupportedFormat`] if no decoder is registered for
    /// `format`, [`AudioError::Decode`] if the data is malformed or its layout
    /// cannot be mixed.
    pub fn load_from_memory(
        &self,
        format: AudioFormat,
        bytes: &[u8],
    ) -> Result<AssetHandle<AudioBuffer>, AudioError> {
        let loader = self
            .loaders
            .get(&format)
            .ok_or_else(|| AudioError::UnsupportedFormat {
                name: format!("{format} (not enabled in this build)"),
            })?;

        let started = Instant::now();
        let decoded = loader
            .load(bytes)
            .map_err(|e| AudioError::decode(format, e))?;
        let buffer = AudioBuffer::from_decoded(format, decoded, self.output_sample_rate)?;
        log::debug!(
            "{} decoded {:.3}s of audio in {:?}",
            loader.strategy_name(),
            buffer.time_length(),
            started.elapsed()
        );

        Ok(AssetHandle::new(buffer))
    }

    /// Reads and decodes a file, picking the decoder from its extension.
    ///
    /// # Errors
    /// [`AudioError::UnsupportedFormat`] for an unknown or disabled extension,
    /// [`AudioError::Load`] if the file cannot be read, and the decoding
    /// errors of [`load_from_memory`](Self::load_from_memory).
    pub fn load_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<AssetHandle<AudioBuffer>, AudioError> {
        let path = path.as_ref();
        let format = AudioFormat::from_path(path)?;
        if !self.supports(format) {
            return Err(AudioError::UnsupportedFormat {
                name: format!("{format} (not enabled in this build)"),
            });
        }

        let bytes = std::fs::read(path).map_err(|source| AudioError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let buffer = self.load_from_memory(format, &bytes)?;
        log::info!("Loaded sound '{}'", path.display());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resona_core::lane::LaneKind;
    use std::error::Error;

    struct ConstantLoader;

    impl Lane for ConstantLoader {
        fn strategy_name(&self) -> &'static str {
            "ConstantLoader"
        }

        fn lane_kind(&self) -> LaneKind {
            LaneKind::Asset
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    impl AssetLoaderLane<DecodedAudio> for ConstantLoader {
        fn load(&self, bytes: &[u8]) -> Result<DecodedAudio, Box<dyn Error + Send + Sync>> {
            if bytes.is_empty() {
                return Err("empty input".into());
            }
            Ok(DecodedAudio {
                channel_count: 1,
                sample_rate: 8000,
                samples: bytes.iter().map(|&b| b as i16).collect(),
            })
        }
    }

    #[test]
    fn test_registered_loader_replaces_default() {
        let mut loader = SoundLoader::new(8000);
        loader.register(AudioFormat::Wav, ConstantLoader);

        let buffer = loader.load_from_memory(AudioFormat::Wav, &[1, 2, 3]).unwrap();
        assert_eq!(buffer.samples(), &[1, 2, 3]);
        assert_eq!(buffer.format(), AudioFormat::Wav);
    }

    #[test]
    fn test_decoder_failure_is_a_decode_error() {
        let mut loader = SoundLoader::new(8000);
        loader.register(AudioFormat::Qoa, ConstantLoader);

        let err = loader.load_from_memory(AudioFormat::Qoa, &[]).unwrap_err();
        assert!(matches!(err, AudioError::Decode { format: AudioFormat::Qoa, .. }));
        assert!(err.to_string().contains("empty input"));
    }

    #[test]
    fn test_unknown_extension_is_rejected_before_reading() {
        let loader = SoundLoader::new(48000);
        let err = loader.load_path("/definitely/missing/file.xyz").unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let loader = SoundLoader::new(48000);
        let err = loader.load_path("/definitely/missing/file.wav").unwrap_err();
        assert!(matches!(err, AudioError::Load { .. }));
    }
}
