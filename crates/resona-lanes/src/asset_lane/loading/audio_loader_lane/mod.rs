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

//! Audio decoders, one lane per encoding family.
//!
//! Every decoder produces [`DecodedAudio`]: interleaved signed 16-bit samples,
//! mono or stereo. Which decoders exist is decided at compile time by the
//! `wav`, `flac`, `ogg`, `mp3` and `qoa` cargo features.

#[cfg(feature = "qoa")]
mod qoa_loader_lane;
#[cfg(any(feature = "flac", feature = "ogg", feature = "mp3"))]
mod symphonia_loader_lane;
#[cfg(feature = "wav")]
mod wav_loader_lane;

#[cfg(feature = "qoa")]
pub use qoa_loader_lane::*;
#[cfg(any(feature = "flac", feature = "ogg", feature = "mp3"))]
pub use symphonia_loader_lane::*;
#[cfg(feature = "wav")]
pub use wav_loader_lane::*;

use super::AssetLoaderLane;
use resona_core::AudioFormat;
use resona_data::DecodedAudio;
use thiserror::Error;

/// Failures shared by every audio decoder.
#[derive(Debug, Error)]
pub enum AudioDecodeError {
    /// The stream has a channel layout the engine cannot mix.
    #[error("{0} channels (only mono and stereo are supported)")]
    UnsupportedChannels(u16),
    /// The sample encoding is recognized but not handled.
    #[error("unsupported sample encoding: {0}")]
    UnsupportedEncoding(String),
    /// The container did not declare a parameter the decoder needs.
    #[error("stream does not declare its {0}")]
    MissingParameter(&'static str),
}

pub(crate) fn check_channels(channels: u16) -> Result<u16, AudioDecodeError> {
    match channels {
        1 | 2 => Ok(channels),
        other => Err(AudioDecodeError::UnsupportedChannels(other)),
    }
}

/// Returns `true` if this build can decode `format`.
pub fn is_format_enabled(format: AudioFormat) -> bool {
    match format {
        AudioFormat::Wav => cfg!(feature = "wav"),
        AudioFormat::Flac => cfg!(feature = "flac"),
        AudioFormat::Qoa => cfg!(feature = "qoa"),
        AudioFormat::Ogg => cfg!(feature = "ogg"),
        AudioFormat::Mp3 => cfg!(feature = "mp3"),
    }
}

/// Builds the decoder lane for `format`, or `None` if it was compiled out.
pub fn loader_for(format: AudioFormat) -> Option<Box<dyn AssetLoaderLane<DecodedAudio>>> {
    match format {
        #[cfg(feature = "wav")]
        AudioFormat::Wav => Some(Box::new(WavLoaderLane::new())),
        #[cfg(feature = "qoa")]
        AudioFormat::Qoa => Some(Box::new(QoaLoaderLane::new())),
        #[cfg(feature = "flac")]
        AudioFormat::Flac => Some(Box::new(SymphoniaLoaderLane::new(format))),
        #[cfg(feature = "ogg")]
        AudioFormat::Ogg => Some(Box::new(SymphoniaLoaderLane::new(format))),
        #[cfg(feature = "mp3")]
        AudioFormat::Mp3 => Some(Box::new(SymphoniaLoaderLane::new(format))),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_for_matches_enabled_formats() {
        for format in AudioFormat::ALL {
            assert_eq!(loader_for(format).is_some(), is_format_enabled(format));
        }
    }

    #[test]
    fn test_check_channels() {
        assert_eq!(check_channels(1).unwrap(), 1);
        assert_eq!(check_channels(2).unwrap(), 2);
        assert!(matches!(
            check_channels(6),
            Err(AudioDecodeError::UnsupportedChannels(6))
        ));
        assert!(check_channels(0).is_err());
    }
}
