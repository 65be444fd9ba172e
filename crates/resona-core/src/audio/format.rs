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

//! Tags identifying which decoder produced a buffer.

use super::AudioError;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

/// The encoded formats the engine knows how to dispatch.
///
/// Whether a format can actually be decoded depends on the cargo features the
/// loader crate was built with; a known-but-disabled format is reported as
/// [`AudioError::UnsupportedFormat`] at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    /// RIFF WAVE.
    Wav,
    /// Free Lossless Audio Codec.
    Flac,
    /// Quite OK Audio.
    Qoa,
    /// Ogg Vorbis.
    Ogg,
    /// MPEG-1 Layer III.
    Mp3,
}

impl AudioFormat {
    /// Every format tag, in dispatch order.
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Wav,
        AudioFormat::Flac,
        AudioFormat::Qoa,
        AudioFormat::Ogg,
        AudioFormat::Mp3,
    ];

    /// Maps a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "qoa" => Some(AudioFormat::Qoa),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            "mp3" => Some(AudioFormat::Mp3),
            _ => None,
        }
    }

    /// Resolves the format of a file from its extension.
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| AudioError::UnsupportedFormat {
            name: if extension.is_empty() {
                format!("<no extension> ({})", path.display())
            } else {
                extension.to_string()
            },
        })
    }

    /// The canonical file extension of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Qoa => "qoa",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioFormat::Wav => write!(f, "WAV"),
            AudioFormat::Flac => write!(f, "FLAC"),
            AudioFormat::Qoa => write!(f, "QOA"),
            AudioFormat::Ogg => write!(f, "Ogg Vorbis"),
            AudioFormat::Mp3 => write!(f, "MP3"),
        }
    }
}
