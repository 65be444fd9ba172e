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

//! Defines the error type of the audio subsystem.

use super::AudioFormat;
use std::{fmt, io, path::PathBuf};

/// An error raised while loading, decoding, or managing sounds.
#[derive(Debug)]
pub enum AudioError {
    /// The source file could not be read.
    Load {
        /// The path of the file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The encoded data is malformed or uses an unsupported encoding.
    Decode {
        /// The format the data was decoded as.
        format: AudioFormat,
        /// What was wrong with the data.
        reason: String,
    },
    /// The extension is unrecognized, or the format was compiled out.
    UnsupportedFormat {
        /// The extension or format name that was requested.
        name: String,
    },
    /// An internal invariant was violated. This is a bug, never a user error.
    Consistency {
        /// Description of the violated invariant.
        detail: String,
    },
}

impl AudioError {
    /// Convenience constructor for a decode failure.
    pub fn decode(format: AudioFormat, reason: impl fmt::Display) -> Self {
        AudioError::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors that indicate an engine defect.
    pub fn is_defect(&self) -> bool {
        matches!(self, AudioError::Consistency { .. })
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Load { path, source } => {
                write!(f, "Failed to read audio file '{}': {source}", path.display())
            }
            AudioError::Decode { format, reason } => {
                write!(f, "Failed to decode {format} data: {reason}")
            }
            AudioError::UnsupportedFormat { name } => {
                write!(f, "Unsupported audio format: {name}")
            }
            AudioError::Consistency { detail } => {
                write!(f, "Audio engine consistency violation: {detail}")
            }
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::Load { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_load_error_exposes_io_source() {
        let err = AudioError::Load {
            path: PathBuf::from("missing.wav"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.wav"));
        assert!(!err.is_defect());
    }

    #[test]
    fn test_consistency_is_a_defect() {
        let err = AudioError::Consistency {
            detail: "removed 2 entries".into(),
        };
        assert!(err.is_defect());
        assert!(err.to_string().contains("removed 2 entries"));
    }
}
