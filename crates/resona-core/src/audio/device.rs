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

//! Defines the abstract `AudioDevice` trait.

use anyhow::Result;

/// A struct providing information about the audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// The number of channels. The mixer only accepts 2.
    pub channels: u16,
    /// The number of samples per second (e.g., 48000 Hz).
    pub sample_rate: u32,
}

impl StreamInfo {
    /// Stereo stream info at the given rate.
    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            channels: super::OUTPUT_CHANNELS,
            sample_rate,
        }
    }

    /// Number of whole frames an interleaved buffer of `len` samples holds.
    pub fn frames_in(&self, len: usize) -> usize {
        if self.channels == 0 {
            0
        } else {
            len / self.channels as usize
        }
    }
}

/// The abstract contract for a hardware audio device backend.
///
/// This trait is the boundary between the engine's mixing logic and the
/// platform-specific infrastructure that talks to the sound card. The backend
/// owns the hardware and its buffer scheduling; the engine only provides the
/// closure that fills each buffer.
pub trait AudioDevice: Send + Sync {
    /// Initializes and starts the audio stream.
    ///
    /// This method consumes the `AudioDevice` as it runs for the lifetime of
    /// the audio subsystem.
    ///
    /// # Arguments
    ///
    /// * `on_mix_needed`: A closure called repeatedly by the backend on a
    ///   dedicated real-time thread, never concurrently with itself. It must
    ///   fill the provided `output_buffer` with interleaved samples
    ///   (`[L, R, L, R, ...]`).
    fn start(
        self: Box<Self>,
        on_mix_needed: Box<dyn FnMut(&mut [f32], &StreamInfo) + Send>,
    ) -> Result<()>;
}
