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

//! Groups different audio mixing lanes.

mod nearest_mixing_lane;

pub use nearest_mixing_lane::*;

use resona_core::{audio::StreamInfo, lane::{Lane, LaneError}};
use resona_data::AudioContext;

/// A trait defining the behavior of an audio mixing lane.
///
/// `mix` runs on the device's real-time thread: implementations must not
/// block on anything but the registry lock, allocate, or log.
pub trait AudioMixingLane: Lane {
    /// Mixes every playing sound of `context` into `output_buffer`.
    ///
    /// # Arguments
    /// * `context`: The audio context whose registry is mixed.
    /// * `output_buffer`: Interleaved samples to overwrite.
    /// * `stream_info`: Layout of `output_buffer`. Only stereo is accepted.
    ///
    /// # Errors
    /// [`LaneError::InvalidContext`] if the stream is not stereo. The buffer
    /// is silenced before returning.
    fn mix(
        &self,
        context: &AudioContext,
        output_buffer: &mut [f32],
        stream_info: &StreamInfo,
    ) -> Result<(), LaneError>;
}
