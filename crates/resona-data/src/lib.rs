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

//! # Resona Data
//!
//! Data layouts of the audio engine: decoded buffers, playable sound
//! instances, and the lock-guarded registry shared with the mixing thread.

pub mod assets;
pub mod sound;

pub use assets::{AudioBuffer, DecodedAudio};
pub use sound::{
    ActiveSoundRegistry, ActiveSoundsGuard, AudioContext, PlayingSound, SoundFlags, SoundHandle,
    SoundInstance,
};
