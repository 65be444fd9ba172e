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

//! The per-subsystem state handed to the mixer and the control thread.

use super::registry::ActiveSoundRegistry;
use resona_core::{audio::StreamInfo, utils::AtomicF32, AudioConfig};
use std::sync::atomic::Ordering;

/// State of one audio subsystem, shared by the control thread and the mixer.
///
/// Created once at start-up and handed out as an `Arc`; nothing in the engine
/// reaches for global state.
#[derive(Debug)]
pub struct AudioContext {
    registry: ActiveSoundRegistry,
    master_volume: AtomicF32,
    output_sample_rate: u32,
}

impl AudioContext {
    /// Creates a context mixing at `output_sample_rate` with master volume 1.
    pub fn new(output_sample_rate: u32) -> Self {
        Self {
            registry: ActiveSoundRegistry::new(),
            master_volume: AtomicF32::new(1.0),
            output_sample_rate,
        }
    }

    /// Creates a context from validated configuration.
    pub fn from_config(config: &AudioConfig) -> Self {
        let context = Self::new(config.output_sample_rate);
        context.set_master_volume(config.master_volume);
        context
    }

    /// The active-sound registry.
    pub fn registry(&self) -> &ActiveSoundRegistry {
        &self.registry
    }

    /// Volume applied multiplicatively to every sound.
    #[inline]
    pub fn master_volume(&self) -> f32 {
        self.master_volume.load(Ordering::Relaxed)
    }

    /// Sets the master volume. Negative values are clamped to silence.
    pub fn set_master_volume(&self, volume: f32) {
        self.master_volume.store(volume.max(0.0), Ordering::Relaxed);
    }

    /// The fixed rate every buffer is resampled to.
    pub fn output_sample_rate(&self) -> u32 {
        self.output_sample_rate
    }

    /// The stream layout the mixer produces.
    pub fn stream_info(&self) -> StreamInfo {
        StreamInfo::stereo(self.output_sample_rate)
    }
}
