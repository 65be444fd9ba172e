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

//! The default lifecycle lane.

use super::{AudioLifecycleLane, CompletionReport};
use resona_core::{lane::LaneKind, AudioError};
use resona_data::AudioContext;

/// Retires finished sounds: stop, then destroy unless the sound opted out
/// with `DONT_DESTROY_AFTER_FINISH`.
///
/// Once the registry's handle is released, a sound nobody else holds is
/// deallocated before `reconcile` returns.
#[derive(Default)]
pub struct CompletionLane;

impl CompletionLane {
    /// Creates a new `CompletionLane`.
    pub fn new() -> Self {
        Self
    }
}

impl AudioLifecycleLane for CompletionLane {
    fn reconcile(&self, context: &AudioContext) -> Result<CompletionReport, AudioError> {
        let registry = context.registry();
        let mut report = CompletionReport::default();

        for sound in registry.finished() {
            // The control thread may have rewound or looped it in the meantime.
            if sound.should_repeat() || !sound.is_exhausted() {
                continue;
            }
            if registry.remove(&sound, true)? {
                report.stopped += 1;
            }
            if sound.destroys_after_finish() && registry.destroy(&sound)? {
                report.destroyed += 1;
            }
            log::trace!("Sound #{} finished", sound.id());
        }

        if !report.is_empty() {
            log::debug!(
                "Completion pass: {} stopped, {} destroyed",
                report.stopped,
                report.destroyed
            );
        }
        Ok(report)
    }
}

impl resona_core::lane::Lane for CompletionLane {
    fn strategy_name(&self) -> &'static str {
        "Completion"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Audio
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
    use crate::audio_lane::{AudioMixingLane, NearestMixingLane};
    use resona_core::{asset::AssetHandle, AudioFormat};
    use resona_data::{AudioBuffer, DecodedAudio, SoundHandle};

    fn buffer() -> AssetHandle<AudioBuffer> {
        let decoded = DecodedAudio {
            channel_count: 1,
            sample_rate: 8000,
            samples: vec![1000; 8],
        };
        AssetHandle::new(AudioBuffer::from_decoded(AudioFormat::Wav, decoded, 8000).unwrap())
    }

    fn run(context: &AudioContext, frames: usize) {
        let mut output = vec![0.0; frames * 2];
        NearestMixingLane::new()
            .mix(context, &mut output, &context.stream_info())
            .unwrap();
    }

    #[test]
    fn test_fire_and_forget_sound_is_deallocated() {
        let context = AudioContext::new(8000);
        let sound = SoundHandle::new(buffer());
        context.registry().insert(&sound);
        let weak = SoundHandle::downgrade(&sound);
        drop(sound);

        run(&context, 4);
        assert_eq!(CompletionLane::new().reconcile(&context).unwrap(), CompletionReport::default());
        assert!(weak.upgrade().is_some());

        run(&context, 4);
        let report = CompletionLane::new().reconcile(&context).unwrap();
        assert_eq!(report, CompletionReport { stopped: 1, destroyed: 1 });
        assert!(weak.upgrade().is_none());
        assert!(context.registry().is_empty());
    }

    #[test]
    fn test_kept_sound_is_stopped_and_rewound() {
        let context = AudioContext::new(8000);
        let sound = SoundHandle::new(buffer());
        sound.set_destroy_after_finish(false);
        context.registry().insert(&sound);

        run(&context, 8);
        let report = CompletionLane::new().reconcile(&context).unwrap();

        assert_eq!(report, CompletionReport { stopped: 1, destroyed: 0 });
        assert!(!sound.is_playing());
        assert!(!sound.is_destroyed());
        assert_eq!(sound.time_position(), 0.0);
        assert!(context.registry().insert(&sound), "kept sounds can replay");
    }

    #[test]
    fn test_repeating_sound_is_left_alone() {
        let context = AudioContext::new(8000);
        let sound = SoundHandle::new(buffer());
        sound.set_repeat(true);
        context.registry().insert(&sound);

        run(&context, 30);
        assert!(CompletionLane::new().reconcile(&context).unwrap().is_empty());
        assert!(sound.is_playing());
    }
}
