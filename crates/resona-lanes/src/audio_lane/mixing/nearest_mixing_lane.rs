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

//! The core audio processing lane, responsible for summing playing sounds.

use super::AudioMixingLane;
use resona_core::{
    audio::{StreamInfo, I16_NORMALIZER, OUTPUT_CHANNELS},
    lane::{LaneError, LaneKind},
};
use resona_data::{AudioContext, PlayingSound};

/// A lane that mixes with nearest-neighbour resampling.
///
/// Each output frame reads the source sample under the sound's time cursor,
/// scales it by the sound's volume and the master volume, and advances the
/// cursor by one output frame at the sound's speed. Mono sources feed both
/// channels. The sum is not clamped; the device backend limits on output.
#[derive(Default)]
pub struct NearestMixingLane;

impl NearestMixingLane {
    /// Creates a new `NearestMixingLane`.
    pub fn new() -> Self {
        Self
    }
}

/// Reads the current frame of `sound` and advances its cursor.
///
/// Returns `None` for a finished, non-repeating sound; it stays silent until
/// the lifecycle lane unregisters it.
#[inline]
fn next_frame(sound: &PlayingSound<'_>, master_volume: f32) -> Option<(f32, f32)> {
    let data = sound.data();
    let mut time = sound.time_position();

    if data.is_exhausted(time) {
        if !sound.should_repeat() || data.is_empty() {
            return None;
        }
        time = data.wrap_time(time);
    }

    let samples = data.samples();
    let cursor = data.sample_cursor(time);
    let time_delta = data.samples_per_frame() * data.rate_scale() * sound.speed() as f64;
    let volume = sound.volume() * master_volume;

    let (left, right, advance) = if data.is_stereo() {
        let index = (((cursor / 2.0).floor() as usize) * 2).min(samples.len() - 2);
        (
            samples[index] as f32 / I16_NORMALIZER * volume,
            samples[index + 1] as f32 / I16_NORMALIZER * volume,
            time_delta * 2.0,
        )
    } else {
        let index = (cursor.floor() as usize).min(samples.len() - 1);
        let sample = samples[index] as f32 / I16_NORMALIZER * volume;
        (sample, sample, time_delta)
    };

    time += advance;
    if sound.should_repeat() && data.is_exhausted(time) {
        time = data.wrap_time(time);
    }
    sound.set_time_position(time);

    Some((left, right))
}

impl AudioMixingLane for NearestMixingLane {
    fn mix(
        &self,
        context: &AudioContext,
        output_buffer: &mut [f32],
        stream_info: &StreamInfo,
    ) -> Result<(), LaneError> {
        output_buffer.fill(0.0);

        if stream_info.channels != OUTPUT_CHANNELS {
            return Err(LaneError::InvalidContext {
                expected: "a 2-channel output stream",
                received: format!("{} channels", stream_info.channels),
            });
        }

        let master_volume = context.master_volume();
        let sounds = context.registry().lock();
        if sounds.is_empty() {
            return Ok(());
        }

        for frame in output_buffer.chunks_exact_mut(OUTPUT_CHANNELS as usize) {
            let (mut left, mut right) = (0.0f32, 0.0f32);
            for sound in sounds.iter() {
                if let Some((l, r)) = next_frame(&sound, master_volume) {
                    left += l;
                    right += r;
                }
            }
            frame[0] = left;
            frame[1] = right;
        }

        Ok(())
    }
}

impl resona_core::lane::Lane for NearestMixingLane {
    fn strategy_name(&self) -> &'static str {
        "NearestMixing"
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
    use approx::assert_abs_diff_eq;
    use resona_core::{asset::AssetHandle, AudioFormat};
    use resona_data::{AudioBuffer, DecodedAudio, SoundHandle};

    const EIGHT_SAMPLES: [i16; 8] = [1000, -2000, 3000, -4000, 5000, -6000, 7000, -8000];

    fn buffer(
        channels: u16,
        rate: u32,
        samples: &[i16],
        output_rate: u32,
    ) -> AssetHandle<AudioBuffer> {
        let decoded = DecodedAudio {
            channel_count: channels,
            sample_rate: rate,
            samples: samples.to_vec(),
        };
        let buffer = AudioBuffer::from_decoded(AudioFormat::Wav, decoded, output_rate).unwrap();
        AssetHandle::new(buffer)
    }

    fn play(context: &AudioContext, data: &AssetHandle<AudioBuffer>) -> SoundHandle {
        let sound = SoundHandle::new(data.clone());
        assert!(context.registry().insert(&sound));
        sound
    }

    fn mix_frames(context: &AudioContext, frames: usize) -> Vec<f32> {
        let mut output = vec![f32::NAN; frames * 2];
        NearestMixingLane::new()
            .mix(context, &mut output, &context.stream_info())
            .unwrap();
        output
    }

    fn norm(sample: i16) -> f32 {
        sample as f32 / I16_NORMALIZER
    }

    #[test]
    fn test_empty_registry_produces_silence() {
        let context = AudioContext::new(8000);
        let output = mix_frames(&context, 16);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_eight_sample_mono_plays_each_sample_once() {
        let context = AudioContext::new(8000);
        let sound = play(&context, &buffer(1, 8000, &EIGHT_SAMPLES, 8000));

        let output = mix_frames(&context, 8);
        for (i, frame) in output.chunks_exact(2).enumerate() {
            assert_abs_diff_eq!(frame[0], norm(EIGHT_SAMPLES[i]), epsilon = 1e-6);
            assert_abs_diff_eq!(frame[1], norm(EIGHT_SAMPLES[i]), epsilon = 1e-6);
        }
        assert!(sound.is_exhausted());

        // Finished but not yet reconciled: silent, cursor untouched.
        let position = sound.time_position();
        let output = mix_frames(&context, 4);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(sound.time_position(), position);
    }

    #[test]
    fn test_two_half_volume_instances_equal_one_at_full_volume() {
        let data = buffer(1, 8000, &EIGHT_SAMPLES, 8000);

        let single = AudioContext::new(8000);
        play(&single, &data);
        let expected = mix_frames(&single, 8);

        let double = AudioContext::new(8000);
        play(&double, &data).set_volume(0.5);
        play(&double, &data).set_volume(0.5);
        let output = mix_frames(&double, 8);

        for (a, b) in output.iter().zip(&expected) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_stereo_at_double_rate_finishes_in_half_the_frames() {
        let samples: Vec<i16> = (1..=16).map(|i| i * 100).collect();
        let context = AudioContext::new(8000);
        let sound = play(&context, &buffer(2, 16000, &samples, 8000));

        let output = mix_frames(&context, 4);
        for (i, frame) in output.chunks_exact(2).enumerate() {
            assert_abs_diff_eq!(frame[0], norm(samples[i * 4]), epsilon = 1e-6);
            assert_abs_diff_eq!(frame[1], norm(samples[i * 4 + 1]), epsilon = 1e-6);
        }
        assert!(sound.is_exhausted());
    }

    #[test]
    fn test_volume_is_linear() {
        let data = buffer(1, 8000, &EIGHT_SAMPLES, 8000);
        let reference = AudioContext::new(8000);
        play(&reference, &data);
        let unit = mix_frames(&reference, 8);

        for volume in [0.0f32, 0.25, 2.0] {
            let context = AudioContext::new(8000);
            play(&context, &data).set_volume(volume);
            let output = mix_frames(&context, 8);
            for (a, b) in output.iter().zip(&unit) {
                assert_abs_diff_eq!(*a, b * volume, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_master_volume_scales_the_mix() {
        let context = AudioContext::new(8000);
        context.set_master_volume(0.5);
        let sound = play(&context, &buffer(1, 8000, &EIGHT_SAMPLES, 8000));
        sound.set_volume(0.5);

        let output = mix_frames(&context, 1);
        assert_abs_diff_eq!(output[0], norm(EIGHT_SAMPLES[0]) * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_repeating_sound_wraps_and_never_rests_exhausted() {
        let context = AudioContext::new(8000);
        let sound = play(&context, &buffer(1, 8000, &EIGHT_SAMPLES, 8000));
        sound.set_repeat(true);

        let output = mix_frames(&context, 20);
        for (i, frame) in output.chunks_exact(2).enumerate() {
            assert_abs_diff_eq!(frame[0], norm(EIGHT_SAMPLES[i % 8]), epsilon = 1e-6);
        }
        assert!(sound.time_position() < sound.length());
        assert!(!sound.is_exhausted());
    }

    #[test]
    fn test_double_speed_skips_every_other_sample() {
        let context = AudioContext::new(8000);
        let sound = play(&context, &buffer(1, 8000, &EIGHT_SAMPLES, 8000));
        sound.set_speed(2.0);

        let output = mix_frames(&context, 4);
        for (i, frame) in output.chunks_exact(2).enumerate() {
            assert_abs_diff_eq!(frame[0], norm(EIGHT_SAMPLES[i * 2]), epsilon = 1e-6);
        }
        assert!(sound.is_exhausted());
    }

    #[test]
    fn test_rejects_non_stereo_streams_with_silence() {
        let context = AudioContext::new(8000);
        play(&context, &buffer(1, 8000, &EIGHT_SAMPLES, 8000));

        let mut output = vec![1.0f32; 12];
        let result = NearestMixingLane::new().mix(
            &context,
            &mut output,
            &StreamInfo {
                channels: 6,
                sample_rate: 8000,
            },
        );
        assert!(matches!(result, Err(LaneError::InvalidContext { .. })));
        assert!(output.iter().all(|&s| s == 0.0));
    }
}
