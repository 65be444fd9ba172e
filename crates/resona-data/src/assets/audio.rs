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

//! Defines the core asset types for audio data.

use resona_core::{asset::Asset, AudioError, AudioFormat};

/// Slack, in raw-sample units, added when turning a time position into a
/// sample index. Time advances by repeated addition of a non-representable
/// step, so without it a cursor that should land exactly on sample `n` can
/// land just below it and be floored to `n - 1`.
pub const CURSOR_EPSILON: f64 = 1e-6;

/// The raw output of a decoder, before any engine-specific metadata is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Number of interleaved channels.
    pub channel_count: u16,
    /// Source sampling rate in Hz.
    pub sample_rate: u32,
    /// Interleaved signed 16-bit samples.
    pub samples: Vec<i16>,
}

impl Asset for DecodedAudio {}

/// A sound asset, decoded and ready for playback.
///
/// Holds raw interleaved 16-bit samples plus timing metadata derived once at
/// construction against the engine's output rate. The buffer is immutable and
/// is shared read-only, through an `AssetHandle`, by every sound bound to it.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    format: AudioFormat,
    channel_count: u16,
    sample_count: usize,
    sample_rate: u32,
    time_length: f64,
    rate_scale: f64,
    samples_per_frame: f64,
    samples: Vec<i16>,
}

impl Asset for AudioBuffer {}

impl AudioBuffer {
    /// Builds a buffer from decoder output, validating the layout and
    /// computing the derived timing metadata.
    ///
    /// # Errors
    /// - [`AudioError::Decode`] if the channel count is not 1 or 2, the sample
    ///   rate is zero, or the sample data ends in the middle of a frame.
    /// - [`AudioError::Consistency`] if `output_sample_rate` is zero.
    pub fn from_decoded(
        format: AudioFormat,
        decoded: DecodedAudio,
        output_sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let DecodedAudio {
            channel_count,
            sample_rate,
            samples,
        } = decoded;

        if !(1..=2).contains(&channel_count) {
            return Err(AudioError::decode(
                format,
                format!("{channel_count} channels (only mono and stereo are supported)"),
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::decode(format, "sample rate is zero"));
        }
        if samples.len() % channel_count as usize != 0 {
            return Err(AudioError::decode(
                format,
                format!(
                    "{} samples do not divide into {channel_count}-channel frames",
                    samples.len()
                ),
            ));
        }
        if output_sample_rate == 0 {
            return Err(AudioError::Consistency {
                detail: "output sample rate is zero".into(),
            });
        }

        let sample_count = samples.len();
        let time_length = sample_count as f64 / sample_rate as f64 / channel_count as f64;
        let rate_scale = sample_rate as f64 / output_sample_rate as f64;
        let samples_per_frame = if sample_count == 0 {
            0.0
        } else {
            time_length / sample_count as f64
        };

        log::trace!(
            "Built {format} buffer: {channel_count} ch, {sample_rate} Hz, {sample_count} samples, {time_length:.3}s"
        );

        Ok(Self {
            format,
            channel_count,
            sample_count,
            sample_rate,
            time_length,
            rate_scale,
            samples_per_frame,
            samples,
        })
    }

    /// The decoder that produced this buffer.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// 1 for mono, 2 for stereo.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Returns `true` for two-channel data.
    pub fn is_stereo(&self) -> bool {
        self.channel_count == 2
    }

    /// Total raw samples across all channels.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.sample_count / self.channel_count as usize
    }

    /// Source sampling rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback duration in seconds.
    pub fn time_length(&self) -> f64 {
        self.time_length
    }

    /// Source-to-output rate ratio.
    pub fn rate_scale(&self) -> f64 {
        self.rate_scale
    }

    /// Seconds represented by one raw sample unit.
    pub fn samples_per_frame(&self) -> f64 {
        self.samples_per_frame
    }

    /// The raw interleaved samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns `true` if the buffer holds no audio.
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Fractional raw-sample index corresponding to `time` seconds.
    #[inline]
    pub fn sample_cursor(&self, time: f64) -> f64 {
        time / self.samples_per_frame + CURSOR_EPSILON
    }

    /// Returns `true` once `time` has reached the end of the data.
    #[inline]
    pub fn is_exhausted(&self, time: f64) -> bool {
        self.sample_count == 0 || self.sample_cursor(time) >= self.sample_count as f64
    }

    /// Wraps `time` back into `[0, time_length)` for looping playback.
    #[inline]
    pub fn wrap_time(&self, time: f64) -> f64 {
        if self.time_length <= 0.0 {
            return 0.0;
        }
        let wrapped = time.rem_euclid(self.time_length);
        if self.is_exhausted(wrapped) {
            0.0
        } else {
            wrapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decoded(channel_count: u16, sample_rate: u32, len: usize) -> DecodedAudio {
        DecodedAudio {
            channel_count,
            sample_rate,
            samples: (0..len).map(|i| i as i16).collect(),
        }
    }

    #[test]
    fn test_duration_invariant() {
        for (channels, rate, len) in [(1, 8000, 8), (2, 44100, 88200), (1, 22050, 1000)] {
            let buffer =
                AudioBuffer::from_decoded(AudioFormat::Wav, decoded(channels, rate, len), 48000)
                    .unwrap();
            let expected = len as f64 / rate as f64 / channels as f64;
            assert_relative_eq!(buffer.time_length(), expected);
            assert_relative_eq!(buffer.samples_per_frame(), expected / len as f64);
            assert_relative_eq!(buffer.rate_scale(), rate as f64 / 48000.0);
        }
    }

    #[test]
    fn test_eight_sample_mono_metadata() {
        let buffer =
            AudioBuffer::from_decoded(AudioFormat::Wav, decoded(1, 8000, 8), 8000).unwrap();
        assert_relative_eq!(buffer.time_length(), 0.001);
        assert_relative_eq!(buffer.rate_scale(), 1.0);
        assert_relative_eq!(buffer.samples_per_frame(), 0.000125);
        assert_eq!(buffer.frame_count(), 8);
        assert!(!buffer.is_stereo());
    }

    #[test]
    fn test_rejects_unsupported_channel_counts() {
        for channels in [0, 3, 6] {
            let err = AudioBuffer::from_decoded(AudioFormat::Flac, decoded(channels, 8000, 12), 8000)
                .unwrap_err();
            assert!(matches!(err, AudioError::Decode { format: AudioFormat::Flac, .. }));
        }
    }

    #[test]
    fn test_rejects_partial_frames_and_zero_rates() {
        assert!(AudioBuffer::from_decoded(AudioFormat::Wav, decoded(2, 8000, 7), 8000).is_err());
        assert!(AudioBuffer::from_decoded(AudioFormat::Wav, decoded(1, 0, 8), 8000).is_err());
        let err = AudioBuffer::from_decoded(AudioFormat::Wav, decoded(1, 8000, 8), 0).unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn test_empty_buffer_is_always_exhausted() {
        let buffer =
            AudioBuffer::from_decoded(AudioFormat::Qoa, decoded(1, 8000, 0), 8000).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.is_exhausted(0.0));
        assert_eq!(buffer.wrap_time(1.0), 0.0);
    }

    #[test]
    fn test_accumulated_time_lands_on_exact_samples() {
        let buffer =
            AudioBuffer::from_decoded(AudioFormat::Wav, decoded(1, 8000, 8), 8000).unwrap();
        let mut time = 0.0;
        for expected_index in 0..8 {
            assert_eq!(buffer.sample_cursor(time).floor() as usize, expected_index);
            assert!(!buffer.is_exhausted(time));
            time += buffer.samples_per_frame();
        }
        assert!(buffer.is_exhausted(time));
    }

    #[test]
    fn test_wrap_time() {
        let buffer =
            AudioBuffer::from_decoded(AudioFormat::Wav, decoded(1, 8000, 8), 8000).unwrap();
        assert_relative_eq!(buffer.wrap_time(0.00125), 0.00025, epsilon = 1e-12);
        assert_eq!(buffer.wrap_time(0.001), 0.0);
        assert!(!buffer.is_exhausted(buffer.wrap_time(0.0031)));
    }
}
