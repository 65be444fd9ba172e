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

//! Contains the `CpalAudioDevice` struct.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use resona_core::{
    audio::{AudioDevice, StreamInfo, I16_NORMALIZER},
    AudioConfig,
};

/// Frames reserved for the i16 conversion scratch buffer when the host picks
/// the buffer size.
const DEFAULT_SCRATCH_FRAMES: usize = 4096;

/// An `AudioDevice` implementation that uses the host's default audio output
/// device via CPAL.
///
/// The stream is always opened as interleaved stereo at the configured output
/// rate. The mixer's unclamped sum is limited to `[-1, 1]` here, on its way
/// to the hardware.
#[derive(Debug, Clone)]
pub struct CpalAudioDevice {
    sample_rate: u32,
    buffer_frames: Option<u32>,
}

impl Default for CpalAudioDevice {
    fn default() -> Self {
        Self::new(&AudioConfig::default())
    }
}

impl CpalAudioDevice {
    /// Creates a backend that will open the stream described by `config`.
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            sample_rate: config.output_sample_rate,
            buffer_frames: config.buffer_frames,
        }
    }

    /// The stream layout this device opens.
    pub fn stream_info(&self) -> StreamInfo {
        StreamInfo::stereo(self.sample_rate)
    }

    fn stream_config(&self) -> cpal::StreamConfig {
        let info = self.stream_info();
        cpal::StreamConfig {
            channels: info.channels,
            sample_rate: info.sample_rate,
            buffer_size: match self.buffer_frames {
                Some(frames) => cpal::BufferSize::Fixed(frames),
                None => cpal::BufferSize::Default,
            },
        }
    }
}

/// Clamps mixed samples into the range the hardware accepts.
pub(crate) fn limit(buffer: &mut [f32]) {
    for sample in buffer {
        *sample = sample.clamp(-1.0, 1.0);
    }
}

/// Converts limited float samples to 16-bit integers.
pub(crate) fn to_i16(source: &[f32], target: &mut [i16]) {
    for (out, &sample) in target.iter_mut().zip(source) {
        *out = (sample.clamp(-1.0, 1.0) * I16_NORMALIZER) as i16;
    }
}

impl AudioDevice for CpalAudioDevice {
    fn start(
        self: Box<Self>,
        mut on_mix_needed: Box<dyn FnMut(&mut [f32], &StreamInfo) + Send>,
    ) -> Result<()> {
        // Set up the CPAL audio stream.
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default output device available"))?;
        let sample_format = device
            .default_output_config()
            .context("Failed to query the default output configuration")?
            .sample_format();

        let stream_info = self.stream_info();
        let config = self.stream_config();

        let error_callback = |err| {
            log::error!("An error occurred on the audio stream: {}", err);
        };

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |output_buffer: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    on_mix_needed(output_buffer, &stream_info);
                    limit(output_buffer);
                },
                error_callback,
                None,
            ),
            cpal::SampleFormat::I16 => {
                let scratch_frames = self
                    .buffer_frames
                    .map_or(DEFAULT_SCRATCH_FRAMES, |frames| frames as usize);
                let mut scratch = vec![0.0f32; scratch_frames * stream_info.channels as usize];
                device.build_output_stream(
                    &config,
                    move |output_buffer: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        // Only grows if the host hands out a larger buffer than expected.
                        if scratch.len() < output_buffer.len() {
                            scratch.resize(output_buffer.len(), 0.0);
                        }
                        let mixed = &mut scratch[..output_buffer.len()];
                        on_mix_needed(mixed, &stream_info);
                        to_i16(mixed, output_buffer);
                    },
                    error_callback,
                    None,
                )
            }
            format => return Err(anyhow!("Unsupported sample format: {}", format)),
        }
        .with_context(|| {
            format!(
                "Failed to open a {} Hz stereo output stream",
                stream_info.sample_rate
            )
        })?;

        stream.play()?;
        log::info!(
            "Audio output started: {} Hz, {} channels, {:?} samples",
            stream_info.sample_rate,
            stream_info.channels,
            sample_format
        );

        // Detach the stream to keep it running for the lifetime of the application.
        std::mem::forget(stream);

        Ok(())
    }
}
