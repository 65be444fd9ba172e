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

//! The Intelligent Subsystem Agent responsible for managing the audio system.

mod loader;

pub use loader::SoundLoader;

use anyhow::Result;
use resona_core::{
    asset::AssetHandle,
    audio::{AudioDevice, StreamInfo},
    lane::LaneError,
    AudioConfig, AudioError, AudioFormat,
};
use resona_data::{AudioBuffer, AudioContext, SoundHandle};
use resona_lanes::audio_lane::{
    AudioLifecycleLane, AudioMixingLane, CompletionLane, CompletionReport, NearestMixingLane,
};
use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// The ISA that orchestrates the entire audio system.
///
/// All control methods take `&self` and may be called from any thread while
/// the device mixes. `tick` must be called once per application frame to
/// retire finished sounds.
pub struct AudioAgent {
    /// The audio device used for playback, until `start` hands it the mixer.
    device: Option<Box<dyn AudioDevice>>,
    /// State shared with the device thread.
    context: Arc<AudioContext>,
    /// The audio mixing lane responsible for summing playing sounds.
    mixing_lane: Arc<NearestMixingLane>,
    /// Retires sounds that reached their end.
    lifecycle_lane: CompletionLane,
    /// Decoders for every enabled format.
    loader: SoundLoader,
    /// Raised by the device callback when the mixer rejects the stream.
    stream_rejected: Arc<AtomicBool>,
}

impl AudioAgent {
    /// Creates a new `AudioAgent` that will play through `device`.
    ///
    /// # Arguments
    /// * `config`: Output rate and initial master volume.
    /// * `device`: A boxed, concrete implementation of the `AudioDevice` trait.
    pub fn new(config: &AudioConfig, device: Box<dyn AudioDevice>) -> Self {
        let mut agent = Self::headless(config);
        agent.device = Some(device);
        agent
    }

    /// Creates an agent without a device. Output is produced by calling
    /// [`mix`](Self::mix) directly, e.g. for offline rendering or tests.
    pub fn headless(config: &AudioConfig) -> Self {
        Self {
            device: None,
            context: Arc::new(AudioContext::from_config(config)),
            mixing_lane: Arc::new(NearestMixingLane::new()),
            lifecycle_lane: CompletionLane::new(),
            loader: SoundLoader::new(config.output_sample_rate),
            stream_rejected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Initializes the audio backend and starts the audio stream.
    /// This method consumes the device, so it can only be called once.
    pub fn start(&mut self) -> Result<()> {
        // Take ownership of the device. This ensures `start` can't be called twice.
        if let Some(device_boxed) = self.device.take() {
            let mixing_lane = self.mixing_lane.clone();
            let context = self.context.clone();
            let stream_rejected = self.stream_rejected.clone();

            let on_mix_needed = Box::new(
                move |output_buffer: &mut [f32], stream_info: &StreamInfo| {
                    if mixing_lane.mix(&context, output_buffer, stream_info).is_err() {
                        stream_rejected.store(true, Ordering::Relaxed);
                    }
                },
            );

            log::info!(
                "Starting audio output at {} Hz",
                self.context.output_sample_rate()
            );
            // Start the device stream.
            device_boxed.start(on_mix_needed)
        } else {
            // The device has already been started or was never provided.
            Ok(())
        }
    }

    /// The state shared with the mixer.
    pub fn context(&self) -> &Arc<AudioContext> {
        &self.context
    }

    /// The decoder registry, for registering custom loaders.
    pub fn loader_mut(&mut self) -> &mut SoundLoader {
        &mut self.loader
    }

    /// Reads and decodes a sound file, choosing the decoder by extension.
    pub fn load_buffer(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<AssetHandle<AudioBuffer>, AudioError> {
        self.loader.load_path(path)
    }

    /// Decodes an in-memory sound file.
    pub fn load_from_memory(
        &self,
        format: AudioFormat,
        bytes: &[u8],
    ) -> Result<AssetHandle<AudioBuffer>, AudioError> {
        self.loader.load_from_memory(format, bytes)
    }

    /// Creates a stopped sound bound to `buffer`.
    pub fn create_sound(&self, buffer: &AssetHandle<AudioBuffer>) -> SoundHandle {
        SoundHandle::new(buffer.clone())
    }

    /// Starts or resumes `sound`. Returns `false` if it was already playing
    /// or has been destroyed.
    pub fn play(&self, sound: &SoundHandle) -> bool {
        if Self::is_destroyed(sound, "play") {
            return false;
        }
        self.context.registry().insert(sound)
    }

    /// Resumes a paused sound from where it stopped.
    pub fn resume(&self, sound: &SoundHandle) -> bool {
        self.play(sound)
    }

    /// Stops `sound` and rewinds it. Returns `false` if it was not playing.
    pub fn stop(&self, sound: &SoundHandle) -> Result<bool, AudioError> {
        if Self::is_destroyed(sound, "stop") {
            return Ok(false);
        }
        self.checked(self.context.registry().remove(sound, true))
    }

    /// Stops `sound` and keeps its position. Returns `false` if it was not
    /// playing.
    pub fn pause(&self, sound: &SoundHandle) -> Result<bool, AudioError> {
        if Self::is_destroyed(sound, "pause") {
            return Ok(false);
        }
        self.checked(self.context.registry().remove(sound, false))
    }

    /// Stops `sound`, marks it destroyed and releases this handle.
    ///
    /// The bound buffer is only freed if no other sound or caller holds it.
    pub fn destroy(&self, sound: SoundHandle) -> Result<(), AudioError> {
        if Self::is_destroyed(&sound, "destroy") {
            return Ok(());
        }
        self.checked(self.context.registry().destroy(&sound))?;
        log::trace!("Destroyed sound #{}", sound.id());
        Ok(())
    }

    /// Stops every playing sound. Returns how many were stopped.
    pub fn stop_all(&self) -> usize {
        self.context.registry().clear()
    }

    /// Number of sounds currently playing.
    pub fn playing_count(&self) -> usize {
        self.context.registry().len()
    }

    /// Volume applied on top of every sound's own volume.
    pub fn master_volume(&self) -> f32 {
        self.context.master_volume()
    }

    /// Sets the master volume. Negative values are clamped to silence.
    pub fn set_master_volume(&self, volume: f32) {
        self.context.set_master_volume(volume);
    }

    /// Retires sounds that finished since the previous tick.
    pub fn tick(&self) -> Result<CompletionReport, AudioError> {
        if self.stream_rejected.swap(false, Ordering::Relaxed) {
            log::error!("The audio device requested a non-stereo stream; output was silenced");
        }
        self.checked(self.lifecycle_lane.reconcile(&self.context))
    }

    /// Mixes `output_buffer` synchronously, as the device callback would.
    pub fn mix(&self, output_buffer: &mut [f32]) -> Result<(), LaneError> {
        self.mixing_lane
            .mix(&self.context, output_buffer, &self.context.stream_info())
    }

    fn is_destroyed(sound: &SoundHandle, operation: &str) -> bool {
        let destroyed = sound.is_destroyed();
        if destroyed {
            log::warn!("Ignoring {} on destroyed sound #{}", operation, sound.id());
        }
        destroyed
    }

    fn checked<T>(&self, result: Result<T, AudioError>) -> Result<T, AudioError> {
        if let Err(err) = &result {
            if err.is_defect() {
                log::error!("{}", err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A device that records the callback instead of opening hardware.
    struct ManualDevice {
        callback: Arc<Mutex<Option<Box<dyn FnMut(&mut [f32], &StreamInfo) + Send>>>>,
    }

    impl AudioDevice for ManualDevice {
        fn start(
            self: Box<Self>,
            on_mix_needed: Box<dyn FnMut(&mut [f32], &StreamInfo) + Send>,
        ) -> Result<()> {
            *self.callback.lock().unwrap() = Some(on_mix_needed);
            Ok(())
        }
    }

    fn agent_with_sound() -> (AudioAgent, SoundHandle) {
        let config = AudioConfig {
            output_sample_rate: 8000,
            ..AudioConfig::default()
        };
        let agent = AudioAgent::headless(&config);
        let buffer = agent
            .load_from_memory(AudioFormat::Qoa, &ramp_qoa())
            .unwrap();
        let sound = agent.create_sound(&buffer);
        (agent, sound)
    }

    // Mono, 8 kHz, 20 samples of a rising ramp.
    fn ramp_qoa() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"qoaf");
        bytes.extend_from_slice(&20u32.to_be_bytes());
        let frame_header: u64 = (1 << 56) | (8000 << 32) | (20 << 16) | 32;
        bytes.extend_from_slice(&frame_header.to_be_bytes());
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&0x0000_0000_E000_4000u64.to_be_bytes());
        let mut slice = 0u64;
        for i in 0..20 {
            slice |= 2u64 << (57 - 3 * i);
        }
        bytes.extend_from_slice(&slice.to_be_bytes());
        bytes
    }

    #[test]
    fn test_play_stop_pause_resume() {
        let (agent, sound) = agent_with_sound();

        assert!(agent.play(&sound));
        assert!(!agent.play(&sound));
        assert_eq!(agent.playing_count(), 1);

        let mut output = vec![0.0; 10];
        agent.mix(&mut output).unwrap();
        let position = sound.time_position();
        assert!(position > 0.0);

        assert!(agent.pause(&sound).unwrap());
        assert_eq!(sound.time_position(), position);
        assert!(agent.resume(&sound));

        assert!(agent.stop(&sound).unwrap());
        assert!(!agent.stop(&sound).unwrap());
        assert_eq!(sound.time_position(), 0.0);
        assert_eq!(agent.playing_count(), 0);
    }

    #[test]
    fn test_destroyed_sound_ignores_play() {
        let (agent, sound) = agent_with_sound();
        let other = sound.clone();
        agent.play(&sound);

        agent.destroy(sound).unwrap();
        assert!(other.is_destroyed());
        assert!(!agent.play(&other));
        assert_eq!(agent.playing_count(), 0);
    }

    #[test]
    fn test_tick_retires_finished_sounds() {
        let (agent, sound) = agent_with_sound();
        agent.play(&sound);
        let weak = SoundHandle::downgrade(&sound);
        drop(sound);

        let mut output = vec![0.0; 40];
        agent.mix(&mut output).unwrap();
        let report = agent.tick().unwrap();

        assert_eq!(report.stopped, 1);
        assert_eq!(report.destroyed, 1);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_start_hands_the_mixer_to_the_device() {
        let callback = Arc::new(Mutex::new(None));
        let config = AudioConfig {
            output_sample_rate: 8000,
            ..AudioConfig::default()
        };
        let mut agent = AudioAgent::new(
            &config,
            Box::new(ManualDevice {
                callback: callback.clone(),
            }),
        );
        agent.start().unwrap();
        // A second start is a no-op.
        agent.start().unwrap();

        let buffer = agent.load_from_memory(AudioFormat::Qoa, &ramp_qoa()).unwrap();
        let sound = agent.create_sound(&buffer);
        agent.play(&sound);

        let mut output = vec![0.0f32; 4];
        let mut guard = callback.lock().unwrap();
        let on_mix_needed = guard.as_mut().unwrap();
        on_mix_needed(&mut output, &StreamInfo::stereo(8000));
        assert!(output[0] > 0.0);
        assert_eq!(output[0], output[1]);

        let mono = StreamInfo {
            channels: 1,
            sample_rate: 8000,
        };
        on_mix_needed(&mut output, &mono);
        assert!(output.iter().all(|&s| s == 0.0));
        drop(guard);
        assert!(agent.tick().unwrap().is_empty());
    }
}
