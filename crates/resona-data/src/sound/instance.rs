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

//! Defines the `SoundInstance` playback state and its shared handle.

use super::flags::{AtomicSoundFlags, SoundFlags};
use crate::assets::AudioBuffer;
use resona_core::{
    asset::AssetHandle,
    utils::{AtomicF32, AtomicF64},
};
use std::{
    fmt,
    ops::Deref,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

static NEXT_SOUND_ID: AtomicU64 = AtomicU64::new(1);

/// Independently controllable playback of an [`AudioBuffer`].
///
/// Volume, speed and flags are atomics so the control thread can change them
/// while the mixer runs. The time cursor is only written while the registry
/// lock is held, through [`PlayingSound`](super::PlayingSound) or the registry
/// itself.
pub struct SoundInstance {
    id: u64,
    data: AssetHandle<AudioBuffer>,
    volume: AtomicF32,
    speed: AtomicF32,
    time_position: AtomicF64,
    pub(crate) flags: AtomicSoundFlags,
}

impl SoundInstance {
    fn new(data: AssetHandle<AudioBuffer>) -> Self {
        Self {
            id: NEXT_SOUND_ID.fetch_add(1, Ordering::Relaxed),
            data,
            volume: AtomicF32::new(1.0),
            speed: AtomicF32::new(1.0),
            time_position: AtomicF64::new(0.0),
            flags: AtomicSoundFlags::default(),
        }
    }

    /// Process-unique identifier, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The buffer this instance plays.
    pub fn data(&self) -> &AssetHandle<AudioBuffer> {
        &self.data
    }

    /// Linear volume scalar.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Relaxed)
    }

    /// Sets the linear volume. Negative values are clamped to silence.
    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.max(0.0), Ordering::Relaxed);
    }

    /// Playback speed scalar (1 = native rate).
    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed.load(Ordering::Relaxed)
    }

    /// Sets the playback speed. Negative values are clamped to a standstill.
    pub fn set_speed(&self, speed: f32) {
        self.speed.store(speed.max(0.0), Ordering::Relaxed);
    }

    /// Seconds elapsed into the buffer.
    #[inline]
    pub fn time_position(&self) -> f64 {
        self.time_position.load(Ordering::Relaxed)
    }

    /// How far playback has progressed, in seconds of buffer time.
    ///
    /// Same value as [`time_position`](Self::time_position); paired with
    /// [`length`](Self::length) for progress displays.
    pub fn time_played(&self) -> f64 {
        self.time_position()
    }

    pub(crate) fn store_time_position(&self, time: f64) {
        self.time_position.store(time, Ordering::Relaxed);
    }

    /// Playback duration of the bound buffer, in seconds.
    pub fn length(&self) -> f64 {
        self.data.time_length()
    }

    /// Current flag set.
    pub fn flags(&self) -> SoundFlags {
        self.flags.load()
    }

    /// Returns `true` while the instance is registered for mixing.
    pub fn is_playing(&self) -> bool {
        self.flags.contains(SoundFlags::IS_PLAYING)
    }

    /// Returns `true` once the instance has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.flags.contains(SoundFlags::DESTROYED)
    }

    /// Returns `true` if playback loops.
    pub fn should_repeat(&self) -> bool {
        self.flags.contains(SoundFlags::SHOULD_REPEAT)
    }

    /// Enables or disables looping.
    pub fn set_repeat(&self, repeat: bool) {
        self.flags.set(SoundFlags::SHOULD_REPEAT, repeat);
    }

    /// Returns `true` if natural completion destroys the instance.
    pub fn destroys_after_finish(&self) -> bool {
        !self.flags.contains(SoundFlags::DONT_DESTROY_AFTER_FINISH)
    }

    /// Chooses whether natural completion destroys the instance (the default)
    /// or only stops it so it can be replayed.
    pub fn set_destroy_after_finish(&self, destroy: bool) {
        self.flags.set(SoundFlags::DONT_DESTROY_AFTER_FINISH, !destroy);
    }

    /// Returns `true` if the time cursor has reached the end of the data.
    pub fn is_exhausted(&self) -> bool {
        self.data.is_exhausted(self.time_position())
    }

    pub(crate) fn mark_destroyed(&self) {
        self.flags.insert(SoundFlags::DESTROYED);
    }
}

impl fmt::Debug for SoundInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundInstance")
            .field("id", &self.id)
            .field("format", &self.data.format())
            .field("volume", &self.volume())
            .field("speed", &self.speed())
            .field("time_position", &self.time_position())
            .field("flags", &self.flags())
            .finish()
    }
}

/// A shared, cloneable handle to a [`SoundInstance`].
///
/// The registry holds one clone while the sound plays, so a sound whose
/// caller dropped every handle keeps playing until it finishes and is then
/// deallocated by the lifecycle tick. Identity comparisons use the shared
/// allocation, never the field values.
#[derive(Clone)]
pub struct SoundHandle(Arc<SoundInstance>);

impl SoundHandle {
    /// Allocates a detached instance bound to `data`.
    pub fn new(data: AssetHandle<AudioBuffer>) -> Self {
        Self(Arc::new(SoundInstance::new(data)))
    }

    /// Returns `true` if both handles address the same instance.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// A weak reference that does not keep the instance alive.
    pub fn downgrade(this: &Self) -> Weak<SoundInstance> {
        Arc::downgrade(&this.0)
    }
}

impl Deref for SoundHandle {
    type Target = SoundInstance;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
