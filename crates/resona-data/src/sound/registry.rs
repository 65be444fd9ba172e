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

//! The lock-guarded set of playing sounds.

use super::{flags::SoundFlags, instance::SoundHandle, SoundInstance};
use resona_core::AudioError;
use std::{
    ops::Deref,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Slots reserved up front so that `play` rarely allocates under the lock.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 64;

/// The unordered collection of sounds currently playing.
///
/// One mutex serializes membership changes, iteration by the mixer, and every
/// write to a registered sound's time cursor. A sound is a member if and only
/// if its `IS_PLAYING` flag is set, and it is a member at most once.
#[derive(Debug)]
pub struct ActiveSoundRegistry {
    sounds: Mutex<Vec<SoundHandle>>,
}

impl Default for ActiveSoundRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_REGISTRY_CAPACITY)
    }
}

impl ActiveSoundRegistry {
    /// Creates an empty registry with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with room for `capacity` sounds.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sounds: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    // The vector stays structurally valid even if a holder panicked, so a
    // poisoned lock is recovered rather than propagated.
    fn lock_sounds(&self) -> MutexGuard<'_, Vec<SoundHandle>> {
        self.sounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the registry for iteration.
    ///
    /// The mixer holds this guard for a whole callback; control operations
    /// block until it is released.
    pub fn lock(&self) -> ActiveSoundsGuard<'_> {
        ActiveSoundsGuard {
            sounds: self.lock_sounds(),
        }
    }

    /// Registers `sound` and sets `IS_PLAYING`.
    ///
    /// Returns `false` without any change if the sound is already playing or
    /// has been destroyed.
    pub fn insert(&self, sound: &SoundHandle) -> bool {
        loop {
            let grown = {
                let mut sounds = self.lock_sounds();
                if sound
                    .flags()
                    .intersects(SoundFlags::IS_PLAYING | SoundFlags::DESTROYED)
                {
                    return false;
                }
                if sounds.len() < sounds.capacity() {
                    sound.flags.insert(SoundFlags::IS_PLAYING);
                    sounds.push(sound.clone());
                    return true;
                }
                sounds.capacity().max(1) * 2
            };

            // Grow outside the lock, then move the handles over in place.
            let mut larger = Vec::with_capacity(grown);
            let mut sounds = self.lock_sounds();
            if sounds.len() == sounds.capacity() && grown > sounds.capacity() {
                larger.extend(sounds.drain(..));
                std::mem::swap(&mut *sounds, &mut larger);
            }
            drop(sounds);
        }
    }

    /// Unregisters `sound` and clears `IS_PLAYING`.
    ///
    /// With `rewind`, the time cursor is reset to 0 (stop); without it the
    /// position is kept (pause). Returns `Ok(false)` if the sound was not
    /// playing.
    ///
    /// # Errors
    /// [`AudioError::Consistency`] if the flag and the membership disagree,
    /// i.e. the sound was found zero or several times.
    pub fn remove(&self, sound: &SoundHandle, rewind: bool) -> Result<bool, AudioError> {
        let removed = {
            let mut sounds = self.lock_sounds();
            if !sound.is_playing() {
                return Ok(false);
            }
            unregister(&mut sounds, sound, rewind)
        };
        check_membership(sound, removed)?;
        Ok(true)
    }

    /// Stops `sound` and marks it destroyed. Later `insert` calls are refused.
    ///
    /// Both happen under one lock, so a concurrent `insert` either lands
    /// before and is undone, or sees `DESTROYED` and is refused. Returns
    /// `Ok(false)` if it was already destroyed. The registry's clone is
    /// released by the stop, so the instance is freed as soon as the caller's
    /// handles are gone.
    pub fn destroy(&self, sound: &SoundHandle) -> Result<bool, AudioError> {
        let removed = {
            let mut sounds = self.lock_sounds();
            if sound.is_destroyed() {
                return Ok(false);
            }
            sound.mark_destroyed();
            if !sound.is_playing() {
                return Ok(true);
            }
            unregister(&mut sounds, sound, true)
        };
        check_membership(sound, removed)?;
        Ok(true)
    }

    /// Number of times `sound` appears in the registry (0 or 1 when healthy).
    pub fn membership_count(&self, sound: &SoundHandle) -> usize {
        self.lock_sounds()
            .iter()
            .filter(|s| SoundHandle::ptr_eq(s, sound))
            .count()
    }

    /// Returns `true` if `sound` is registered.
    pub fn contains(&self, sound: &SoundHandle) -> bool {
        self.membership_count(sound) > 0
    }

    /// Number of registered sounds.
    pub fn len(&self) -> usize {
        self.lock_sounds().len()
    }

    /// Returns `true` if nothing is playing.
    pub fn is_empty(&self) -> bool {
        self.lock_sounds().is_empty()
    }

    /// Registered sounds that reached the end of their data and do not repeat.
    ///
    /// Returns an empty vector without allocating when nothing has finished,
    /// which is the steady state. Room for the result is reserved with the
    /// lock released.
    pub fn finished(&self) -> Vec<SoundHandle> {
        let is_finished = |s: &&SoundHandle| !s.should_repeat() && s.is_exhausted();
        let mut finished = Vec::new();
        loop {
            let needed = {
                let sounds = self.lock_sounds();
                let count = sounds.iter().filter(is_finished).count();
                if count <= finished.capacity() {
                    let room = finished.capacity();
                    finished.extend(sounds.iter().filter(is_finished).take(room).cloned());
                    return finished;
                }
                count
            };
            finished.reserve_exact(needed);
        }
    }

    /// Unregisters every sound, rewinding each one. Returns how many were
    /// playing.
    pub fn clear(&self) -> usize {
        let mut drained = Vec::with_capacity(DEFAULT_REGISTRY_CAPACITY);
        {
            let mut sounds = self.lock_sounds();
            for sound in sounds.iter() {
                sound.flags.remove(SoundFlags::IS_PLAYING);
                sound.store_time_position(0.0);
            }
            std::mem::swap(&mut *sounds, &mut drained);
        }
        // Handles are released outside the lock.
        drained.len()
    }
}

// Clears `IS_PLAYING` and drops every registry entry for `sound`. Returns how
// many entries went. Never allocates: the caller holds the lock.
fn unregister(sounds: &mut Vec<SoundHandle>, sound: &SoundHandle, rewind: bool) -> usize {
    sound.flags.remove(SoundFlags::IS_PLAYING);
    let before = sounds.len();
    sounds.retain(|s| !SoundHandle::ptr_eq(s, sound));
    if rewind {
        sound.store_time_position(0.0);
    }
    before - sounds.len()
}

fn check_membership(sound: &SoundHandle, removed: usize) -> Result<(), AudioError> {
    if removed == 1 {
        return Ok(());
    }
    Err(AudioError::Consistency {
        detail: format!(
            "sound #{} flagged as playing was registered {removed} times",
            sound.id()
        ),
    })
}

/// Exclusive access to the registry, held by the mixer for a whole callback.
pub struct ActiveSoundsGuard<'a> {
    sounds: MutexGuard<'a, Vec<SoundHandle>>,
}

impl<'a> ActiveSoundsGuard<'a> {
    /// Number of registered sounds.
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// Returns `true` if nothing is playing.
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Iterates over the registered sounds.
    pub fn iter(&self) -> impl Iterator<Item = PlayingSound<'_>> {
        self.sounds.iter().map(|handle| PlayingSound { handle })
    }
}

/// A registered sound, borrowed from a locked registry.
///
/// Only obtainable through [`ActiveSoundsGuard`], which makes it the one place
/// outside the registry allowed to move a time cursor.
#[derive(Clone, Copy)]
pub struct PlayingSound<'a> {
    handle: &'a SoundHandle,
}

impl PlayingSound<'_> {
    /// Moves the time cursor.
    #[inline]
    pub fn set_time_position(&self, time: f64) {
        self.handle.store_time_position(time);
    }

    /// The shared handle of this sound.
    pub fn handle(&self) -> &SoundHandle {
        self.handle
    }
}

impl Deref for PlayingSound<'_> {
    type Target = SoundInstance;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AudioBuffer, DecodedAudio};
    use resona_core::{asset::AssetHandle, AudioFormat};

    fn sound() -> SoundHandle {
        let decoded = DecodedAudio {
            channel_count: 1,
            sample_rate: 8000,
            samples: vec![100; 8],
        };
        SoundHandle::new(AssetHandle::new(
            AudioBuffer::from_decoded(AudioFormat::Wav, decoded, 8000).unwrap(),
        ))
    }

    #[test]
    fn test_insert_is_idempotent() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();

        assert!(registry.insert(&s));
        assert!(!registry.insert(&s));
        assert!(!registry.insert(&s.clone()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.membership_count(&s), 1);
        assert!(s.is_playing());
    }

    #[test]
    fn test_remove_is_idempotent_and_rewinds() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();
        registry.insert(&s);
        registry.lock().iter().for_each(|p| p.set_time_position(0.0005));

        assert!(registry.remove(&s, true).unwrap());
        assert!(!registry.remove(&s, true).unwrap());
        assert_eq!(registry.membership_count(&s), 0);
        assert_eq!(s.time_position(), 0.0);
        assert!(!s.is_playing());
    }

    #[test]
    fn test_pause_keeps_position() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();
        registry.insert(&s);
        registry.lock().iter().for_each(|p| p.set_time_position(0.0005));

        assert!(registry.remove(&s, false).unwrap());
        assert_eq!(s.time_position(), 0.0005);
    }

    #[test]
    fn test_flag_without_membership_is_a_consistency_error() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();
        s.flags.insert(SoundFlags::IS_PLAYING);

        let err = registry.remove(&s, true).unwrap_err();
        assert!(err.is_defect());
        assert!(!s.is_playing());
    }

    #[test]
    fn test_destroyed_sounds_cannot_be_inserted() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();
        s.mark_destroyed();
        assert!(!registry.insert(&s));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_destroy_forces_stop_and_is_terminal() {
        let registry = ActiveSoundRegistry::new();
        let s = sound();
        registry.insert(&s);

        assert!(registry.destroy(&s).unwrap());
        assert!(!registry.destroy(&s).unwrap());
        assert!(s.is_destroyed());
        assert!(!s.is_playing());
        assert!(!registry.insert(&s));
    }

    #[test]
    fn test_destroy_racing_play_never_leaves_a_destroyed_member() {
        for _ in 0..200 {
            let registry = std::sync::Arc::new(ActiveSoundRegistry::new());
            let s = sound();
            registry.insert(&s);

            let player = {
                let registry = registry.clone();
                let s = s.clone();
                std::thread::spawn(move || {
                    while !s.is_destroyed() {
                        registry.insert(&s);
                        let _ = registry.remove(&s, false);
                    }
                    registry.insert(&s)
                })
            };
            assert!(registry.destroy(&s).unwrap());
            assert!(!player.join().unwrap());

            assert!(s.is_destroyed());
            assert!(!s.is_playing());
            assert_eq!(registry.membership_count(&s), 0);
            assert!(!registry.destroy(&s).unwrap());
        }
    }

    #[test]
    fn test_insert_grows_past_initial_capacity() {
        let registry = ActiveSoundRegistry::with_capacity(1);
        let sounds: Vec<_> = (0..5).map(|_| sound()).collect();
        for s in &sounds {
            assert!(registry.insert(s));
        }
        assert_eq!(registry.len(), 5);
        assert!(sounds.iter().all(|s| registry.membership_count(s) == 1));
    }

    #[test]
    fn test_finished_lists_only_exhausted_non_repeating_sounds() {
        let registry = ActiveSoundRegistry::new();
        let done = sound();
        let looping = sound();
        let running = sound();
        looping.set_repeat(true);
        for s in [&done, &looping, &running] {
            registry.insert(s);
        }
        assert!(registry.finished().is_empty());

        {
            let guard = registry.lock();
            for playing in guard.iter() {
                if !SoundHandle::ptr_eq(playing.handle(), &running) {
                    playing.set_time_position(1.0);
                }
            }
        }

        let finished = registry.finished();
        assert_eq!(finished.len(), 1);
        assert!(SoundHandle::ptr_eq(&finished[0], &done));
    }

    #[test]
    fn test_clear_unregisters_everything() {
        let registry = ActiveSoundRegistry::new();
        let a = sound();
        let b = sound();
        registry.insert(&a);
        registry.insert(&b);

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert!(!a.is_playing() && !b.is_playing());
    }

    #[test]
    fn test_concurrent_play_stop_keeps_single_membership() {
        let registry = std::sync::Arc::new(ActiveSoundRegistry::new());
        let s = sound();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                let s = s.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        if i % 2 == 0 {
                            registry.insert(&s);
                        } else {
                            registry.remove(&s, true).unwrap();
                        }
                        assert!(registry.membership_count(&s) <= 1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(registry.membership_count(&s), usize::from(s.is_playing()));
    }
}
